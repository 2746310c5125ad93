use std::io;
use thiserror::Error;

/// Every way a command can fail.
///
/// The `Display` text of each variant is the exact line shown to the user.
/// Only [`CommandError::Terminal`] is fatal to the session; everything else is
/// printed and the loop carries on.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid command: unmatched quote")]
    InvalidCommand,
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing path: Please enter 'cd [path]'")]
    MissingPath,
    #[error("Missing filename: Please enter '{0} [name]'")]
    MissingFilename(&'static str),
    #[error("Missing directory name: Please enter '{0} [name]'")]
    MissingDirectoryName(&'static str),
    // No space before the quote.
    #[error("Missing target: Please enter'stat [name]'")]
    MissingTarget,
    #[error("Missing keyword: Please enter 'search [keyword]'")]
    MissingKeyword,
    #[error("Invalid option: ls")]
    InvalidListOption,

    #[error("Invalid directory: {0}")]
    InvalidDirectory(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Failed to access current directory")]
    CurrentDirectoryUnavailable,

    #[error("File already exists: {0}")]
    FileExists(String),
    #[error("Failed to create file: {0}")]
    CreateFileFailed(String),
    #[error("Directory already exists: {0}")]
    DirectoryExists(String),
    #[error("Failed to create directory: {0}")]
    CreateDirectoryFailed(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Not a file: {0}")]
    NotAFile(String),
    #[error("Failed to delete file: {0}")]
    DeleteFileFailed(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),
    #[error("Failed to delete directory: {0}")]
    DeleteDirectoryFailed(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),
    #[error("No results found for '{0}'")]
    NoResults(String),

    #[error("Source not found")]
    SourceNotFound,
    #[error("Invalid target path")]
    InvalidTargetPath,

    /// The terminal channel itself failed; the session cannot continue.
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),
}

impl CommandError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::Terminal(_))
    }
}

/// Failures while establishing the starting directory, before the loop runs.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Failed to get current working directory")]
    NoWorkingDirectory(#[source] io::Error),
}
