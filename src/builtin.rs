use crate::command::{BuiltinCommand, Terminal};
use crate::env::Session;
use crate::error::CommandError;
use crate::listing::{self, EntryKind, SortMode};
use crate::probe::{self, Timestamps};
use regex::{Regex, RegexBuilder};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const HELP_TEXT: &str = "\
Supported commands:
  cd [path]: Switch to target directory
  cd ~: Switch to home directory
  ls: List all files and directories
  ls -s: List and sort by size (desc)
  ls -t: List and sort by modify time (desc)
  touch [file]: Create an empty file
  mkdir [dir]: Create an empty directory
  rm [file]: Delete a file (with confirmation)
  rmdir [dir]: Delete an empty directory
  stat [name]: Show detailed information
  search [keyword]: Search files and directories recursively
  cp [src] [dst]: Copy a file
  mv [src] [dst]: Move/rename a file or directory
  du [dir]: Calculate total directory size
  help: Show all commands
  exit: Exit the program
";

pub const EXIT_BANNER: &str = "MiniFileExplorer closed successfully";

const OVERWRITE_PROMPT: &str = "File exists in target: Overwrite? (y/n)";

/// Switch the current directory; `~` means the home directory.
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(
        &self,
        argv: &[String],
        _term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let arg = argv.get(1).ok_or(CommandError::MissingPath)?;
        let invalid = || CommandError::InvalidDirectory(arg.clone());

        let target = if arg == "~" {
            session.resolve(session.home_dir().ok_or_else(invalid)?)
        } else {
            session.resolve(arg)
        };

        let metadata = fs::metadata(&target).map_err(|err| {
            debug!(path = %target.display(), error = %err, "cd: stat failed");
            invalid()
        })?;
        if !metadata.is_dir() {
            return Err(CommandError::NotADirectory(arg.clone()));
        }
        session.change_dir(&target).map_err(|err| {
            debug!(path = %target.display(), error = %err, "cd: chdir failed");
            invalid()
        })
    }
}

/// List the current directory, optionally sorted with `-s` or `-t`.
pub struct Ls;

impl BuiltinCommand for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn execute(
        &self,
        argv: &[String],
        term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let mode = SortMode::from_args(argv.get(1..).unwrap_or(&[]))
            .ok_or(CommandError::InvalidListOption)?;

        let entries = listing::list_directory(&session.current_dir, mode).map_err(|err| {
            debug!(error = %err, "ls: cannot read current directory");
            CommandError::CurrentDirectoryUnavailable
        })?;
        listing::render_table(&entries, term)?;
        Ok(())
    }
}

pub struct Touch;

impl BuiltinCommand for Touch {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn execute(
        &self,
        argv: &[String],
        _term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let name = argv.get(1).ok_or(CommandError::MissingFilename("touch"))?;
        let path = session.resolve(name);
        if probe::exists(&path) {
            return Err(CommandError::FileExists(name.clone()));
        }
        probe::create_empty_file(&path).map_err(|err| {
            debug!(path = %path.display(), error = %err, "touch failed");
            CommandError::CreateFileFailed(name.clone())
        })
    }
}

pub struct Mkdir;

impl BuiltinCommand for Mkdir {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn execute(
        &self,
        argv: &[String],
        _term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let name = argv
            .get(1)
            .ok_or(CommandError::MissingDirectoryName("mkdir"))?;
        let path = session.resolve(name);
        if probe::exists(&path) {
            return Err(CommandError::DirectoryExists(name.clone()));
        }
        probe::create_directory(&path).map_err(|err| {
            debug!(path = %path.display(), error = %err, "mkdir failed");
            CommandError::CreateDirectoryFailed(name.clone())
        })
    }
}

/// Delete a regular file after the user confirms with `y`.
pub struct Rm;

impl BuiltinCommand for Rm {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn execute(
        &self,
        argv: &[String],
        term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let name = argv.get(1).ok_or(CommandError::MissingFilename("rm"))?;
        let path = session.resolve(name);
        if !probe::exists(&path) {
            return Err(CommandError::FileNotFound(name.clone()));
        }
        if !probe::is_regular_file(&path) {
            return Err(CommandError::NotAFile(name.clone()));
        }

        if !term.confirm(&format!("Are you sure to delete {name}? (y/n)"))? {
            return Ok(());
        }
        probe::remove_file(&path).map_err(|err| {
            debug!(path = %path.display(), error = %err, "rm failed");
            CommandError::DeleteFileFailed(name.clone())
        })
    }
}

pub struct Rmdir;

impl BuiltinCommand for Rmdir {
    fn name(&self) -> &'static str {
        "rmdir"
    }

    fn execute(
        &self,
        argv: &[String],
        _term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let name = argv
            .get(1)
            .ok_or(CommandError::MissingDirectoryName("rmdir"))?;
        let path = session.resolve(name);
        if !probe::exists(&path) {
            return Err(CommandError::DirectoryNotFound(name.clone()));
        }
        if !probe::is_directory(&path) {
            return Err(CommandError::NotADirectory(name.clone()));
        }
        if !probe::is_empty_directory(&path).unwrap_or(false) {
            return Err(CommandError::DirectoryNotEmpty(name.clone()));
        }
        probe::remove_empty_directory(&path).map_err(|err| {
            debug!(path = %path.display(), error = %err, "rmdir failed");
            CommandError::DeleteDirectoryFailed(name.clone())
        })
    }
}

/// Show type, absolute path, size and timestamps of one entry.
pub struct Stat;

impl BuiltinCommand for Stat {
    fn name(&self) -> &'static str {
        "stat"
    }

    fn execute(
        &self,
        argv: &[String],
        term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let name = argv.get(1).ok_or(CommandError::MissingTarget)?;
        let path = session.resolve(name);
        let metadata =
            fs::metadata(&path).map_err(|_| CommandError::TargetNotFound(name.clone()))?;

        let kind = if metadata.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        let size = match kind {
            EntryKind::Dir => "-".to_string(),
            EntryKind::File => metadata.len().to_string(),
        };
        let times = Timestamps::of(&metadata);

        writeln!(term, "Type: {}", kind.as_str())?;
        writeln!(term, "Path: {}", path.display())?;
        writeln!(term, "Size: {size}")?;
        writeln!(term, "Create Time: {}", probe::format_local_time(times.created))?;
        writeln!(term, "Modify Time: {}", probe::format_local_time(times.modified))?;
        writeln!(term, "Access Time: {}", probe::format_local_time(times.accessed))?;
        Ok(())
    }
}

/// One hit of `search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Absolute path; directories carry a trailing `/`.
    pub path: String,
    pub kind: EntryKind,
}

impl SearchResult {
    fn from_path(path: &Path) -> Self {
        let mut display = path.to_string_lossy().into_owned();
        let kind = if probe::is_directory(path) {
            display.push('/');
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        Self {
            path: display,
            kind,
        }
    }
}

/// Literal match of `keyword` anywhere in a name, ignoring ASCII case only.
///
/// Non-ASCII letters must match exactly: `É` does not match `é`.
fn keyword_matcher(keyword: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(keyword))
        .unicode(false)
        .case_insensitive(true)
        .build()
}

/// Finds every entry below the current directory whose name contains a keyword.
pub fn search_tree(root: &Path, keyword: &str) -> Result<Vec<SearchResult>, regex::Error> {
    let matcher = keyword_matcher(keyword)?;
    Ok(probe::walk_recursive(root)
        .filter(|entry| matcher.is_match(&entry.file_name().to_string_lossy()))
        .map(|entry| SearchResult::from_path(entry.path()))
        .collect())
}

pub struct Search;

impl BuiltinCommand for Search {
    fn name(&self) -> &'static str {
        "search"
    }

    fn execute(
        &self,
        argv: &[String],
        term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let keyword = argv.get(1).ok_or(CommandError::MissingKeyword)?;
        if !probe::is_directory(&session.current_dir) {
            return Err(CommandError::CurrentDirectoryUnavailable);
        }

        let results = search_tree(&session.current_dir, keyword).map_err(|err| {
            debug!(error = %err, "search: keyword rejected");
            CommandError::NoResults(keyword.clone())
        })?;
        if results.is_empty() {
            return Err(CommandError::NoResults(keyword.clone()));
        }

        writeln!(
            term,
            "Search results for '{keyword}' ({} items):",
            results.len()
        )?;
        for result in &results {
            writeln!(term, "{} ({})", result.path, result.kind.as_str())?;
        }
        Ok(())
    }
}

/// Where a copy or move of `src` to `dst` really lands.
///
/// An existing directory `dst` means `dst/basename(src)`. Returns `None` when
/// the landing spot's parent is not an existing directory.
pub fn effective_target(src: &Path, dst: &Path) -> Option<PathBuf> {
    let target = if probe::is_directory(dst) {
        dst.join(src.file_name()?)
    } else {
        dst.to_path_buf()
    };
    let parent = target.parent()?;
    probe::is_directory(parent).then_some(target)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy a regular file, asking before replacing an existing one.
pub struct Cp;

impl BuiltinCommand for Cp {
    fn name(&self) -> &'static str {
        "cp"
    }

    fn execute(
        &self,
        argv: &[String],
        term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let (Some(src_arg), Some(dst_arg)) = (argv.get(1), argv.get(2)) else {
            return Err(CommandError::InvalidTargetPath);
        };
        let src = session.resolve(src_arg);
        if !probe::is_regular_file(&src) {
            return Err(CommandError::SourceNotFound);
        }

        let target = effective_target(&src, &session.resolve(dst_arg))
            .ok_or(CommandError::InvalidTargetPath)?;
        if probe::is_directory(&target) {
            return Err(CommandError::InvalidTargetPath);
        }

        let overwrite = probe::exists(&target);
        if overwrite {
            if !term.confirm(OVERWRITE_PROMPT)? {
                return Ok(());
            }
            // Copying a file onto itself would truncate it.
            if same_file(&src, &target) {
                return Err(CommandError::InvalidTargetPath);
            }
        }

        probe::copy_file(&src, &target, overwrite).map_err(|err| {
            debug!(src = %src.display(), dst = %target.display(), error = %err, "cp failed");
            CommandError::InvalidTargetPath
        })?;
        Ok(())
    }
}

/// Move or rename; falls back to copy and delete for regular files.
pub struct Mv;

impl BuiltinCommand for Mv {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn execute(
        &self,
        argv: &[String],
        _term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let (Some(src_arg), Some(dst_arg)) = (argv.get(1), argv.get(2)) else {
            return Err(CommandError::InvalidTargetPath);
        };
        let src = session.resolve(src_arg);
        if !probe::exists(&src) {
            return Err(CommandError::SourceNotFound);
        }

        let target = effective_target(&src, &session.resolve(dst_arg))
            .ok_or(CommandError::InvalidTargetPath)?;
        if probe::exists(&target) {
            return Err(CommandError::InvalidTargetPath);
        }

        match probe::rename_or_move(&src, &target) {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!(src = %src.display(), dst = %target.display(), error = %err, "mv: rename failed");
                move_by_copy(&src, &target)
            }
        }
    }
}

/// Moves a regular file by copying it to `target` and deleting `src`.
///
/// Used when `rename` cannot do the move, e.g. across filesystems. Directories
/// are refused, and an existing `target` is never overwritten.
pub fn move_by_copy(src: &Path, target: &Path) -> Result<(), CommandError> {
    if !probe::is_regular_file(src) {
        return Err(CommandError::InvalidTargetPath);
    }
    probe::copy_file(src, target, false).map_err(|err| {
        debug!(error = %err, "mv: fallback copy failed");
        CommandError::InvalidTargetPath
    })?;
    probe::remove_file(src).map_err(|err| {
        warn!(src = %src.display(), dst = %target.display(), error = %err,
            "mv: copied but could not remove source");
        CommandError::InvalidTargetPath
    })
}

/// Renders a byte count as whole megabytes from 1 MiB up, else whole kilobytes,
/// rounding halves up.
pub fn format_total_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * KB;

    let round = |unit: u64| bytes / unit + u64::from(bytes % unit >= unit / 2);
    if bytes >= MB {
        format!("{} MB", round(MB))
    } else {
        format!("{} KB", round(KB))
    }
}

/// Total size of the regular files under a directory.
pub struct Du;

impl BuiltinCommand for Du {
    fn name(&self) -> &'static str {
        "du"
    }

    fn execute(
        &self,
        argv: &[String],
        term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        let arg = argv.get(1).ok_or(CommandError::MissingDirectoryName("du"))?;
        let dir = session.resolve(arg);
        if !probe::is_directory(&dir) {
            return Err(CommandError::InvalidDirectory(arg.clone()));
        }

        let total = probe::directory_size(&dir);
        debug!(dir = %dir.display(), bytes = total.bytes, files = total.files, "du");
        writeln!(term, "Total size of {arg}: {}", format_total_size(total.bytes))?;
        Ok(())
    }
}

pub struct Help;

impl BuiltinCommand for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn execute(
        &self,
        _argv: &[String],
        term: &mut dyn Terminal,
        _session: &mut Session,
    ) -> Result<(), CommandError> {
        term.write_all(HELP_TEXT.as_bytes())?;
        Ok(())
    }
}

/// Print the closing banner and end the session.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(
        &self,
        _argv: &[String],
        term: &mut dyn Terminal,
        session: &mut Session,
    ) -> Result<(), CommandError> {
        writeln!(term, "{EXIT_BANNER}")?;
        session.should_exit = true;
        Ok(())
    }
}
