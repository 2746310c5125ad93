use crate::error::StartupError;
use std::collections::HashMap;
use std::env as stdenv;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Context carried between commands of one explorer session.
///
/// The session contains:
/// - `vars`: environment variables consulted by commands (only `HOME` today).
/// - `current_dir`: the directory every relative argument resolves against.
/// - `should_exit`: set by `exit` so the loop knows to stop.
/// - `sync_process_dir`: whether `cd` also moves the OS working directory.
///
/// Commands never read the process working directory directly, so a session
/// built with [`Session::new`] is fully isolated from the rest of the process.
#[derive(Debug, Clone)]
pub struct Session {
    /// Key-value store of environment variables (e.g., HOME).
    pub vars: HashMap<String, String>,
    /// The directory commands operate in.
    pub current_dir: PathBuf,
    /// When set to true, the interactive loop terminates.
    pub should_exit: bool,
    /// Mirror every directory change into `std::env::set_current_dir`.
    pub sync_process_dir: bool,
}

impl Session {
    /// Session rooted at `current_dir` that leaves the process state alone.
    pub fn new(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.into(),
            should_exit: false,
            sync_process_dir: false,
        }
    }

    /// Session for the running binary.
    ///
    /// Moves the process into `initial_dir` when one is given, then captures the
    /// OS working directory and environment variables.
    pub fn start(initial_dir: Option<&str>) -> Result<Self, StartupError> {
        if let Some(dir) = initial_dir {
            let is_dir = fs::metadata(dir).map(|m| m.is_dir()).unwrap_or(false);
            if !is_dir || stdenv::set_current_dir(dir).is_err() {
                return Err(StartupError::DirectoryNotFound(dir.to_string()));
            }
        }
        let current_dir = stdenv::current_dir().map_err(StartupError::NoWorkingDirectory)?;
        Ok(Self {
            vars: stdenv::vars().collect(),
            current_dir,
            should_exit: false,
            sync_process_dir: true,
        })
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The user's home directory: `HOME` if set and non-empty, else the platform lookup.
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.get_var("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }

    /// Resolves a user-supplied path against the current directory.
    ///
    /// Absolute arguments are returned as given; nothing is normalized.
    pub fn resolve(&self, arg: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(arg)
    }

    /// Makes `target` the current directory, stored in canonical form.
    pub fn change_dir(&mut self, target: &Path) -> io::Result<()> {
        let canonical = fs::canonicalize(target)?;
        if self.sync_process_dir {
            stdenv::set_current_dir(&canonical)?;
        }
        self.current_dir = canonical;
        Ok(())
    }
}
