//! Thin semantic layer over the host filesystem.
//!
//! Queries follow symbolic links, the way `stat(2)` does. Errors that a caller
//! can only swallow are logged at debug level here so the reason is not lost.

use chrono::{DateTime, Local, Utc};
use std::fs::{self, Metadata, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use walkdir::WalkDir;

pub fn exists(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

pub fn is_directory(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

pub fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

pub fn is_empty_directory(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Creation, modification and access times of one filesystem object.
///
/// Creation time is `None` where the platform does not record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    pub accessed: Option<SystemTime>,
}

impl Timestamps {
    pub fn of(metadata: &Metadata) -> Self {
        Self {
            created: metadata.created().ok(),
            modified: metadata.modified().ok(),
            accessed: metadata.accessed().ok(),
        }
    }
}

/// Creates a new empty file; fails if anything already sits at `path`.
pub fn create_empty_file(path: &Path) -> io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(drop)
}

pub fn create_directory(path: &Path) -> io::Result<()> {
    fs::create_dir(path)
}

pub fn remove_file(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

pub fn remove_empty_directory(path: &Path) -> io::Result<()> {
    fs::remove_dir(path)
}

/// Copies file contents byte for byte.
///
/// Without `overwrite`, an existing destination is an `AlreadyExists` error.
pub fn copy_file(src: &Path, dst: &Path, overwrite: bool) -> io::Result<u64> {
    if !overwrite && fs::symlink_metadata(dst).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dst.display()),
        ));
    }
    fs::copy(src, dst)
}

pub fn rename_or_move(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)
}

/// One immediate child of a directory.
#[derive(Debug)]
pub struct ChildEntry {
    pub name: String,
    pub path: PathBuf,
    /// `None` when the lookup failed for a reason other than permissions,
    /// e.g. a dangling symlink.
    pub metadata: Option<Metadata>,
}

/// Lists the children of `dir` in enumeration order.
///
/// Children whose metadata cannot be read for lack of permission are skipped.
pub fn list_immediate_children(dir: &Path) -> io::Result<Vec<ChildEntry>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => Some(metadata),
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                debug!(path = %path.display(), "skipping entry without stat permission");
                continue;
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "entry metadata unavailable");
                None
            }
        };
        children.push(ChildEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            metadata,
        });
    }
    Ok(children)
}

/// Every entry strictly below `dir`, depth first, siblings in name order.
///
/// Subtrees that cannot be read are skipped instead of ending the walk.
/// Symbolic links are reported but not descended into.
pub fn walk_recursive(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "skipping unreadable part of the tree");
                None
            }
        })
}

/// Apparent size of the regular files beneath a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirSize {
    pub bytes: u64,
    pub files: u64,
}

pub fn directory_size(dir: &Path) -> DirSize {
    let mut total = DirSize::default();
    for entry in walk_recursive(dir) {
        match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => {
                total.bytes += metadata.len();
                total.files += 1;
            }
            Ok(_) => {}
            Err(err) => {
                debug!(path = %entry.path().display(), error = %err, "size unavailable");
            }
        }
    }
    total
}

/// Formats a timestamp as local `YYYY-MM-DD HH:MM:SS`, or `-` when unknown.
pub fn format_local_time(time: Option<SystemTime>) -> String {
    time.and_then(local_time_string)
        .unwrap_or_else(|| "-".to_string())
}

fn local_time_string(time: SystemTime) -> Option<String> {
    let secs = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).ok()?,
        Err(before) => -i64::try_from(before.duration().as_secs()).ok()?,
    };
    let utc = DateTime::<Utc>::from_timestamp(secs, 0)?;
    Some(
        utc.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}
