//! Directory listings for `ls`: entry collection, ordering and the table layout.

use crate::probe::{self, ChildEntry};
use std::cmp::Ordering;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "File",
            EntryKind::Dir => "Dir",
        }
    }
}

/// Row order of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Whatever order the filesystem enumerates in.
    Enumeration,
    /// Largest first; directories count everything beneath them.
    BySize,
    /// Most recently modified first.
    ByTime,
}

impl SortMode {
    /// Interprets the arguments after `ls`. Anything but nothing, `-s` or `-t` is rejected.
    pub fn from_args(args: &[String]) -> Option<Self> {
        match args {
            [] => Some(SortMode::Enumeration),
            [flag] if flag == "-s" => Some(SortMode::BySize),
            [flag] if flag == "-t" => Some(SortMode::ByTime),
            _ => None,
        }
    }
}

/// One row of a listing, built fresh for every `ls`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Display name; directories carry a trailing `/`.
    pub name: String,
    pub kind: EntryKind,
    /// Display size: bytes for regular files, `-` otherwise.
    pub size: String,
    pub modify_time: String,
    /// Size used for ordering; the recursive total for directories under [`SortMode::BySize`].
    pub size_bytes: u64,
    /// Modification time used for ordering; the epoch when unknown.
    pub modified: SystemTime,
    /// Directory with no regular file anywhere beneath it.
    pub is_empty_dir: bool,
}

impl ListingEntry {
    pub fn from_child(child: &ChildEntry, mode: SortMode) -> Self {
        let metadata = child.metadata.as_ref();
        let is_dir = metadata.is_some_and(|m| m.is_dir());
        let file_len = metadata.filter(|m| m.is_file()).map(|m| m.len());

        let (size_bytes, is_empty_dir) = if is_dir && mode == SortMode::BySize {
            let total = probe::directory_size(&child.path);
            (total.bytes, total.files == 0)
        } else {
            (file_len.unwrap_or(0), false)
        };

        let modified = metadata.and_then(|m| m.modified().ok());

        Self {
            name: if is_dir {
                format!("{}/", child.name)
            } else {
                child.name.clone()
            },
            kind: if is_dir { EntryKind::Dir } else { EntryKind::File },
            size: file_len.map_or_else(|| "-".to_string(), |len| len.to_string()),
            modify_time: probe::format_local_time(modified),
            size_bytes,
            modified: modified.unwrap_or(UNIX_EPOCH),
            is_empty_dir,
        }
    }
}

/// Collects and orders the immediate children of `dir`.
pub fn list_directory(dir: &Path, mode: SortMode) -> io::Result<Vec<ListingEntry>> {
    let mut entries: Vec<ListingEntry> = probe::list_immediate_children(dir)?
        .iter()
        .map(|child| ListingEntry::from_child(child, mode))
        .collect();
    sort_entries(&mut entries, mode);
    Ok(entries)
}

pub fn sort_entries(entries: &mut [ListingEntry], mode: SortMode) {
    match mode {
        SortMode::Enumeration => {}
        SortMode::BySize => entries.sort_by(|a, b| {
            a.is_empty_dir
                .cmp(&b.is_empty_dir)
                .then_with(|| b.size_bytes.cmp(&a.size_bytes))
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortMode::ByTime => entries.sort_by(|a, b| match b.modified.cmp(&a.modified) {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        }),
    }
}

/// Writes the four-column table: header line, then one line per entry.
pub fn render_table<W: Write + ?Sized>(entries: &[ListingEntry], out: &mut W) -> io::Result<()> {
    const HEADER: [&str; 4] = ["Name", "Type", "Size(B)", "Modify Time"];

    let name_w = column_width(HEADER[0], entries.iter().map(|e| e.name.as_str()));
    let type_w = column_width(HEADER[1], entries.iter().map(|e| e.kind.as_str()));
    let size_w = column_width(HEADER[2], entries.iter().map(|e| e.size.as_str()));

    writeln!(
        out,
        "{:<name_w$} {:<type_w$} {:>size_w$} {}",
        HEADER[0], HEADER[1], HEADER[2], HEADER[3]
    )?;
    for entry in entries {
        writeln!(
            out,
            "{:<name_w$} {:<type_w$} {:>size_w$} {}",
            entry.name,
            entry.kind.as_str(),
            entry.size,
            entry.modify_time
        )?;
    }
    Ok(())
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .fold(header.chars().count(), usize::max)
}
