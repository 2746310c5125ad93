use mini_file_explorer::{Interpreter, PROMPT, ScriptedTerminal, Session};
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

fn explorer() -> (TempDir, Interpreter) {
    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(fs::canonicalize(temp.path()).unwrap());
    (temp, Interpreter::with_default_commands(session))
}

/// Feed `script` to the explorer and return everything it printed, prompts removed.
fn drive(interp: &mut Interpreter, script: &str) -> String {
    let mut term = ScriptedTerminal::scripted(script);
    interp.repl(&mut term).unwrap();
    term.transcript().replace(PROMPT, "")
}

/// Names from an `ls` table, header excluded.
fn listed_names(output: &str) -> Vec<&str> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .collect()
}

fn set_mtime(path: &Path, secs: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

#[test]
fn prompt_is_printed_before_every_line() {
    let (_temp, mut interp) = explorer();
    let mut term = ScriptedTerminal::scripted("exit\n");
    interp.repl(&mut term).unwrap();
    assert_eq!(
        term.transcript(),
        "Enter command (type 'help' for all commands): MiniFileExplorer closed successfully\n"
    );
}

#[test]
fn touch_twice_reports_existing_file() {
    let (temp, mut interp) = explorer();
    let out = drive(&mut interp, "touch a.txt\ntouch a.txt\n");
    assert_eq!(out, "File already exists: a.txt\n");
    assert_eq!(fs::metadata(temp.path().join("a.txt")).unwrap().len(), 0);
}

#[test]
fn mkdir_then_rmdir_round_trip() {
    let (temp, mut interp) = explorer();
    let out = drive(&mut interp, "mkdir docs\nmkdir docs\nrmdir docs\nrmdir no_such\n");
    assert_eq!(
        out,
        "Directory already exists: docs\nDirectory not found: no_such\n"
    );
    assert!(!temp.path().join("docs").exists());
}

#[test]
fn cd_moves_relative_resolution() {
    let (temp, mut interp) = explorer();
    fs::create_dir(temp.path().join("docs")).unwrap();
    let out = drive(&mut interp, "cd docs\ntouch inside.txt\ncd ..\ncd missing\n");
    assert_eq!(out, "Invalid directory: missing\n");
    assert!(temp.path().join("docs/inside.txt").is_file());
    assert_eq!(
        interp.session().current_dir,
        fs::canonicalize(temp.path()).unwrap()
    );
}

#[test]
fn quoted_names_keep_their_spaces() {
    let (temp, mut interp) = explorer();
    let out = drive(&mut interp, "touch \"my notes.txt\"\ntouch it\\'s\n");
    assert_eq!(out, "");
    assert!(temp.path().join("my notes.txt").is_file());
    assert!(temp.path().join("it's").is_file());
}

#[test]
fn ls_by_size_largest_first_and_empty_dirs_last() {
    let (temp, mut interp) = explorer();
    fs::write(temp.path().join("small.bin"), vec![0u8; 10]).unwrap();
    fs::write(temp.path().join("big.bin"), vec![0u8; 2000]).unwrap();
    fs::create_dir_all(temp.path().join("hollow/deeper")).unwrap();
    fs::create_dir(temp.path().join("stuffed")).unwrap();
    fs::write(temp.path().join("stuffed/blob.bin"), vec![0u8; 100]).unwrap();

    let out = drive(&mut interp, "ls -s\n");
    assert!(out.starts_with("Name"));
    assert_eq!(
        listed_names(&out),
        ["big.bin", "stuffed/", "small.bin", "hollow/"]
    );
    let big_row = out.lines().nth(1).unwrap();
    assert!(big_row.contains(" File "));
    assert!(big_row.contains(" 2000 "));
}

#[test]
fn ls_by_time_newest_first() {
    let (temp, mut interp) = explorer();
    for name in ["old.txt", "new.txt"] {
        fs::write(temp.path().join(name), "x").unwrap();
    }
    // 2020-01-01 and 2021-01-01
    set_mtime(&temp.path().join("old.txt"), 1_577_836_800);
    set_mtime(&temp.path().join("new.txt"), 1_609_459_200);

    let out = drive(&mut interp, "ls -t\n");
    assert_eq!(listed_names(&out), ["new.txt", "old.txt"]);
}

#[test]
fn ls_rejects_unknown_options() {
    let (_temp, mut interp) = explorer();
    let out = drive(&mut interp, "ls -x\nls -s -t\n");
    assert_eq!(out, "Invalid option: ls\nInvalid option: ls\n");
}

#[test]
fn rm_asks_before_deleting() {
    let (temp, mut interp) = explorer();
    fs::write(temp.path().join("keep.txt"), "k").unwrap();
    fs::write(temp.path().join("drop.txt"), "d").unwrap();

    let out = drive(&mut interp, "rm keep.txt\nn\nrm drop.txt\ny\nrm ghost.txt\n");
    assert_eq!(
        out,
        "Are you sure to delete keep.txt? (y/n)\
         Are you sure to delete drop.txt? (y/n)\
         File not found: ghost.txt\n"
    );
    assert!(temp.path().join("keep.txt").exists());
    assert!(!temp.path().join("drop.txt").exists());
}

#[test]
fn rmdir_refuses_non_empty_directory() {
    let (temp, mut interp) = explorer();
    fs::create_dir(temp.path().join("full")).unwrap();
    fs::write(temp.path().join("full/x"), "x").unwrap();

    let out = drive(&mut interp, "rmdir full\n");
    assert_eq!(out, "Directory not empty: full\n");
    assert!(temp.path().join("full/x").exists());
}

#[test]
fn cp_into_directory_and_overwrite_prompt() {
    let (temp, mut interp) = explorer();
    fs::write(temp.path().join("a.txt"), "fresh").unwrap();
    fs::create_dir(temp.path().join("backup")).unwrap();
    fs::write(temp.path().join("backup/a.txt"), "stale").unwrap();

    let out = drive(&mut interp, "cp a.txt backup\nn\n");
    assert_eq!(out, "File exists in target: Overwrite? (y/n)");
    assert_eq!(fs::read_to_string(temp.path().join("backup/a.txt")).unwrap(), "stale");

    let out = drive(&mut interp, "cp a.txt backup\ny\n");
    assert_eq!(out, "File exists in target: Overwrite? (y/n)");
    assert_eq!(fs::read_to_string(temp.path().join("backup/a.txt")).unwrap(), "fresh");
}

#[test]
fn cp_missing_source() {
    let (_temp, mut interp) = explorer();
    let out = drive(&mut interp, "cp nothing.txt elsewhere.txt\n");
    assert_eq!(out, "Source not found\n");
}

#[test]
fn mv_renames_and_moves_into_directories() {
    let (temp, mut interp) = explorer();
    fs::write(temp.path().join("a.txt"), "a").unwrap();
    fs::create_dir(temp.path().join("dest")).unwrap();

    let out = drive(&mut interp, "mv a.txt b.txt\nmv b.txt dest\n");
    assert_eq!(out, "");
    assert!(!temp.path().join("a.txt").exists());
    assert_eq!(fs::read_to_string(temp.path().join("dest/b.txt")).unwrap(), "a");
}

#[test]
fn du_after_copying_files() {
    let (temp, mut interp) = explorer();
    fs::write(temp.path().join("blob.bin"), vec![1u8; 1500]).unwrap();
    fs::create_dir(temp.path().join("store")).unwrap();

    let out = drive(&mut interp, "cp blob.bin store\ndu store\ndu blob.bin\n");
    assert_eq!(
        out,
        "Total size of store: 1 KB\nInvalid directory: blob.bin\n"
    );
}

#[test]
fn stat_and_search_report_targets() {
    let (temp, mut interp) = explorer();
    fs::create_dir(temp.path().join("Reports")).unwrap();
    fs::write(temp.path().join("Reports/q1_report.txt"), "12345").unwrap();

    let out = drive(&mut interp, "stat\nstat missing\nsearch REPORT\nsearch zzz\n");
    let root = fs::canonicalize(temp.path()).unwrap();
    let expected = format!(
        "Missing target: Please enter'stat [name]'\n\
         Target not found: missing\n\
         Search results for 'REPORT' (2 items):\n\
         {dir}/ (Dir)\n\
         {file} (File)\n\
         No results found for 'zzz'\n",
        dir = root.join("Reports").display(),
        file = root.join("Reports").join("q1_report.txt").display(),
    );
    assert_eq!(out, expected);

    let out = drive(&mut interp, "stat Reports/q1_report.txt\n");
    assert!(out.starts_with("Type: File\n"));
    assert!(out.contains("Size: 5\n"));
    assert!(out.contains("Modify Time: "));
}

#[test]
fn help_lists_commands() {
    let (_temp, mut interp) = explorer();
    let out = drive(&mut interp, "help\n");
    assert!(out.starts_with("Supported commands:\n"));
    let commands = [
        "cd", "ls", "touch", "mkdir", "rm", "rmdir", "stat", "search", "cp", "mv", "du", "help",
        "exit",
    ];
    for name in commands {
        assert!(
            out.lines().any(|line| line.trim_start().starts_with(name)),
            "help is missing {name}"
        );
    }
}

#[test]
fn errors_never_end_the_session() {
    let (_temp, mut interp) = explorer();
    let out = drive(&mut interp, "nope\ncd 'open\ncd\nexit\n");
    assert_eq!(
        out,
        "Unknown command: nope\n\
         Invalid command: unmatched quote\n\
         Missing path: Please enter 'cd [path]'\n\
         MiniFileExplorer closed successfully\n"
    );
}

#[test]
fn end_of_input_closes_quietly() {
    let (_temp, mut interp) = explorer();
    let out = drive(&mut interp, "help\n");
    assert!(!out.contains("MiniFileExplorer closed successfully"));
    assert!(!interp.session().should_exit);
}
