use dupesweep::actions::DeleteConfig;
use dupesweep::duplicates::{scan, DuplicateGroup};
use dupesweep::resolver::{resolve, Resolution, ResolverConfig, TerminalConsole};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

type ScriptedConsole = TerminalConsole<Cursor<Vec<u8>>, Vec<u8>>;

fn scripted(input: &str) -> ScriptedConsole {
    TerminalConsole::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn output_of(console: ScriptedConsole) -> String {
    String::from_utf8(console.into_output()).unwrap()
}

/// `groups` groups of `members` identical files each; contents differ
/// between groups.
fn fixture(groups: usize, members: usize) -> (TempDir, Vec<DuplicateGroup>) {
    let dir = tempdir().unwrap();
    for g in 0..groups {
        for m in 0..members {
            let path = dir.path().join(format!("g{}_{}.txt", g, m));
            fs::write(&path, format!("group {} content", g)).unwrap();
        }
    }
    let found = scan(dir.path()).unwrap();
    assert_eq!(found.len(), groups);
    (dir, found)
}

fn existing(paths: &[PathBuf]) -> Vec<bool> {
    paths.iter().map(|p| Path::exists(p)).collect()
}

#[test]
fn test_keep_first_on_hello_scenario() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let c = dir.path().join("c.txt");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "hello").unwrap();
    fs::write(&c, "world").unwrap();

    let groups = scan(dir.path()).unwrap();
    let mut console = scripted("k\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert!(a.exists());
    assert!(!b.exists());
    assert!(c.exists());
    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.bytes_freed(), 5);

    let out = output_of(console);
    assert!(out.contains("Group 1/1"));
    assert!(out.contains(&format!("Deleted {}", b.display())));
}

#[test]
fn test_keep_first_attempts_n_minus_one_deletions() {
    let (_dir, groups) = fixture(1, 5);
    let paths = groups[0].paths.clone();

    let mut console = scripted("keep-first\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert_eq!(report.outcomes[0].deletions.total_count(), 4);
    assert_eq!(existing(&paths), vec![true, false, false, false, false]);
}

#[test]
fn test_delete_selected_indices() {
    let (_dir, groups) = fixture(1, 4);
    let paths = groups[0].paths.clone();

    let mut console = scripted("d 2,3\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert_eq!(existing(&paths), vec![true, false, false, true]);
    assert_eq!(report.outcomes[0].resolution, Resolution::DeletedSelected);
}

#[test]
fn test_out_of_range_index_reprompts_same_group() {
    let (_dir, groups) = fixture(1, 3);
    let paths = groups[0].paths.clone();

    let mut console = scripted("d 9\ns\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert_eq!(existing(&paths), vec![true, true, true]);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].resolution, Resolution::Skipped);

    let out = output_of(console);
    assert!(out.contains("index 9 is out of range (1-3)"));
    assert_eq!(out.matches("Group 1/1").count(), 2);
}

#[test]
fn test_unrecognized_command_reprompts() {
    let (_dir, groups) = fixture(1, 2);
    let paths = groups[0].paths.clone();

    let mut console = scripted("hello\n\nd x\nS\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert_eq!(existing(&paths), vec![true, true]);
    assert_eq!(report.skipped_count(), 1);

    let out = output_of(console);
    assert!(out.contains("unrecognized command: 'hello'"));
    assert!(out.contains("invalid index: 'x'"));
    assert_eq!(out.matches("Group 1/1").count(), 4);
}

#[test]
fn test_quit_on_second_of_five_groups() {
    let (_dir, groups) = fixture(5, 2);
    let first = groups[0].paths.clone();
    let rest: Vec<PathBuf> = groups[1..].iter().flat_map(|g| g.paths.clone()).collect();

    let mut console = scripted("k\nq\nk\nk\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert_eq!(existing(&first), vec![true, false]);
    assert!(rest.iter().all(|p| p.exists()));
    assert!(report.quit);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.untouched_groups, 4);
}

#[test]
fn test_end_of_input_acts_like_quit() {
    let (_dir, groups) = fixture(3, 2);
    let all: Vec<PathBuf> = groups.iter().flat_map(|g| g.paths.clone()).collect();

    let mut console = scripted("s\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert!(all.iter().all(|p| p.exists()));
    assert!(report.quit);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.untouched_groups, 2);
}

#[test]
fn test_all_groups_exhausted() {
    let (_dir, groups) = fixture(3, 3);

    let mut console = scripted("s\nk\nd 1 3\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert!(!report.quit);
    assert_eq!(report.untouched_groups, 0);
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.deleted_count(), 4);
    assert!(output_of(console).contains("Deleted 4 file(s)"));
}

#[test]
fn test_indices_refer_to_listed_snapshot() {
    let (_dir, groups) = fixture(1, 3);
    let paths = groups[0].paths.clone();
    // member 2 vanishes between scan and command
    fs::remove_file(&paths[1]).unwrap();

    let mut console = scripted("d 2,3\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert_eq!(existing(&paths), vec![true, false, false]);
    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.outcomes[0].deletions.failures[0].0, paths[1]);
    assert!(output_of(console).contains("Failed"));
}

#[test]
fn test_modified_file_is_left_in_place() {
    let (_dir, groups) = fixture(1, 2);
    let paths = groups[0].paths.clone();
    fs::write(&paths[1], "grown since the scan finished").unwrap();

    let mut console = scripted("k\n");
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert!(paths[1].exists());
    assert_eq!(report.failed_count(), 1);
    assert!(output_of(console).contains("modified since scan"));
}

#[test]
fn test_dry_run_session() {
    let (_dir, groups) = fixture(2, 3);
    let all: Vec<PathBuf> = groups.iter().flat_map(|g| g.paths.clone()).collect();

    let config = ResolverConfig::default().with_delete_config(DeleteConfig::dry_run());
    let mut console = scripted("k\nd 1,2\n");
    let report = resolve(groups, &mut console, config).unwrap();

    assert!(all.iter().all(|p| p.exists()));
    assert_eq!(report.deleted_count(), 4);
    assert!(output_of(console).contains("Would delete"));
}

#[test]
fn test_protect_last_copy_session() {
    let (_dir, groups) = fixture(1, 2);
    let paths = groups[0].paths.clone();

    let config = ResolverConfig::default().with_protect_last_copy(true);
    let mut console = scripted("d 1,2\nd 2\n");
    resolve(groups, &mut console, config).unwrap();

    assert_eq!(existing(&paths), vec![true, false]);
    assert!(output_of(console).contains("keep at least one"));
}

#[test]
fn test_without_protection_every_copy_can_go() {
    let (_dir, groups) = fixture(1, 2);
    let paths = groups[0].paths.clone();

    let mut console = scripted("d 1,2\n");
    resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert_eq!(existing(&paths), vec![false, false]);
}

#[test]
fn test_no_groups_prints_summary_only() {
    let mut console = scripted("");
    let report = resolve(Vec::new(), &mut console, ResolverConfig::default()).unwrap();

    assert!(report.outcomes.is_empty());
    assert!(!report.quit);
    assert!(!output_of(console).contains("Group"));
}

#[test]
fn test_invalid_utf8_line_reprompts_same_group() {
    let (_dir, groups) = fixture(1, 2);
    let paths = groups[0].paths.clone();

    let input = vec![0xff, 0xfe, b'\n', b'k', b'\n'];
    let mut console = TerminalConsole::new(Cursor::new(input), Vec::new());
    let report = resolve(groups, &mut console, ResolverConfig::default()).unwrap();

    assert_eq!(existing(&paths), vec![true, false]);
    assert_eq!(report.outcomes[0].resolution, Resolution::KeptFirst);

    let out = output_of(console);
    assert!(out.contains("unrecognized command"));
    assert_eq!(out.matches("Group 1/1").count(), 2);
}

#[test]
fn test_interrupt_ends_session_like_quit() {
    let (_dir, groups) = fixture(3, 2);
    let all: Vec<PathBuf> = groups.iter().flat_map(|g| g.paths.clone()).collect();

    // Ctrl+C arrived while the prompt was waiting
    let config = ResolverConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));

    let mut console = scripted("k\nk\nk\n");
    let report = resolve(groups, &mut console, config).unwrap();

    assert!(all.iter().all(|p| p.exists()));
    assert!(report.quit);
    assert!(report.outcomes.is_empty());
    assert_eq!(report.untouched_groups, 3);
}
