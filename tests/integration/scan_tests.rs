use dupesweep::duplicates::{scan, DuplicateFinder, FinderConfig, FinderError};
use dupesweep::scanner::WalkerConfig;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(root: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

#[test]
fn test_scan_hello_world() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"hello");
    let b = write(dir.path(), "b.txt", b"hello");
    let c = write(dir.path(), "c.txt", b"world");

    let groups = scan(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths, vec![a, b]);
    assert!(!groups[0].paths.contains(&c));
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    // same size, different content: hashed, then dropped
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.hashed_files, 3);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let top = write(dir.path(), "a.txt", b"nested duplicate");
    let deep = write(dir.path(), "sub/deeper/a.txt", b"nested duplicate");
    write(dir.path(), "sub/other.txt", b"x");

    let groups = scan(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    let members: HashSet<_> = groups[0].paths.iter().cloned().collect();
    assert_eq!(members, HashSet::from([top, deep]));
}

#[test]
fn test_groups_are_disjoint_and_byte_identical() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write(dir.path(), &format!("x{}.bin", i), b"xxxx");
        write(dir.path(), &format!("y{}.bin", i), b"yyyy");
        write(dir.path(), &format!("z{}.bin", i), &[i as u8; 4]);
    }

    let groups = scan(dir.path()).unwrap();

    let mut seen = HashSet::new();
    for group in &groups {
        assert!(group.len() >= 2);
        let first = fs::read(&group.paths[0]).unwrap();
        for path in &group.paths {
            assert!(seen.insert(path.clone()), "{} in two groups", path.display());
            assert_eq!(fs::read(path).unwrap(), first);
        }
    }
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_prefilter_does_not_change_results() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a1", b"alpha");
    write(dir.path(), "a2", b"alpha");
    write(dir.path(), "b1", b"beta!");
    write(dir.path(), "lonely", b"only one of these");
    write(dir.path(), "c1", b"");
    write(dir.path(), "c2", b"");
    write(dir.path(), "d/a3", b"alpha");

    let with = DuplicateFinder::new(FinderConfig::default().with_size_prefilter(true));
    let without = DuplicateFinder::new(FinderConfig::default().with_size_prefilter(false));

    let (groups_with, _) = with.find_duplicates(dir.path()).unwrap();
    let (groups_without, _) = without.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups_with, groups_without);
    assert!(with.hasher().files_hashed() < without.hasher().files_hashed());
    assert_eq!(without.hasher().files_hashed(), 7);
}

#[test]
fn test_block_size_does_not_change_results() {
    let dir = tempdir().unwrap();
    let big: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
    let mut changed = big.clone();
    changed[150_000] ^= 0xff;
    write(dir.path(), "big1", &big);
    write(dir.path(), "big2", &big);
    write(dir.path(), "big3", &changed);

    for block_size in [512, 4096, 64 * 1024, 1024 * 1024] {
        let finder = DuplicateFinder::new(FinderConfig::default().with_block_size(block_size));
        let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
        assert_eq!(groups.len(), 1, "block size {}", block_size);
        assert_eq!(groups[0].len(), 2);
    }
}

#[test]
fn test_discovery_order_is_stable_across_thread_counts() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("f{:02}", i), format!("{}", i % 5).as_bytes());
    }

    let single = DuplicateFinder::new(FinderConfig::default().with_io_threads(1));
    let many = DuplicateFinder::new(FinderConfig::default().with_io_threads(8));

    let (a, _) = single.find_duplicates(dir.path()).unwrap();
    let (b, _) = many.find_duplicates(dir.path()).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.len(), 5);
    assert!(a[0].paths[0].ends_with("f00"));
}

#[test]
fn test_empty_files_form_a_group_unless_skipped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "e2", b"");

    assert_eq!(scan(dir.path()).unwrap().len(), 1);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        skip_empty: true,
        ..Default::default()
    });
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_size_filters() {
    let dir = tempdir().unwrap();
    write(dir.path(), "s1", b"ab");
    write(dir.path(), "s2", b"ab");
    write(dir.path(), "l1", b"abcdefgh");
    write(dir.path(), "l2", b"abcdefgh");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        min_size: Some(4),
        ..Default::default()
    });
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 8);
}

#[test]
fn test_root_errors_abort() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "file.txt", b"x");

    assert!(matches!(
        scan(&dir.path().join("missing")),
        Err(FinderError::PathNotFound(_))
    ));
    assert!(matches!(scan(&file), Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_relative_root_yields_absolute_paths() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");

    let cwd = std::env::current_dir().unwrap();
    let relative = relative_to(dir.path(), &cwd);

    let groups = scan(&relative).unwrap();
    assert!(groups[0].paths.iter().all(|p| p.is_absolute()));
}

/// `target` relative to `base`, or `target` itself when no relative form exists.
fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let common = target
        .components()
        .zip(base.components())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return target.to_path_buf();
    }
    let mut out = PathBuf::new();
    for _ in base.components().skip(common) {
        out.push("..");
    }
    for part in target.components().skip(common) {
        out.push(part);
    }
    out
}

#[test]
fn test_special_characters_in_filenames() {
    let dir = tempdir().unwrap();
    write(dir.path(), "file with spaces.txt", b"content");
    write(dir.path(), "plain.txt", b"content");
    write(dir.path(), "café_🦀.txt", b"unicode content");
    write(dir.path(), "other.txt", b"unicode content");
    write(dir.path(), "special_!@#$%^&()_+.txt", b"special content");
    write(dir.path(), "copy.txt", b"special content");

    let groups = scan(dir.path()).unwrap();
    assert_eq!(groups.len(), 3);
}

#[test]
fn test_deeply_nested_paths() {
    let dir = tempdir().unwrap();
    let nested: PathBuf = (0..15).map(|i| format!("level_{}", i)).collect();
    let deep = write(dir.path(), nested.join("deep.txt").to_str().unwrap(), b"deep content");
    let shallow = write(dir.path(), "shallow.txt", b"deep content");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    let members: HashSet<_> = groups[0].paths.iter().cloned().collect();
    assert_eq!(members, HashSet::from([deep, shallow]));
}
