use hdcleaner::duplicates::{DuplicateFinder, DuplicateGroup, FindSummary, FinderConfig};
use hdcleaner::catalog::FilterOptions;
use hdcleaner::scanner::{Walker, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn scan_with(dir: &Path, config: FinderConfig) -> (Vec<DuplicateGroup>, FindSummary) {
    let catalog = Walker::new(dir, WalkerConfig::default()).catalog().unwrap();
    DuplicateFinder::new(config).find(&catalog).unwrap()
}

fn scan(dir: &Path) -> (Vec<DuplicateGroup>, FindSummary) {
    scan_with(dir, FinderConfig::default())
}

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (groups, summary) = scan(dir.path());

    assert!(groups.is_empty());
    assert_eq!(summary.total_records, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let (groups, summary) = scan(dir.path());

    assert!(groups.is_empty());
    assert_eq!(summary.total_records, 3);
    // Same size, so all three were hashed before being told apart.
    assert_eq!(summary.hashed_files, 3);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("x.txt"), b"0123456789");
    write(&dir.path().join("y.txt"), b"0123456789");
    write(&dir.path().join("z.txt"), b"abcde");

    let (groups, summary) = scan(dir.path());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 10);
    assert_eq!(
        groups[0].members,
        vec![dir.path().join("x.txt"), dir.path().join("y.txt")]
    );
    assert_eq!(summary.total_records, 3);
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.hashed_files, 2);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"nested duplicate");
    write(&dir.path().join("sub/b.txt"), b"nested duplicate");
    write(&dir.path().join("sub/deeper/c.txt"), b"nested duplicate");

    let (groups, _) = scan(dir.path());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert!(groups[0].contains(&dir.path().join("sub/deeper/c.txt")));
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.bin"), b"AAAA");
    write(&dir.path().join("b.bin"), b"BBBB");
    write(&dir.path().join("c.bin"), b"AAAA");
    write(&dir.path().join("d.bin"), b"BBBB");

    let (groups, _) = scan(dir.path());

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].members, vec![dir.path().join("a.bin"), dir.path().join("c.bin")]);
    assert_eq!(groups[1].members, vec![dir.path().join("b.bin"), dir.path().join("d.bin")]);
}

#[test]
fn test_scan_groups_ordered_by_size_descending() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1"), b"ab");
    write(&dir.path().join("small2"), b"ab");
    write(&dir.path().join("large1"), &[7u8; 4096]);
    write(&dir.path().join("large2"), &[7u8; 4096]);

    let (groups, _) = scan(dir.path());

    let sizes: Vec<u64> = groups.iter().map(|g| g.size).collect();
    assert_eq!(sizes, vec![4096, 2]);
}

#[test]
fn test_scan_skips_hidden_and_vcs_files_by_default() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("visible.txt"), b"same");
    write(&dir.path().join(".hidden.txt"), b"same");
    write(&dir.path().join(".git/objects/ab"), b"same");
    write(&dir.path().join("Thumbs.db"), b"same");

    let (groups, summary) = scan(dir.path());

    assert!(groups.is_empty());
    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.eligible_records, 1);
}

#[test]
fn test_scan_include_hidden() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("visible.txt"), b"same");
    write(&dir.path().join(".hidden.txt"), b"same");

    let config = FinderConfig::default().with_filter(FilterOptions::default().with_only_visible(false));
    let (groups, _) = scan_with(dir.path(), config);

    assert_eq!(groups.len(), 1);
    assert!(groups[0].contains(&dir.path().join(".hidden.txt")));
}

#[test]
fn test_scan_min_size() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("tiny1"), b"t");
    write(&dir.path().join("tiny2"), b"t");
    write(&dir.path().join("big1"), b"bigger content");
    write(&dir.path().join("big2"), b"bigger content");

    let config = FinderConfig::default().with_filter(FilterOptions::default().with_min_size(2));
    let (groups, summary) = scan_with(dir.path(), config);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 14);
    assert_eq!(summary.eligible_records, 2);
}

#[test]
fn test_scan_single_io_thread_matches_default() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write(&dir.path().join(format!("dup_{i}.dat")), b"shared payload");
        write(&dir.path().join(format!("uniq_{i}.dat")), format!("unique {i:>8}").as_bytes());
    }

    let (parallel, _) = scan(dir.path());
    let (serial, _) = scan_with(dir.path(), FinderConfig::default().with_io_threads(1));

    assert_eq!(parallel, serial);
    assert_eq!(parallel.len(), 1);
    assert_eq!(parallel[0].len(), 6);
}

#[test]
fn test_scan_small_chunk_size_matches_default() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    write(&dir.path().join("a"), &content);
    write(&dir.path().join("b"), &content);

    let (default_groups, _) = scan(dir.path());
    let (chunked, _) = scan_with(dir.path(), FinderConfig::default().with_chunk_size(7));

    assert_eq!(default_groups, chunked);
}
