use hdcleaner::catalog::Catalog;
use hdcleaner::duplicates::{check_disjoint, DuplicateFinder, DuplicateGroup};
use hdcleaner::scanner::{Walker, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use unicode_normalization::UnicodeNormalization;

fn scan(dir: &Path) -> Vec<DuplicateGroup> {
    let catalog = Walker::new(dir, WalkerConfig::default()).catalog().unwrap();
    let (groups, _) = DuplicateFinder::with_defaults().find(&catalog).unwrap();
    groups
}

#[test]
fn test_paths_with_quotes() {
    let dir = tempdir().unwrap();

    // Windows does not allow double quotes in filenames.
    if cfg!(not(windows)) {
        let file_path = dir.path().join("file_with_\"quote\".txt");
        File::create(&file_path)
            .expect("Failed to create file with quotes")
            .write_all(b"content")
            .unwrap();
        File::create(dir.path().join("duplicate.txt"))
            .unwrap()
            .write_all(b"content")
            .unwrap();

        let groups = scan(dir.path());

        assert_eq!(groups.len(), 1);
        assert!(groups[0].contains(&file_path));
    }
}

#[test]
fn test_paths_with_newlines() {
    let dir = tempdir().unwrap();

    // Windows does not allow newlines in filenames.
    if cfg!(not(windows)) {
        let file_path = dir.path().join("file_with\nnewline.txt");
        File::create(&file_path)
            .expect("Failed to create file with newline")
            .write_all(b"content")
            .unwrap();
        File::create(dir.path().join("duplicate.txt"))
            .unwrap()
            .write_all(b"content")
            .unwrap();

        let groups = scan(dir.path());

        assert_eq!(groups.len(), 1);
        assert!(groups[0]
            .members
            .iter()
            .any(|p| p.to_string_lossy().contains('\n')));
    }
}

#[test]
fn test_extremely_long_paths() {
    let dir = tempdir().unwrap();

    let mut current_path = dir.path().to_path_buf();
    let folder_name = "a".repeat(50);

    // 6 levels of 50-char folders = 300+ chars.
    for i in 0..6 {
        current_path = current_path.join(format!("{}_{}", i, folder_name));
        if let Err(e) = fs::create_dir(&current_path) {
            eprintln!("Skipping extremely long path test: failed to create dir: {}", e);
            return;
        }
    }

    let file_path = current_path.join("file.txt");
    if let Err(e) = File::create(&file_path).and_then(|mut f| f.write_all(b"content")) {
        eprintln!("Skipping extremely long path test: failed to create file: {}", e);
        return;
    }
    File::create(dir.path().join("duplicate.txt"))
        .unwrap()
        .write_all(b"content")
        .unwrap();

    let groups = scan(dir.path());

    assert_eq!(groups.len(), 1);
    assert!(groups[0].contains(&file_path));
}

#[test]
fn test_disjointness_ignores_unicode_normalization_form() {
    let name_nfc = "café.txt";
    let name_nfd = "cafe\u{0301}.txt";
    assert_ne!(name_nfc, name_nfd);
    assert_eq!(name_nfc, name_nfd.nfc().collect::<String>());

    let master = Catalog::from_entries(vec![(format!("/archive/{name_nfc}"), Some(7))]);
    let client = Catalog::from_entries(vec![(format!("/archive/{name_nfd}"), Some(7))]);

    assert!(check_disjoint(&master, &client).is_err());
}

#[test]
fn test_unicode_names_on_disk() {
    let dir = tempdir().unwrap();

    let path_nfc = dir.path().join("café_test.txt");
    File::create(&path_nfc).unwrap().write_all(b"content").unwrap();

    // On macOS (APFS/HFS+) both forms may name the same file.
    let path_nfd = dir.path().join("cafe\u{0301}_test.txt");
    let _ = File::create(&path_nfd).and_then(|mut f| f.write_all(b"content"));
    File::create(dir.path().join("other_file.txt"))
        .unwrap()
        .write_all(b"content")
        .unwrap();

    let file_count = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .count();

    let groups = scan(dir.path());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), file_count);
}
