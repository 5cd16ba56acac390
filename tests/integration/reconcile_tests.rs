use hdcleaner::catalog::Catalog;
use hdcleaner::duplicates::{
    check_disjoint_roots, FinderConfig, ReconcileError, ReconcileSummary, Reconciler, ReconciliationMatch,
};
use hdcleaner::scanner::{canonical_root, Walker, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Collections {
    _dir: TempDir,
    master: PathBuf,
    client: PathBuf,
}

impl Collections {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let master = dir.path().join("master");
        let client = dir.path().join("client");
        fs::create_dir_all(&master).unwrap();
        fs::create_dir_all(&client).unwrap();
        Self {
            _dir: dir,
            master,
            client,
        }
    }

    fn master_file(&self, name: &str, content: &[u8]) -> PathBuf {
        write(&self.master.join(name), content)
    }

    fn client_file(&self, name: &str, content: &[u8]) -> PathBuf {
        write(&self.client.join(name), content)
    }

    fn reconcile(&self) -> (Vec<ReconciliationMatch>, ReconcileSummary) {
        let master = catalog(&self.master);
        let client = catalog(&self.client);
        Reconciler::new(FinderConfig::default())
            .reconcile(&master, &client)
            .unwrap()
    }
}

fn write(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
    path.to_path_buf()
}

fn catalog(root: &Path) -> Catalog {
    Walker::new(root, WalkerConfig::default()).catalog().unwrap()
}

#[test]
fn test_reconcile_reports_only_client_files_in_master() {
    let c = Collections::new();
    let m1 = c.master_file("m1.bin", b"hello");
    c.master_file("m2.bin", b"other content");
    let c1 = c.client_file("c1.bin", b"hello");
    c.client_file("c2.bin", b"world");

    let (matches, summary) = c.reconcile();

    assert_eq!(
        matches,
        vec![ReconciliationMatch {
            client_path: c1,
            master_path: m1,
            size: 5,
        }]
    );
    assert_eq!(summary.matched_client_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
    assert_eq!(summary.master.eliminated_by_size, 1);
}

#[test]
fn test_reconcile_ignores_duplicates_within_one_side() {
    let c = Collections::new();
    c.master_file("a", b"master twin");
    c.master_file("b", b"master twin");
    c.client_file("x", b"client twin");
    c.client_file("y", b"client twin");

    let (matches, _) = c.reconcile();

    assert!(matches.is_empty());
}

#[test]
fn test_reconcile_one_match_per_master_copy() {
    let c = Collections::new();
    let m1 = c.master_file("2019/photo.jpg", b"jpeg bytes");
    let m2 = c.master_file("backup/photo.jpg", b"jpeg bytes");
    let c1 = c.client_file("DCIM/IMG_0001.jpg", b"jpeg bytes");

    let (matches, summary) = c.reconcile();

    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.client_path == c1));
    assert_eq!(matches[0].master_path, m1);
    assert_eq!(matches[1].master_path, m2);
    assert_eq!(summary.matched_client_files, 1);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_reconcile_order_by_size_then_client_path() {
    let c = Collections::new();
    c.master_file("small", b"ab");
    c.master_file("large", b"a much larger file");
    let small_b = c.client_file("b_small", b"ab");
    let small_a = c.client_file("a_small", b"ab");
    let large = c.client_file("z_large", b"a much larger file");

    let (matches, _) = c.reconcile();

    let clients: Vec<&Path> = matches.iter().map(|m| m.client_path.as_path()).collect();
    assert_eq!(clients, vec![large.as_path(), small_a.as_path(), small_b.as_path()]);
}

#[test]
fn test_reconcile_empty_sides() {
    let c = Collections::new();
    c.client_file("lonely", b"nobody in master");

    let (matches, summary) = c.reconcile();

    assert!(matches.is_empty());
    assert_eq!(summary.master.total_records, 0);
    assert_eq!(summary.client.hashed_files, 0);
}

#[test]
fn test_reconcile_hidden_files_skipped_on_both_sides() {
    let c = Collections::new();
    c.master_file(".config", b"settings");
    c.client_file(".config", b"settings");

    let (matches, summary) = c.reconcile();

    assert!(matches.is_empty());
    assert_eq!(summary.master.eligible_records, 0);
    assert_eq!(summary.client.eligible_records, 0);
}

#[test]
fn test_reconcile_overlapping_roots_rejected() {
    let c = Collections::new();
    c.master_file("shared.txt", b"content");

    let master = catalog(&c.master);
    let result = Reconciler::with_defaults().reconcile(&master, &master);

    match result {
        Err(ReconcileError::DisjointnessViolation { count, paths }) => {
            assert_eq!(count, 1);
            assert_eq!(paths, vec![c.master.join("shared.txt")]);
        }
        other => panic!("Expected DisjointnessViolation, got {:?}", other.map(|(m, _)| m)),
    }
}

#[test]
fn test_reconcile_nested_client_inside_master_rejected() {
    let c = Collections::new();
    let nested = c.master.join("inbox");
    write(&nested.join("new.txt"), b"fresh");

    let master = catalog(&c.master);
    let client = catalog(&nested);
    let result = Reconciler::with_defaults().reconcile(&master, &client);

    assert!(matches!(result, Err(ReconcileError::DisjointnessViolation { count: 1, .. })));
}

#[test]
fn test_reconcile_same_root_with_cur_dir_spelling_rejected() {
    let c = Collections::new();
    c.master_file("shared.txt", b"content");

    let master = catalog(&c.master);
    let client = catalog(&c.master.join("."));
    let result = Reconciler::with_defaults().reconcile(&master, &client);

    assert!(matches!(result, Err(ReconcileError::DisjointnessViolation { count: 1, .. })));
}

#[test]
fn test_canonical_roots_catch_parent_dir_alias() {
    let c = Collections::new();
    c.master_file("shared.txt", b"content");
    fs::create_dir_all(c.master.join("sub")).unwrap();

    let master = canonical_root(&c.master).unwrap();
    let client = canonical_root(&c.master.join("sub").join("..")).unwrap();
    assert_eq!(master, client);

    match check_disjoint_roots(&master, &client) {
        Err(ReconcileError::DisjointnessViolation { count, paths }) => {
            assert_eq!(count, 1);
            assert_eq!(paths, vec![client.clone()]);
        }
        other => panic!("Expected DisjointnessViolation, got {other:?}"),
    }
}

#[test]
fn test_empty_nested_client_root_rejected() {
    let c = Collections::new();
    c.master_file("a.txt", b"content");
    fs::create_dir_all(c.master.join("inbox")).unwrap();

    let master = canonical_root(&c.master).unwrap();
    let client = canonical_root(&c.master.join("inbox")).unwrap();

    assert!(matches!(
        check_disjoint_roots(&master, &client),
        Err(ReconcileError::DisjointnessViolation { count: 1, .. })
    ));
    assert!(check_disjoint_roots(&master, &canonical_root(&c.client).unwrap()).is_ok());
}
