use clap::Parser;
use hdcleaner::cli::{Cli, Commands, OutputFormat};
use hdcleaner::error::ExitCode;
use hdcleaner::run_app;
use std::fs;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("hdcleaner").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_parse_scan_with_options() {
    let parsed = cli(&["scan", "/data", "--min-size", "1KiB", "--include-hidden", "-o", "json"]);

    match &parsed.command {
        Commands::Scan(args) => {
            assert_eq!(args.path.to_str(), Some("/data"));
            assert_eq!(args.common.min_size, Some(1024));
            assert!(args.common.include_hidden);
            assert_eq!(args.common.output, OutputFormat::Json);
        }
        other => panic!("Expected scan, got {other:?}"),
    }
}

#[test]
fn test_parse_reconcile_requires_both_sides() {
    assert!(Cli::try_parse_from(["hdcleaner", "reconcile", "--master", "/m"]).is_err());

    let parsed = cli(&["reconcile", "--master", "/m", "--client", "/c", "--io-threads", "2"]);
    assert_eq!(parsed.command.common().io_threads, Some(2));
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["hdcleaner", "-q", "-v", "scan", "/data"]).is_err());
}

#[test]
fn test_run_scan_found_and_not_found() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"diff").unwrap();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&["-q", "scan", root, "-o", "csv"])).unwrap();
    assert_eq!(code, ExitCode::NothingFound);

    fs::write(dir.path().join("c.txt"), b"same").unwrap();
    let code = run_app(cli(&["-q", "scan", root, "-o", "json"])).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_scan_missing_root_is_general_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run_app(cli(&["-q", "scan", missing.to_str().unwrap()])).unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_run_reconcile() {
    let dir = tempdir().unwrap();
    let master = dir.path().join("master");
    let client = dir.path().join("client");
    fs::create_dir_all(&master).unwrap();
    fs::create_dir_all(&client).unwrap();
    fs::write(master.join("m1"), b"hello").unwrap();
    fs::write(client.join("c1"), b"hello").unwrap();

    let code = run_app(cli(&[
        "-q",
        "reconcile",
        "--master",
        master.to_str().unwrap(),
        "--client",
        client.to_str().unwrap(),
        "-o",
        "json",
    ]))
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_reconcile_same_root_is_disjointness_violation() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("f"), b"x").unwrap();
    let root = dir.path().to_str().unwrap();

    let err = run_app(cli(&["-q", "reconcile", "--master", root, "--client", root])).unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::DisjointnessViolation);
}

#[test]
fn test_run_reconcile_aliased_root_is_disjointness_violation() {
    let dir = tempdir().unwrap();
    let master = dir.path().join("master");
    fs::create_dir_all(master.join("sub")).unwrap();
    fs::write(master.join("f"), b"x").unwrap();
    let alias = master.join("sub").join("..");

    let err = run_app(cli(&[
        "-q",
        "reconcile",
        "--master",
        master.to_str().unwrap(),
        "--client",
        alias.to_str().unwrap(),
    ]))
    .unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::DisjointnessViolation);
}

#[test]
fn test_run_reconcile_missing_client_is_general_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run_app(cli(&[
        "-q",
        "reconcile",
        "--master",
        dir.path().to_str().unwrap(),
        "--client",
        missing.to_str().unwrap(),
    ]))
    .unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
}
