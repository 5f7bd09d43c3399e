use clap::Parser;
use dupesweep::cli::Cli;
use dupesweep::error::ExitCode;
use dupesweep::run_app;
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupesweep"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "one").unwrap();
    fs::write(dir.path().join("b"), "four").unwrap();

    let path = dir.path().to_str().unwrap();
    assert_eq!(run(&[path, "-q"]).unwrap(), ExitCode::NoDuplicates);
}

#[test]
fn test_list_mode_does_not_delete() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, "same").unwrap();
    fs::write(&b, "same").unwrap();

    let path = dir.path().to_str().unwrap();
    assert_eq!(run(&[path, "-q", "--list"]).unwrap(), ExitCode::Success);
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_json_mode() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();
    fs::write(dir.path().join("b"), "same").unwrap();

    let path = dir.path().to_str().unwrap();
    assert_eq!(run(&[path, "--json"]).unwrap(), ExitCode::Success);
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run(&[missing.to_str().unwrap(), "-q"]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{:#}", err).contains("Path not found"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("nope.toml");

    let result = run(&[
        dir.path().to_str().unwrap(),
        "-q",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_inconsistent_size_flags_are_rejected() {
    let dir = tempdir().unwrap();

    let result = run(&[
        dir.path().to_str().unwrap(),
        "-q",
        "--min-size",
        "10KB",
        "--max-size",
        "1KB",
    ]);
    assert!(result.is_err());
}
