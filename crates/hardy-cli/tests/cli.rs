//! Integration test: the driver from file to rendered report.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use hardy_cli::{execute, render, Args, CliError};
use hardy_test_utils::CHAIN_TEXT;

/// Write `contents` to a file unique to this test and return its path.
fn input_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hardy-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn args(extra: &[&str], file: &PathBuf) -> Args {
    let mut argv = vec!["hardy"];
    argv.extend_from_slice(extra);
    let file = file.to_str().unwrap();
    argv.push(file);
    Args::try_parse_from(argv).unwrap()
}

#[test]
fn defaults_match_documented_values() {
    let a = Args::try_parse_from(["hardy", "frame.txt"]).unwrap();
    assert_eq!(a.workers, 4);
    assert_eq!(a.tolerance, 0.1);
    assert_eq!(a.tolerance_check, 0.2);
    assert!(!a.print);
}

#[test]
fn chain_file_reports_same() {
    let path = input_file("chain.txt", CHAIN_TEXT);
    let a = args(&["-n", "3"], &path);
    let summary = execute(&a).unwrap();
    assert!(summary.comparison.is_match());
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.concurrent.workers, 3);

    let mut out = Vec::new();
    render(&summary, false, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Sequential version took"));
    assert!(text.contains("Parallel version took"));
    assert!(text.trim_end().ends_with("Same"));
    assert!(!text.contains("Not Same"));
}

#[test]
fn print_flag_lists_nodes() {
    let path = input_file("chain-print.txt", CHAIN_TEXT);
    let a = args(&["--print", "--workers", "2"], &path);
    let summary = execute(&a).unwrap();
    let mut out = Vec::new();
    render(&summary, a.print, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Node id: 0, num of ends: 1, Fix"));
    assert!(text.contains("Node id: 2, num of ends: 1, Non-fix"));
}

#[test]
fn unknown_node_is_an_input_error() {
    let bad = CHAIN_TEXT.replace("1 0.5 0 -416.7 2", "1 0.5 0 -416.7 99");
    let path = input_file("unknown-node.txt", &bad);
    let err = execute(&args(&[], &path)).unwrap_err();
    assert!(matches!(err, CliError::Load(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn missing_file_is_an_input_error() {
    let path = std::env::temp_dir().join("hardy-cli-does-not-exist.txt");
    let err = execute(&args(&[], &path)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn divergence_is_a_solver_failure() {
    // Node 1's only factor is 0: it can never balance.
    let text = "2\n0 F\n1 N\n1\n0 1.0 0 0.0 1 0.0 0 25.0\n";
    let path = input_file("diverge.txt", text);
    let err = execute(&args(&["--max-passes", "40"], &path)).unwrap_err();
    assert!(matches!(err, CliError::Solve(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn comparison_tighter_than_relaxation_is_an_input_error() {
    let path = input_file("chain-tight.txt", CHAIN_TEXT);
    let a = args(&["--tolerance-check", "0.05", "--tolerance", "0.1"], &path);
    let err = execute(&a).unwrap_err();
    assert!(matches!(
        err,
        CliError::ToleranceCheck { check, tolerance } if check == 0.05 && tolerance == 0.1
    ));
    assert_eq!(err.exit_code(), 2);

    // Equal tolerances are accepted.
    let a = args(&["--tolerance-check", "0.1", "--tolerance", "0.1"], &path);
    assert!(execute(&a).is_ok());
}

#[test]
fn zero_workers_is_a_solver_failure() {
    let path = input_file("chain-zero.txt", CHAIN_TEXT);
    let err = execute(&args(&["-n", "0"], &path)).unwrap_err();
    assert!(matches!(err, CliError::Solve(_)));
}
