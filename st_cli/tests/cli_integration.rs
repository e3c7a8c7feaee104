//! Integration tests for argument handling of the st_cli binary.
//!
//! None of these reach the database: they stop at help output or at
//! argument errors.

use std::process::Command;

fn st_cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_st_cli"));
    // Keep a stray .env from pointing tests at a real database
    cmd.env("DATABASE_URL", "postgres://invalid@127.0.0.1:1/none");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let output = st_cli().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["create", "enroll", "round", "record", "finalize", "standings"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_unknown_command_exits_with_usage_error() {
    let output = st_cli().arg("shuffle").output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized command 'shuffle'"));
}

#[test]
fn test_missing_command_exits_with_usage_error() {
    let output = st_cli().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No command given"));
}

#[test]
fn test_bad_result_code_is_rejected_before_connecting() {
    let output = st_cli()
        .args([
            "record",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "3x0",
            "draw",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid result '3x0'"));
}
