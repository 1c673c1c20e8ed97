use std::process::{Command, Output};

mod common;
use common::closed_address;

fn provision(extra: &[&str]) -> Output {
    let cluster = closed_address();
    let mut args = vec![
        "-c",
        cluster.as_str(),
        "-v",
        "vol1",
        "-vs",
        "svm1",
        "-q",
        "qt1",
        "-sh",
        "1073741824",
        "-fh",
        "10000",
        "-p",
        "secret",
        "--timeout",
        "5",
        "--silent",
    ];
    args.extend_from_slice(extra);
    Command::new(env!("CARGO_BIN_EXE_qtree-provision"))
        .args(&args)
        .output()
        .expect("run binary")
}

#[test]
fn failed_calls_still_exit_zero() {
    let output = provision(&[]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error: Qtree was not created"), "{stdout}");
    assert!(stdout.contains("Error: Quota Rule was not created"), "{stdout}");
}

#[test]
fn strict_exits_one_when_a_call_fails() {
    let output = provision(&["--strict"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_flags_exit_two() {
    let output = Command::new(env!("CARGO_BIN_EXE_qtree-provision"))
        .args(["-c", "10.0.0.1:443"])
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn malformed_cluster_exits_two() {
    let output = Command::new(env!("CARGO_BIN_EXE_qtree-provision"))
        .args([
            "-c",
            "10.0.0.1:99999",
            "-v",
            "vol1",
            "-vs",
            "svm1",
            "-q",
            "qt1",
            "-sh",
            "1",
            "-fh",
            "1",
            "-p",
            "secret",
        ])
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid port number"));
}
