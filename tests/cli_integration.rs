//! Integration tests for CLI commands.
//!
//! These tests verify the CLI surface without requiring a reachable
//! message bus.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the buspeek binary
fn buspeek() -> Command {
    Command::cargo_bin("buspeek").unwrap()
}

#[test]
fn test_help_command() {
    buspeek()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Inspect D-Bus objects"))
        .stdout(predicate::str::contains("props"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("call"))
        .stdout(predicate::str::contains("children"));
}

#[test]
fn test_version_command() {
    buspeek()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("buspeek"));
}

#[test]
fn test_dest_is_required() {
    buspeek()
        .args(["--interface", "org.example.Iface", "props"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dest"));
}

#[test]
fn test_interface_is_required() {
    buspeek()
        .args(["--dest", "org.example.Svc", "children"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--interface"));
}

#[test]
fn test_get_requires_property_name() {
    buspeek()
        .args(["--dest", "org.example.Svc", "--interface", "org.example.Iface", "get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME"));
}

#[test]
fn test_call_requires_method_name() {
    buspeek()
        .args(["--dest", "org.example.Svc", "--interface", "org.example.Iface", "call"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("METHOD"));
}

#[test]
fn test_unknown_subcommand() {
    buspeek()
        .args(["--dest", "org.example.Svc", "--interface", "org.example.Iface", "frobnicate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn test_call_help_mentions_json_args() {
    buspeek()
        .args(["call", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON scalar"));
}
