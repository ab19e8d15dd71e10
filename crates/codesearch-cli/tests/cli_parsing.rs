//! CLI parsing tests for the `codesearch` command.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn codesearch() -> Command {
    Command::cargo_bin("codesearch").expect("failed to find codesearch binary")
}

#[test]
fn help_lists_every_subcommand() {
    codesearch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("index"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn version_flag_succeeds() {
    codesearch().arg("--version").assert().success();
}

#[test]
fn search_without_query_fails() {
    codesearch().arg("search").assert().failure();
}

#[test]
fn unknown_subcommand_fails_parsing() {
    codesearch()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
