use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("account-bucket").expect("binary exists")
}

#[test]
fn check_billing_is_not_implemented() {
    cmd()
        .arg("--check-billing=billing-bucket")
        .arg("destination-bucket")
        .assert()
        .code(1)
        .stdout(predicate::eq("This feature is not yet implemented.\n"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn missing_arguments_exit_with_one() {
    cmd().assert().code(1);
}

#[test]
fn import_and_check_billing_conflict() {
    cmd()
        .arg("--import=/tmp")
        .arg("--check-billing=billing-bucket")
        .arg("destination-bucket")
        .assert()
        .code(1);
}

#[test]
fn import_from_missing_directory_fails() {
    cmd()
        .arg("--import=/definitely/not/a/directory")
        .arg("destination-bucket")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[ERROR]"));
}

#[test]
fn help_exits_cleanly() {
    cmd()
        .arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("--import"));
}
