//! Smoke tests for the `chacl` executable.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn chacl() -> Command {
    let mut command = Command::cargo_bin("chacl").expect("chacl binary");
    command.env_remove("CHACL_LOG");
    command
}

#[test]
fn version_prints_package_version() {
    chacl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "chacl {}",
            env!("CARGO_PKG_VERSION")
        )))
        .stderr(predicate::str::is_empty());
}

#[test]
fn help_lists_options() {
    chacl()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("--deny-everyone"))
        .stdout(predicate::str::contains("--strip-only"));
}

#[test]
fn usage_error_exits_with_one() {
    chacl()
        .arg("--no-such-flag")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("chacl: error:"));
}

#[test]
fn missing_rules_file_exits_with_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    chacl()
        .arg("--dry-run")
        .arg(dir.path().join("missing.rules"))
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing.rules"));
}

#[cfg(unix)]
#[test]
fn rules_from_standard_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("tree")).expect("mkdir");
    fs::write(dir.path().join("tree/file"), b"").expect("write");

    chacl()
        .current_dir(dir.path())
        .args(["--dry-run", "--acl-xattr", "user.chacl_bin_test", "-"])
        .write_stdin("# comment\n\nu:r:0::tree\n")
        .assert()
        .success()
        .stdout("visited 2, updated 2, unchanged 0, skipped 0\n");
}

#[test]
fn syntax_error_names_the_line() {
    chacl()
        .arg("-")
        .write_stdin("u:rw:alice:/srv/share\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("line 1"));
}
