//! Integration tests for the `argcomplete-shellcode` binary.
//!
//! The responder binary (`argcomplete`) answers over an inherited fd 8,
//! which a subprocess test harness can't set up without unsafe,
//! platform-specific `pre_exec` plumbing; its logic is covered directly by
//! `argcomplete_shell::respond`'s unit tests instead. This binary has no
//! such requirement, so it's driven end to end here, the same way a
//! built binary's version output gets driven with `assert_cmd` elsewhere
//! in this workspace's stack.

use std::io::Write as _;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn bash_snippet_registers_a_complete_binding() {
    Command::cargo_bin("argcomplete-shellcode")
        .unwrap()
        .arg("myprog")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "complete -o nospace -o default -F _argcomplete_completion myprog",
        ));
}

#[test]
fn zsh_snippet_registers_a_compdef_binding() {
    Command::cargo_bin("argcomplete-shellcode")
        .unwrap()
        .args(["--shell", "zsh", "myprog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compdef _argcomplete_completion myprog"));
}

#[test]
fn custom_completer_name_is_honored() {
    Command::cargo_bin("argcomplete-shellcode")
        .unwrap()
        .args(["--completer", "myprog-complete", "myprog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("myprog-complete 8>&1"));
}

#[test]
fn missing_executable_and_check_script_is_a_usage_error() {
    Command::cargo_bin("argcomplete-shellcode")
        .unwrap()
        .assert()
        .failure();
}

#[test]
fn check_script_with_marker_succeeds() {
    let dir = assert_fs::TempDir::new().unwrap();
    let script_path = dir.path().join("myprog");
    let mut file = std::fs::File::create(&script_path).unwrap();
    writeln!(file, "#!/bin/sh\n# PYTHON_ARGCOMPLETE_OK\necho hi").unwrap();

    Command::cargo_bin("argcomplete-shellcode")
        .unwrap()
        .arg("--check-script")
        .arg(&script_path)
        .assert()
        .success();
}

#[test]
fn check_script_without_marker_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let script_path = dir.path().join("myprog");
    std::fs::write(&script_path, "#!/bin/sh\necho hi\n").unwrap();

    Command::cargo_bin("argcomplete-shellcode")
        .unwrap()
        .arg("--check-script")
        .arg(&script_path)
        .assert()
        .failure();
}
