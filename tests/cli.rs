use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("studychef").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: studychef <COMMAND>"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = Command::cargo_bin("studychef").unwrap();
    cmd.arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: studychef serve"))
        .stdout(predicate::str::contains("--port <PORT>"))
        .stdout(predicate::str::contains("--api-key <API_KEY>"))
        .stdout(predicate::str::contains("--static-dir <STATIC_DIR>"));
}

#[test]
fn test_cli_chat_help() {
    let mut cmd = Command::cargo_bin("studychef").unwrap();
    cmd.arg("chat")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: studychef chat"))
        .stdout(predicate::str::contains("--relay-url <RELAY_URL>"))
        .stdout(predicate::str::contains("--data-dir <DATA_DIR>"));
}

#[test]
fn test_cli_history_empty() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("studychef").unwrap();
    cmd.arg("history")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved chats yet"));
}

#[test]
fn test_cli_history_delete_unknown_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("studychef").unwrap();
    cmd.arg("history")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("delete")
        .arg("12345")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to delete chat 12345"));
}

#[test]
fn test_cli_chat_quits_on_end_of_input() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("studychef").unwrap();
    cmd.arg("chat")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--relay-url")
        .arg("http://127.0.0.1:9")
        .write_stdin("/storage\n/quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Are you vegetarian or non-vegetarian?"))
        .stdout(predicate::str::contains("/1 Vegetarian"))
        .stdout(predicate::str::contains("Storage & Safety Guide"));
}

#[test]
fn test_cli_no_command() {
    let mut cmd = Command::cargo_bin("studychef").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage: studychef <COMMAND>"));
}
