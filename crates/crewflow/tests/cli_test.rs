#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("crew").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("アカウント管理は、ロスターになった"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("rm"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("crew").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crewflow"));
}

/// applyコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_apply_help() {
    let mut cmd = Command::cargo_bin("crew").unwrap();
    cmd.arg("apply")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[NAME]"))
        .stdout(predicate::str::contains("--yes"));
}

/// rmコマンドは名前を必須とすることを確認
#[test]
fn test_rm_requires_name() {
    let mut cmd = Command::cargo_bin("crew").unwrap();
    cmd.arg("rm").assert().failure();
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("crew").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// プロジェクトディレクトリ外でvalidateを実行するとエラーになることを確認
#[test]
fn test_validate_without_project() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("crew").unwrap();
    cmd.current_dir(temp_dir.path())
        .env_remove("CREW_PROJECT_ROOT")
        .arg("validate")
        .assert()
        .failure();
}
