//! CLI integration tests
//!
//! Tests the git-key-manager CLI using assert_cmd. Every test runs against a
//! temporary HOME, config and registry, and points the SSH binaries at names
//! that don't exist so no real agent is ever touched.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = r#"
auth_host = "git@example.invalid"
auth_timeout = 2
command_timeout = 2

[binaries]
ssh_add = "gkm-test-missing-ssh-add"
ssh_agent = "gkm-test-missing-ssh-agent"
ssh = "gkm-test-missing-ssh"
"#;
        std::fs::write(dir.path().join("config.toml"), config).expect("Failed to write config");
        Self { dir }
    }

    fn registry(&self) -> PathBuf {
        self.dir.path().join("keys.json")
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("git-key-manager")
            .expect("Failed to locate git-key-manager binary");
        cmd.env("HOME", self.dir.path())
            .env_remove("GIT_KEY_MANAGER_REGISTRY")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.dir.path().join("config.toml"))
            .arg("--registry")
            .arg(self.registry());
        cmd
    }
}

#[test]
fn test_cli_help() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-key-manager"))
        .stdout(predicate::str::contains("ssh-agent"));
}

#[test]
fn test_cli_version() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-key-manager"));
}

#[test]
fn test_cli_unknown_command() {
    Sandbox::new()
        .cmd()
        .arg("nonexistent-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_cli_list_empty() {
    Sandbox::new()
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No keys configured"));
}

#[test]
fn test_cli_add_persists_registry() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["add", "work", "/k1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Key 'work' added successfully!"));

    let content = std::fs::read_to_string(sandbox.registry()).unwrap();
    assert_eq!(content, "{\n  \"work\": \"/k1\"\n}");

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("work"))
        .stdout(predicate::str::contains("/k1"))
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn test_cli_add_rejects_blank_name() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["add", " ", "/k1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key name"));
    assert!(!sandbox.registry().exists());
}

#[test]
fn test_cli_remove_force() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["add", "work", "/k1"]).assert().success();
    sandbox.cmd().args(["add", "personal", "/k2"]).assert().success();

    sandbox
        .cmd()
        .args(["remove", "work", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Key 'work' removed"));

    let content = std::fs::read_to_string(sandbox.registry()).unwrap();
    assert_eq!(content, "{\n  \"personal\": \"/k2\"\n}");
}

#[test]
fn test_cli_remove_prompt_declined() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["add", "work", "/k1"]).assert().success();

    sandbox
        .cmd()
        .args(["remove", "work"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Aborted"));

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("work"));
}

#[test]
fn test_cli_remove_missing_fails() {
    Sandbox::new()
        .cmd()
        .args(["remove", "ghost", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Key not found: ghost"));
}

#[test]
fn test_cli_malformed_registry_warns_and_continues() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.registry(), "{ definitely not json").unwrap();

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No keys configured"))
        .stderr(predicate::str::contains("malformed registry"));
}

#[test]
fn test_cli_load_missing_key_file() {
    let sandbox = Sandbox::new();
    let missing = sandbox.path().join("no_such_key");
    sandbox
        .cmd()
        .args(["add", "work"])
        .arg(&missing)
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["load", "work"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Key file not found"));
}

#[test]
fn test_cli_load_unknown_name() {
    Sandbox::new()
        .cmd()
        .args(["load", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No key registered as 'ghost'"));
}

#[test]
fn test_cli_status_without_agent() {
    Sandbox::new()
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: No keys loaded"))
        .stdout(predicate::str::contains("Agent: no agent"));
}

#[test]
fn test_cli_test_without_ssh_fails() {
    Sandbox::new()
        .cmd()
        .arg("test")
        .assert()
        .failure()
        .stdout(predicate::str::contains("git@example.invalid"));
}

#[test]
fn test_cli_config_path() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            sandbox.path().to_string_lossy().into_owned(),
        ));
}

#[test]
fn test_cli_config_init_refuses_to_overwrite() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));

    sandbox
        .cmd()
        .args(["config", "init", "--force"])
        .assert()
        .success();
    let content = std::fs::read_to_string(sandbox.path().join("config.toml")).unwrap();
    assert!(content.contains("auth_host = \"git@github.com\""));
}
