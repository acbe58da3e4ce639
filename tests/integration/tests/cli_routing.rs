//! CLI binary integration tests.
//!
//! These tests exercise the compiled `controle` binary to verify that
//! top-level command routing, help text, and configuration error handling
//! work as expected.

use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// A passphrase that satisfies the 32-character minimum.
const PASSPHRASE: &str = "cli-routing-passphrase-0123456789abcdef";

/// Locate the compiled `controle` binary in the workspace target directory.
///
/// Cargo sets `CARGO_MANIFEST_DIR` to the manifest directory of the package
/// being tested. We navigate up to the workspace root and look inside
/// `target/debug/`.
fn controle_bin() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // tests/integration -> workspace root
    let workspace_root = manifest_dir
        .parent()
        .expect("tests/ parent")
        .parent()
        .expect("workspace root");
    let bin = workspace_root.join("target").join("debug").join("controle");
    assert!(
        bin.exists(),
        "controle binary not found at {}; run `cargo build -p controle-cli` first",
        bin.display()
    );
    bin
}

/// A command with all controle configuration cleared from the environment.
fn controle_cmd() -> Command {
    let mut cmd = Command::new(controle_bin());
    cmd.env_remove("CONTROLE_ENCRYPTION_KEY")
        .env_remove("CONTROLE_STORE")
        .env_remove("CONTROLE_DATA_DIR")
        .env_remove("CONTROLE_OPERATOR")
        .env_remove("RUST_LOG");
    cmd
}

/// A command configured with a valid key and a file store rooted in `dir`.
fn configured_cmd(dir: &TempDir) -> Command {
    let mut cmd = controle_cmd();
    cmd.env("CONTROLE_ENCRYPTION_KEY", PASSPHRASE)
        .env("CONTROLE_STORE", "file")
        .env("CONTROLE_DATA_DIR", dir.path());
    cmd
}

#[test]
fn test_cli_version() {
    let output = controle_cmd()
        .arg("version")
        .output()
        .expect("failed to run controle");
    assert!(output.status.success(), "version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("controle"),
        "version output should contain 'controle', got: {}",
        stdout
    );
}

#[test]
fn test_cli_help() {
    let output = controle_cmd()
        .arg("--help")
        .output()
        .expect("failed to run controle");
    assert!(output.status.success(), "--help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("secrets"),
        "help output should mention 'secrets', got: {}",
        stdout
    );
    assert!(
        stdout.contains("audit"),
        "help output should mention 'audit', got: {}",
        stdout
    );
}

#[test]
fn test_cli_unknown_command() {
    let output = controle_cmd()
        .arg("nonexistent-command")
        .output()
        .expect("failed to run controle");
    assert!(
        !output.status.success(),
        "unknown command should return non-zero exit code"
    );
}

#[test]
fn test_cli_secrets_help() {
    let output = controle_cmd()
        .args(["secrets", "--help"])
        .output()
        .expect("failed to run controle secrets --help");
    assert!(output.status.success(), "secrets --help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("create") && stdout.contains("reveal"),
        "secrets help should list subcommands, got: {}",
        stdout
    );
}

#[test]
fn test_cli_reveal_rejects_malformed_id() {
    let output = controle_cmd()
        .args(["secrets", "reveal", "not-a-uuid"])
        .output()
        .expect("failed to run controle");
    assert!(
        !output.status.success(),
        "malformed secret id should be rejected at parse time"
    );
}

#[test]
fn test_cli_create_without_key_fails() {
    let output = controle_cmd()
        .args([
            "secrets", "create", "--app", "a", "--label", "l", "--value", "v",
        ])
        .output()
        .expect("failed to run controle");
    assert!(
        !output.status.success(),
        "create without a configured key should fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("CONTROLE_ENCRYPTION_KEY"),
        "error should name the missing variable, got: {}",
        stderr
    );
}

#[test]
fn test_cli_short_key_fails() {
    let output = controle_cmd()
        .env("CONTROLE_ENCRYPTION_KEY", "way-too-short")
        .args(["secrets", "list", "--app", "a"])
        .output()
        .expect("failed to run controle");
    assert!(
        !output.status.success(),
        "a key below the minimum length should fail validation"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("at least 32 characters"),
        "error should explain the length requirement, got: {}",
        stderr
    );
}

#[test]
fn test_cli_token_requires_no_configuration() {
    let output = controle_cmd()
        .args(["secrets", "token", "--bytes", "8"])
        .output()
        .expect("failed to run controle secrets token");
    assert!(
        output.status.success(),
        "token generation needs no configuration"
    );
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert_eq!(token.len(), 16, "8 random bytes should hex-encode to 16 chars");
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_cli_memory_backend_selected() {
    let output = controle_cmd()
        .env("CONTROLE_ENCRYPTION_KEY", PASSPHRASE)
        .env("CONTROLE_STORE", "memory")
        .args(["secrets", "list", "--app", "billing-api"])
        .output()
        .expect("failed to run controle secrets list");
    assert!(
        output.status.success(),
        "memory backend should work without a data directory, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("No secrets stored"),
        "fresh memory store should be empty, got: {}",
        stdout
    );
}

#[test]
fn test_cli_create_reveal_roundtrip() {
    let dir = TempDir::new().unwrap();

    let output = configured_cmd(&dir)
        .args([
            "secrets",
            "create",
            "--app",
            "billing-api",
            "--label",
            "api key",
            "--value",
            "super-secret-api-key-123",
        ])
        .output()
        .expect("failed to run controle secrets create");
    assert!(
        output.status.success(),
        "create should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // "Secret 'api key' stored with id <uuid>."
    let stdout = String::from_utf8_lossy(&output.stdout);
    let id = stdout
        .trim()
        .trim_end_matches('.')
        .rsplit(' ')
        .next()
        .expect("id in create output")
        .to_string();
    assert_eq!(id.len(), 36, "expected a uuid, got: {}", id);

    let output = configured_cmd(&dir)
        .args(["secrets", "reveal", &id])
        .output()
        .expect("failed to run controle secrets reveal");
    assert!(
        output.status.success(),
        "reveal should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "super-secret-api-key-123"
    );

    let output = configured_cmd(&dir)
        .args(["secrets", "reveal", &id, "--fingerprint"])
        .output()
        .expect("failed to run controle secrets reveal --fingerprint");
    assert!(output.status.success());
    let fingerprint = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert_eq!(fingerprint.len(), 64, "sha-256 fingerprint is 64 hex chars");
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));

    let output = configured_cmd(&dir)
        .args(["secrets", "list", "--app", "billing-api"])
        .output()
        .expect("failed to run controle secrets list");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("api key"),
        "list should show the label, got: {}",
        stdout
    );

    let output = configured_cmd(&dir)
        .args(["audit", "list"])
        .output()
        .expect("failed to run controle audit list");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("create") && stdout.contains("view"),
        "audit trail should record create and view, got: {}",
        stdout
    );
}
