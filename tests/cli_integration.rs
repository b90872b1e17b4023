//! Integration tests for the wpstack CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  PINs
//! come from `WPSTACK_PIN` / `WPSTACK_NEW_PIN`, so nothing here needs a
//! terminal.  Each test writes a `.wpstack.toml` with the cheapest KDF
//! settings so the suite stays quick.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PIN: &str = "1234";

/// Helper: get a Command pointing at the wpstack binary.
fn wpstack() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("wpstack").expect("binary should exist");
    cmd.env_remove("WPSTACK_PIN")
        .env_remove("WPSTACK_NEW_PIN")
        .env_remove("WPSTACK_VAULT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper: a project directory with a fast-KDF config file.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child(".wpstack.toml")
        .write_str("argon2_memory_kib = 8192\nargon2_iterations = 1\nargon2_parallelism = 1\n")
        .unwrap();
    dir
}

/// Helper: run `wpstack` inside `dir` with the PIN set.
fn in_project(dir: &TempDir) -> Command {
    let mut cmd = wpstack();
    cmd.current_dir(dir.path()).env("WPSTACK_PIN", PIN);
    cmd
}

fn set(dir: &TempDir, name: &str, value: &str) {
    in_project(dir).args(["set", name, value]).assert().success();
}

// ---------------------------------------------------------------------------
// Help and version
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    wpstack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "PIN-encrypted credential vault for WordPress deployments",
        ))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("change-pin"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn version_flag_shows_version() {
    wpstack()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_fails() {
    wpstack().arg("frobnicate").assert().failure();
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_vault_file() {
    let dir = project();
    in_project(&dir)
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("Vault created"));

    dir.child(".wpstack/secrets.vault")
        .assert(predicate::path::is_file());
    dir.child(".wpstack/secrets.vault.backup")
        .assert(predicate::path::missing());
}

#[test]
fn init_twice_fails() {
    let dir = project();
    in_project(&dir).arg("init").assert().success();
    in_project(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_short_pin() {
    let dir = project();
    wpstack()
        .current_dir(dir.path())
        .env("WPSTACK_PIN", "12")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 4"));

    dir.child(".wpstack").assert(predicate::path::missing());
}

#[test]
fn vault_dir_flag_overrides_default() {
    let dir = project();
    in_project(&dir)
        .args(["init", "--vault-dir", "elsewhere"])
        .assert()
        .success();

    dir.child("elsewhere/secrets.vault")
        .assert(predicate::path::is_file());
    dir.child(".wpstack/secrets.vault")
        .assert(predicate::path::missing());
}

#[test]
fn vault_dir_env_var_overrides_default() {
    let dir = project();
    in_project(&dir)
        .env("WPSTACK_VAULT_DIR", "from-env")
        .arg("init")
        .assert()
        .success();

    dir.child("from-env/secrets.vault")
        .assert(predicate::path::is_file());
    dir.child(".wpstack").assert(predicate::path::missing());
}

#[test]
fn read_only_commands_leave_no_vault_dir() {
    let dir = project();
    in_project(&dir).arg("status").assert().success();
    in_project(&dir).args(["get", "GITHUB_TOKEN"]).assert().failure();
    in_project(&dir).arg("list").assert().failure();

    dir.child(".wpstack").assert(predicate::path::missing());
}

#[test]
fn out_of_range_argon2_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    dir.child(".wpstack.toml")
        .write_str("argon2_memory_kib = 8192\nargon2_iterations = 100\nargon2_parallelism = 1\n")
        .unwrap();

    in_project(&dir)
        .args(["set", "GITHUB_TOKEN", "ghp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file error"))
        .stderr(predicate::str::contains("iterations"));

    dir.child(".wpstack").assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// set / get / list / delete
// ---------------------------------------------------------------------------

#[test]
fn set_then_get_prints_value_on_stdout() {
    let dir = project();
    set(&dir, "GITHUB_TOKEN", "ghp_abc");

    in_project(&dir)
        .args(["get", "GITHUB_TOKEN"])
        .assert()
        .success()
        .stdout("ghp_abc\n");
}

#[test]
fn set_creates_vault_on_first_write() {
    let dir = project();
    set(&dir, "CLOUDFLARE_API_TOKEN", "cf");
    dir.child(".wpstack/secrets.vault")
        .assert(predicate::path::is_file());
}

#[test]
fn set_reads_value_from_stdin() {
    let dir = project();
    in_project(&dir)
        .args(["set", "KOMODO_API_SECRET"])
        .write_stdin("piped-secret\n")
        .assert()
        .success();

    in_project(&dir)
        .args(["get", "KOMODO_API_SECRET"])
        .assert()
        .success()
        .stdout("piped-secret\n");
}

#[test]
fn set_rejects_invalid_name() {
    let dir = project();
    in_project(&dir)
        .args(["set", "BAD NAME", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid secret name"));
}

#[test]
fn get_missing_secret_fails() {
    let dir = project();
    set(&dir, "GITHUB_TOKEN", "ghp");
    in_project(&dir)
        .args(["get", "CLOUDFLARE_API_TOKEN"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn get_without_vault_reports_missing_vault() {
    let dir = project();
    in_project(&dir)
        .args(["get", "GITHUB_TOKEN"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No vault found"))
        .stderr(predicate::str::contains("wpstack init"));
}

#[test]
fn wrong_pin_fails_and_keeps_vault() {
    let dir = project();
    set(&dir, "GITHUB_TOKEN", "ghp");
    let before = std::fs::read(dir.path().join(".wpstack/secrets.vault")).unwrap();

    wpstack()
        .current_dir(dir.path())
        .env("WPSTACK_PIN", "9999")
        .args(["set", "GITHUB_TOKEN", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong PIN"));

    let after = std::fs::read(dir.path().join(".wpstack/secrets.vault")).unwrap();
    assert_eq!(before, after);

    in_project(&dir)
        .args(["get", "GITHUB_TOKEN"])
        .assert()
        .success()
        .stdout("ghp\n");
}

#[test]
fn list_shows_names_not_values() {
    let dir = project();
    set(&dir, "GITHUB_TOKEN", "super-secret-value");
    set(&dir, "CUSTOM_NAME", "another-secret");

    in_project(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GITHUB_TOKEN"))
        .stdout(predicate::str::contains("CUSTOM_NAME"))
        .stdout(predicate::str::contains("super-secret-value").not())
        .stdout(predicate::str::contains("another-secret").not());
}

#[test]
fn delete_force_removes_secret() {
    let dir = project();
    set(&dir, "A", "1");
    set(&dir, "B", "2");

    in_project(&dir)
        .args(["delete", "A", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Deleted"));

    in_project(&dir).args(["get", "A"]).assert().failure();
    in_project(&dir)
        .args(["get", "B"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn delete_missing_secret_fails() {
    let dir = project();
    set(&dir, "A", "1");
    in_project(&dir)
        .args(["delete", "NOPE", "-f"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn export_env_format() {
    let dir = project();
    set(&dir, "B", "world");
    set(&dir, "A", "hello there");

    in_project(&dir)
        .arg("export")
        .assert()
        .success()
        .stdout("A=\"hello there\"\nB=world\n");
}

#[test]
fn export_json_format() {
    let dir = project();
    set(&dir, "GITHUB_TOKEN", "ghp_1");
    set(&dir, "CLOUDFLARE_ACCOUNT_ID", "acct");

    let output = in_project(&dir)
        .args(["export", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["GITHUB_TOKEN"], "ghp_1");
    assert_eq!(parsed["CLOUDFLARE_ACCOUNT_ID"], "acct");
}

#[test]
fn export_unknown_format_fails() {
    let dir = project();
    set(&dir, "A", "1");
    in_project(&dir)
        .args(["export", "-f", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown export format"));
}

// ---------------------------------------------------------------------------
// change-pin / status / completions
// ---------------------------------------------------------------------------

#[test]
fn change_pin_switches_pins() {
    let dir = project();
    set(&dir, "GITHUB_TOKEN", "ghp");

    in_project(&dir)
        .env("WPSTACK_NEW_PIN", "5678")
        .arg("change-pin")
        .assert()
        .success()
        .stderr(predicate::str::contains("PIN changed"));

    in_project(&dir)
        .args(["get", "GITHUB_TOKEN"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong PIN"));

    wpstack()
        .current_dir(dir.path())
        .env("WPSTACK_PIN", "5678")
        .args(["get", "GITHUB_TOKEN"])
        .assert()
        .success()
        .stdout("ghp\n");
}

#[test]
fn status_without_vault_suggests_init() {
    let dir = project();
    in_project(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("secrets.vault"))
        .stderr(predicate::str::contains("wpstack init"));
}

#[test]
fn status_reports_missing_required_credentials() {
    let dir = project();
    set(&dir, "GITHUB_TOKEN", "ghp");

    in_project(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Credentials: 1"))
        .stdout(predicate::str::contains("CLOUDFLARE_API_TOKEN"))
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn status_all_required_present() {
    let dir = project();
    set(&dir, "CLOUDFLARE_API_TOKEN", "cf");
    set(&dir, "CLOUDFLARE_ACCOUNT_ID", "acct");
    set(&dir, "GITHUB_TOKEN", "ghp");

    in_project(&dir)
        .arg("status")
        .assert()
        .success()
        .stderr(predicate::str::contains("All required"));
}

#[test]
fn completions_bash_prints_script() {
    wpstack()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wpstack"));
}

#[test]
fn completions_unknown_shell_fails() {
    wpstack()
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn bad_config_file_fails() {
    let dir = TempDir::new().unwrap();
    dir.child(".wpstack.toml")
        .write_str("max_pin_attempts = \"three\"\n")
        .unwrap();

    wpstack()
        .current_dir(dir.path())
        .env("WPSTACK_PIN", PIN)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file error"));
}
