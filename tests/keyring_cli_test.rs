use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

const GMX: &str = "gmx.net|#|alice@gmx.net";

/// Run keyward with given args.
fn keyward() -> Command {
    cargo_bin_cmd!("keyward")
}

fn init_project() -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().unwrap();
    keyward()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

// ─── Init ────────────────────────────────────────────────────────

#[test]
fn init_creates_config_store_and_local_keyring() {
    let dir = init_project();

    dir.child(".keyward/config.toml").assert(predicate::path::exists());
    dir.child(".keyward/certs").assert(predicate::path::is_dir());
    dir.child(".keyward/store.json")
        .assert(predicate::str::contains("localhost|#|keyward"));
    dir.child(".keyward/audit.log")
        .assert(predicate::str::contains("\"action\":\"init\""));
}

#[test]
fn init_twice_fails() {
    let dir = init_project();

    keyward()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn commands_require_init() {
    let dir = assert_fs::TempDir::new().unwrap();

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("keyward init"));
}

#[test]
fn custom_config_dir_is_used() {
    let dir = assert_fs::TempDir::new().unwrap();

    keyward()
        .current_dir(dir.path())
        .args(["--config", "alt", "init"])
        .assert()
        .success();
    dir.child("alt/store.json").assert(predicate::path::exists());

    keyward()
        .current_dir(dir.path())
        .args(["--config", "alt", "keyring", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("localhost|#|keyward"));
}

// ─── Keyrings ────────────────────────────────────────────────────

#[test]
fn create_list_show_delete_keyring() {
    let dir = init_project();

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "create", GMX])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created keyring"));

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(GMX))
        .stdout(predicate::str::contains("Keyrings (2)"));

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "show", GMX])
        .assert()
        .success()
        .stdout(predicate::str::contains("gmx.net"))
        .stdout(predicate::str::contains("0 entries"));

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "delete", GMX])
        .assert()
        .success();

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "show", GMX])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn create_existing_keyring_fails() {
    let dir = init_project();

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "create", "localhost|#|keyward"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn local_keyring_cannot_be_deleted() {
    let dir = init_project();

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "delete", "localhost|#|keyward"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be deleted"));
}

#[test]
fn keyring_mutations_are_audited_with_state_hash() {
    let dir = init_project();

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "create", GMX])
        .assert()
        .success();
    keyward()
        .current_dir(dir.path())
        .args(["keyring", "delete", GMX])
        .assert()
        .success();

    let log = std::fs::read_to_string(dir.path().join(".keyward/audit.log")).unwrap();
    assert!(log.contains("\"action\":\"keyring_create\""));
    assert!(log.contains("\"action\":\"keyring_delete\""));
    assert!(log.contains("\"state_hash\":\""));

    keyward()
        .current_dir(dir.path())
        .args(["log", "--keyring", GMX])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries"));
}

// ─── Logo ────────────────────────────────────────────────────────

#[test]
fn logo_revision_must_increase() {
    let dir = init_project();
    keyward()
        .current_dir(dir.path())
        .args(["keyring", "create", GMX])
        .assert()
        .success();

    keyward()
        .current_dir(dir.path())
        .args(["logo", GMX, "--revision", "2", "--data-url", "data:image/png;base64,AAAA"])
        .assert()
        .success();

    keyward()
        .current_dir(dir.path())
        .args(["logo", GMX, "--revision", "2", "--data-url", "data:image/png;base64,BBBB"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not newer"));

    keyward()
        .current_dir(dir.path())
        .args(["keyring", "show", GMX])
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn logo_requires_data_url() {
    let dir = init_project();

    keyward()
        .current_dir(dir.path())
        .args(["logo", "localhost|#|keyward", "--revision", "1", "--data-url", "logo.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("data URL"));
}

// ─── Changelog / trust ───────────────────────────────────────────

#[test]
fn changelog_lists_stored_entries() {
    let dir = init_project();
    let store = dir.child(".keyward/store.json");
    let fpr = "ab".repeat(20);
    store
        .write_str(&format!(
            r#"{{
  "keyward.keyring.attributes": {{ "localhost|#|keyward": {{}} }},
  "keyward.keyring.localhost|#|keyward.changeLog": {{
    "{fpr}": {{ "type": "DELETE", "time": 1000 }}
  }}
}}"#
        ))
        .unwrap();

    keyward()
        .current_dir(dir.path())
        .args(["changelog", "localhost|#|keyward"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DELETE"))
        .stdout(predicate::str::contains(fpr.to_uppercase()));
}

#[test]
fn trust_lists_configured_certificates() {
    let dir = init_project();
    let config = std::fs::read_to_string(dir.path().join(".keyward/config.toml")).unwrap();
    dir.child(".keyward/config.toml")
        .write_str(&format!(
            "{config}\n[[trust.certificates]]\ndomains = [\"gmx.net\", \"web.de\"]\nfile = \"certs/gmx.asc\"\n"
        ))
        .unwrap();

    keyward()
        .current_dir(dir.path())
        .arg("trust")
        .assert()
        .success()
        .stdout(predicate::str::contains("gmx.net, web.de"))
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn log_rejects_bad_since_date() {
    let dir = init_project();

    keyward()
        .current_dir(dir.path())
        .args(["log", "--since", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date format"));
}
