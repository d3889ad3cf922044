//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the developer's home, .env and environment
fn sikuwat(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sikuwat").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("SIKUWAT_CONFIG")
        .env_remove("SIKUWAT_KNOWLEDGE_FILE")
        .env_remove("DATABASE_URL");
    cmd
}

// === Help ===

#[test]
fn test_serve_help() {
    let home = TempDir::new().unwrap();
    sikuwat(&home)
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skip running migrations"));
}

#[test]
fn test_migrate_without_database_url_fails() {
    let home = TempDir::new().unwrap();
    sikuwat(&home)
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

// === Ask ===

#[test]
fn test_ask_brief_answer() {
    let home = TempDir::new().unwrap();
    sikuwat(&home)
        .args(["ask", "--brief", "pupuk", "apa", "yang", "bagus?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pupuk organik"));
}

#[test]
fn test_ask_unknown_topic_lists_topics() {
    let home = TempDir::new().unwrap();
    sikuwat(&home)
        .args(["ask", "siapa", "presiden?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Pemupukan"));
}

// === Knowledge ===

#[test]
fn test_knowledge_list_builtin() {
    let home = TempDir::new().unwrap();
    sikuwat(&home)
        .args(["knowledge", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Harga pasar:"));
}

#[test]
fn test_knowledge_check_rejects_empty_file() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("kb.toml");
    std::fs::write(&file, "[fallback]\ngreeting = \"x\"\nbrief = \"x\"\ndetailed = \"x\"\n").unwrap();

    sikuwat(&home)
        .args(["knowledge", "check"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid knowledge base"));
}

// === Config ===

#[test]
fn test_config_init_then_show() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("sikuwat.toml");

    sikuwat(&home)
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    sikuwat(&home)
        .env("GOOGLE_API_KEY", "very-secret")
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.0-flash"))
        .stdout(predicate::str::contains("very-secret").not());
}

#[test]
fn test_config_init_refuses_overwrite() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("sikuwat.toml");
    std::fs::write(&path, "").unwrap();

    sikuwat(&home)
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    sikuwat(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sikuwat"));
}
