use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn venti(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("venti").unwrap();
    cmd.env("VENTI_DB_PATH", db)
        .env_remove("VENTI_TOKEN")
        .env_remove("VENTI_LLM_API_KEY")
        .env_remove("VENTI_FUNCTIONS_URL")
        .env("RUST_LOG", "warn");
    cmd
}

fn signup(db: &Path, id: &str, email: &str) -> String {
    let output = venti(db)
        .args(["signup", "--id", id, "--email", email])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    body["token"].as_str().unwrap().to_owned()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("venti").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Breakup-recovery companion"));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = Command::cargo_bin("venti").unwrap();
    cmd.arg("serve").arg("--help").assert().success().stdout(predicate::str::contains("port"));
}

#[test]
fn test_unknown_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    venti(&dir.path().join("venti.db"))
        .args(["bundle", "--token", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid access token"));
}

#[test]
fn test_bundle_creates_profile_from_email() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("venti.db");
    let token = signup(&db, "u1", "river@example.com");

    venti(&db)
        .args(["bundle", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"river\""))
        .stdout(predicate::str::contains("\"role\": \"user\""));
}

#[test]
fn test_mood_and_task_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("venti.db");
    let token = signup(&db, "u1", "sam@example.com");

    venti(&db)
        .args(["mood", "7", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mood for today logged"));

    venti(&db)
        .args(["task", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task complete! One step forward."))
        .stdout(predicate::str::contains("Day 2 of 30"));

    venti(&db)
        .args(["task", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("already done"));

    venti(&db)
        .args(["bundle", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mood\": 7"))
        .stdout(predicate::str::contains("\"programDay\": 2"));
}

#[test]
fn test_out_of_range_mood_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("venti.db");
    let token = signup(&db, "u1", "sam@example.com");

    venti(&db).args(["mood", "11", "--token", &token]).assert().failure();
}

#[test]
fn test_chat_without_companion_keeps_user_message() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("venti.db");
    let token = signup(&db, "u1", "sam@example.com");

    venti(&db)
        .args(["chat", "hello there", "--token", &token])
        .assert()
        .success()
        .stderr(predicate::str::contains("Sorry, I couldn't respond right now."));

    venti(&db)
        .args(["bundle", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello there"));
}

#[test]
fn test_user_listing_needs_admin_role() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("venti.db");
    let token = signup(&db, "boss", "boss@example.com");
    let other = signup(&db, "u2", "u2@example.com");
    venti(&db).args(["bundle", "--token", &other]).assert().success();

    venti(&db)
        .args(["users", "--token", &token])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authorized"));

    venti(&db).args(["set-role", "boss", "superadmin"]).assert().success();

    venti(&db)
        .args(["users", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("u2@example.com"));
}

#[test]
fn test_reset_removes_data() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("venti.db");
    let token = signup(&db, "u1", "sam@example.com");

    venti(&db).args(["journal", "first entry", "--token", &token]).assert().success();
    venti(&db)
        .args(["reset", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your data has been reset."));

    venti(&db)
        .args(["bundle", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("first entry").not());
}
