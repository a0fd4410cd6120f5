//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rollbook() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("rollbook").unwrap()
}

/// A command rooted in `dir` with its own data directory and no ambient config.
fn rollbook_in(dir: &TempDir) -> Command {
    let mut cmd = rollbook();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("ROLLBOOK_DATA_DIR")
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

fn add_student(dir: &TempDir, student_id: &str, name: &str, course: &str, gpa: &str) {
    rollbook_in(dir)
        .args(["add", "--student-id", student_id, "--name", name])
        .args(["--email", &format!("{}@uni.edu", student_id.to_lowercase())])
        .args(["--phone", "555-0100", "--course", course, "--year", "2"])
        .args(["--gpa", gpa, "--enrolled", "2024-09-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Added {student_id}")));
}

fn list_json(dir: &TempDir, extra: &[&str]) -> Vec<serde_json::Value> {
    let output = rollbook_in(dir)
        .args(["list", "--format", "json"])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn help_output() {
    rollbook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local student record keeper"));
}

#[test]
fn version_output() {
    rollbook()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rollbook"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    rollbook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created rollbook.toml"));

    assert!(dir.path().join("rollbook.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    rollbook().current_dir(dir.path()).arg("init").assert().success();

    rollbook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn empty_list() {
    let dir = TempDir::new().unwrap();
    rollbook_in(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No records found."));
}

#[test]
fn add_then_list() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada Lovelace", "Physics", "9.5");

    let records = list_json(&dir, &[]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["studentId"], "S001");
    assert_eq!(records[0]["name"], "Ada Lovelace");
    assert_eq!(records[0]["gpa"], 9.5);
    assert!(records[0]["id"].as_str().is_some_and(|id| !id.is_empty()));

    rollbook_in(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace"))
        .stdout(predicate::str::contains("1 of 1 record(s)"));
}

#[test]
fn duplicate_student_id_rejected() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "9.0");

    rollbook_in(&dir)
        .args(["add", "--student-id", "S001", "--name", "Other"])
        .args(["--email", "other@uni.edu", "--phone", "1"])
        .args(["--course", "Physics", "--year", "1", "--gpa", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("student ID already exists: S001"));

    assert_eq!(list_json(&dir, &[]).len(), 1);
}

#[test]
fn invalid_fields_are_reported_together() {
    let dir = TempDir::new().unwrap();
    rollbook_in(&dir)
        .args(["add", "--student-id", "S1", "--name", "Bad"])
        .args(["--email", "not-an-email", "--phone", "1"])
        .args(["--course", "Astrology", "--year", "5", "--gpa", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email:"))
        .stderr(predicate::str::contains("course: must be one of"))
        .stderr(predicate::str::contains("year: must be between 1 and 4"));

    assert!(list_json(&dir, &[]).is_empty());
}

#[test]
fn update_by_student_id() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "7.0");

    rollbook_in(&dir)
        .args(["update", "S001", "--gpa", "8.25", "--attendance", "92"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated S001"));

    let records = list_json(&dir, &[]);
    assert_eq!(records[0]["gpa"], 8.25);
    assert_eq!(records[0]["attendance"], 92.0);
    assert!(records[0]["updatedAt"].is_string());
}

#[test]
fn update_without_fields_fails() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "7.0");

    rollbook_in(&dir)
        .args(["update", "S001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to update"));
}

#[test]
fn unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    rollbook_in(&dir)
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no record with ID nope"));
}

#[test]
fn delete_and_bulk_remove() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "7.0");
    add_student(&dir, "S002", "Grace", "Physics", "8.0");
    add_student(&dir, "S003", "Alan", "Mathematics", "6.0");

    rollbook_in(&dir)
        .args(["delete", "S001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted S001"));

    rollbook_in(&dir)
        .args(["remove", "S002", "S999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 of 2 record(s)"));

    let records = list_json(&dir, &[]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["studentId"], "S003");
}

#[test]
fn search_and_filter() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada Lovelace", "Physics", "7.0");
    add_student(&dir, "S002", "Grace Hopper", "Mathematics", "8.0");
    add_student(&dir, "S003", "Adam Smith", "Mathematics", "6.0");

    let found = list_json(&dir, &["--search", "ada"]);
    assert_eq!(found.len(), 2);

    let found = list_json(&dir, &["--search", "ada", "--course", "Mathematics"]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Adam Smith");
}

#[test]
fn sort_persists_order() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "7.0");
    add_student(&dir, "S002", "Grace", "Physics", "9.0");
    add_student(&dir, "S003", "Alan", "Physics", "6.0");

    rollbook_in(&dir)
        .args(["sort", "gpa", "--desc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("by gpa (descending)"));

    let ids: Vec<String> = list_json(&dir, &[])
        .iter()
        .map(|r| r["studentId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["S002", "S001", "S003"]);
}

#[test]
fn stats_json() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "8.0");
    add_student(&dir, "S002", "Grace", "Mathematics", "9.0");

    let output = rollbook_in(&dir)
        .args(["stats", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["summary"]["count"], 2);
    assert_eq!(stats["summary"]["average_gpa"], 8.5);
    assert_eq!(stats["by_course"]["Physics"], 1);
}

#[test]
fn stats_text_on_empty_collection() {
    let dir = TempDir::new().unwrap();
    rollbook_in(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Students:     0"))
        .stdout(predicate::str::contains("Average GPA:  0.00"));
}

#[test]
fn export_then_import_into_new_data_dir() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "8.0");
    add_student(&dir, "S002", "Grace", "Mathematics", "9.0");

    let out = dir.path().join("exports");
    rollbook_in(&dir)
        .args(["export", "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 record(s)"));

    let exported = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.extension().is_some_and(|ext| ext == "json"))
        .unwrap();
    let file_name = exported.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("students_"));

    let other = TempDir::new().unwrap();
    rollbook_in(&other)
        .arg("import")
        .arg(&exported)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 record(s)"));

    assert_eq!(list_json(&other, &[]), list_json(&dir, &[]));
}

#[test]
fn export_csv_has_header() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "8.0");

    let out = dir.path().join("csv");
    rollbook_in(&dir)
        .args(["export", "--format", "csv", "--output"])
        .arg(&out)
        .assert()
        .success();

    let path = std::fs::read_dir(&out).unwrap().next().unwrap().unwrap().path();
    let content = std::fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().contains("\"Student ID\""));
    assert!(lines.next().unwrap().contains("\"S001\""));
}

#[test]
fn rejected_import_leaves_collection_untouched() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "8.0");

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"not": "an array"}"#).unwrap();

    rollbook_in(&dir)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid import payload"));

    assert_eq!(list_json(&dir, &[]).len(), 1);
}

#[test]
fn theme_toggle_persists() {
    let dir = TempDir::new().unwrap();

    rollbook_in(&dir)
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("light"));

    rollbook_in(&dir)
        .args(["theme", "--toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme set to dark"));

    rollbook_in(&dir)
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("dark"));
}

#[test]
fn report_writes_themed_html() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "8.0");
    rollbook_in(&dir).args(["theme", "dark"]).assert().success();

    let path = dir.path().join("out/dashboard.html");
    rollbook_in(&dir)
        .arg("report")
        .arg("--output")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("HTML dashboard"));

    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("data-theme=\"dark\""));
    assert!(html.contains("Physics"));
}

#[test]
fn photo_is_attached_and_removed() {
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("face.png");
    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png.extend_from_slice(&[0u8; 32]);
    std::fs::write(&photo, &png).unwrap();

    rollbook_in(&dir)
        .args(["add", "--student-id", "S001", "--name", "Ada"])
        .args(["--email", "ada@uni.edu", "--phone", "1"])
        .args(["--course", "Physics", "--year", "1", "--gpa", "9"])
        .arg("--photo")
        .arg(&photo)
        .assert()
        .success();

    rollbook_in(&dir)
        .args(["show", "S001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("image/png"));

    rollbook_in(&dir)
        .args(["update", "S001", "--remove-photo"])
        .assert()
        .success();

    let records = list_json(&dir, &[]);
    assert!(records[0].get("photo").is_none());
}

#[test]
fn unsupported_photo_rejected() {
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("notes.txt");
    std::fs::write(&photo, "hello").unwrap();

    rollbook_in(&dir)
        .args(["add", "--student-id", "S001", "--name", "Ada"])
        .args(["--email", "ada@uni.edu", "--phone", "1"])
        .args(["--course", "Physics", "--year", "1", "--gpa", "9"])
        .arg("--photo")
        .arg(&photo)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported image format"));

    assert!(list_json(&dir, &[]).is_empty());
}

#[test]
fn quota_exceeded_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tight.toml");
    std::fs::write(&config, "storage_quota_bytes = 64\n").unwrap();

    rollbook_in(&dir)
        .arg("--config")
        .arg(&config)
        .args(["add", "--student-id", "S001", "--name", "Ada"])
        .args(["--email", "ada@uni.edu", "--phone", "1"])
        .args(["--course", "Physics", "--year", "1", "--gpa", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("storage quota exceeded"));
}

#[test]
fn search_matches_phone_numbers() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "7.0");
    rollbook_in(&dir)
        .args(["add", "--student-id", "S002", "--name", "Grace"])
        .args(["--email", "grace@uni.edu", "--phone", "+44 20 7946 0958"])
        .args(["--course", "Physics", "--year", "1", "--gpa", "8"])
        .assert()
        .success();

    let found = list_json(&dir, &["--search", "7946"]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["studentId"], "S002");

    rollbook()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("phone number"));
}

#[test]
fn update_can_clear_optional_fields() {
    let dir = TempDir::new().unwrap();
    rollbook_in(&dir)
        .args(["add", "--student-id", "S001", "--name", "Ada"])
        .args(["--email", "ada@uni.edu", "--phone", "1"])
        .args(["--course", "Physics", "--year", "1", "--gpa", "9"])
        .args(["--gender", "female", "--attendance", "88", "--dob", "2004-03-02"])
        .assert()
        .success();

    let records = list_json(&dir, &[]);
    assert_eq!(records[0]["gender"], "female");

    rollbook_in(&dir)
        .args(["update", "S001", "--clear-gender", "--clear-attendance", "--clear-dob"])
        .assert()
        .success();

    let records = list_json(&dir, &[]);
    assert!(records[0].get("gender").is_none());
    assert!(records[0].get("attendance").is_none());
    assert!(records[0].get("dateOfBirth").is_none());
    assert_eq!(records[0]["name"], "Ada");
}

#[test]
fn set_and_clear_together_is_rejected() {
    let dir = TempDir::new().unwrap();
    add_student(&dir, "S001", "Ada", "Physics", "7.0");
    rollbook_in(&dir)
        .args(["update", "S001", "--attendance", "50", "--clear-attendance"])
        .assert()
        .failure();
}
