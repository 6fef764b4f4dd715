use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn medtracker_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_medtracker"))
}

fn run(dir: &Path, args: &[&str]) -> Output {
    medtracker_cmd()
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

fn init_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let output = run(tmp.path(), &["init"]);
    assert!(output.status.success());
    tmp
}

fn add_aspirin(dir: &Path) {
    let output = run(
        dir,
        &["add", "Aspirin", "--dosage=100mg", "--time=08:00", "--frequency=daily"],
    );
    assert!(output.status.success());
}

fn list_json(dir: &Path) -> serde_json::Value {
    let output = run(dir, &["list", "--json"]);
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_init_creates_tracker_directory() {
    let tmp = init_project();

    assert!(tmp.path().join(".medtracker").is_dir());
    assert!(tmp.path().join(".medtracker/config.yaml").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = init_project();

    let output = run(tmp.path(), &["init"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Already initialized"));
}

#[test]
fn test_add_without_init_fails() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["add", "Aspirin", "-d", "100mg", "-t", "08:00"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not in a medtracker project"));
}

#[test]
fn test_empty_list() {
    let tmp = init_project();

    let output = run(tmp.path(), &["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No medications added yet"));

    assert_eq!(list_json(tmp.path()), serde_json::json!([]));
}

#[test]
fn test_full_medication_workflow() {
    let tmp = init_project();

    let output = run(
        tmp.path(),
        &["add", "Aspirin", "--dosage=100mg", "--time=08:00", "--frequency=daily"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added medication 1"));
    assert!(stdout.contains("Aspirin 100mg at 8:00 AM"));

    let meds = list_json(tmp.path());
    assert_eq!(meds.as_array().unwrap().len(), 1);
    assert_eq!(meds[0]["name"], "Aspirin");
    assert_eq!(meds[0]["time"], "08:00");
    assert!(meds[0]["takenAt"].is_null());

    let output = run(tmp.path(), &["progress", "--json"]);
    let progress: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(progress["ratio"], 0.0);

    // Take it
    let output = run(tmp.path(), &["toggle", "1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Aspirin marked as taken"));

    let output = run(tmp.path(), &["progress", "--json"]);
    let progress: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(progress["ratio"], 1.0);
    assert_eq!(progress["percent"], 100);

    let output = run(tmp.path(), &["list"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Taken Today]"));
    assert!(stdout.contains("Last taken: Today at"));
    assert!(stdout.contains("Today: 1/1 taken (100%)"));

    // Untake it
    let output = run(tmp.path(), &["toggle", "1", "--json"]);
    assert!(output.status.success());
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(record["takenAt"].is_null());

    let output = run(tmp.path(), &["progress"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Today: 0/1 taken (0%)"));
}

#[test]
fn test_add_with_missing_field_fails() {
    let tmp = init_project();

    let output = run(tmp.path(), &["add", "Aspirin", "--dosage=  ", "--time=08:00"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Validation failed"));
    assert!(stderr.contains("dosage"));

    assert_eq!(list_json(tmp.path()), serde_json::json!([]));
}

#[test]
fn test_add_with_bad_time_fails() {
    let tmp = init_project();

    let output = run(tmp.path(), &["add", "Aspirin", "--dosage=100mg", "--time=8am"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid time"));
}

#[test]
fn test_update_medication() {
    let tmp = init_project();
    add_aspirin(tmp.path());
    let before = list_json(tmp.path());

    let output = run(
        tmp.path(),
        &["update", "1", "--dosage=81mg", "--time=21:15"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Updated medication 1"));

    let output = run(tmp.path(), &["get", "1", "--json"]);
    assert!(output.status.success());
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["name"], "Aspirin");
    assert_eq!(record["dosage"], "81mg");
    assert_eq!(record["time"], "21:15");
    assert_eq!(record["id"], before[0]["id"]);
    assert_eq!(record["createdAt"], before[0]["createdAt"]);
}

#[test]
fn test_update_nonexistent_fails_and_leaves_list_unchanged() {
    let tmp = init_project();
    add_aspirin(tmp.path());
    let before = list_json(tmp.path());

    let output = run(tmp.path(), &["update", "nope", "--name=Ibuprofen"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Medication not found"));

    assert_eq!(list_json(tmp.path()), before);
}

#[test]
fn test_get_by_uuid_prefix() {
    let tmp = init_project();
    add_aspirin(tmp.path());
    let id = list_json(tmp.path())[0]["id"].as_str().unwrap().to_string();

    let output = run(tmp.path(), &["get", &id[..8]]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Aspirin"));
    assert!(stdout.contains("Pending"));
}

#[test]
fn test_delete_with_force() {
    let tmp = init_project();
    add_aspirin(tmp.path());

    let output = run(tmp.path(), &["delete", "1", "--force"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Deleted"));

    assert_eq!(list_json(tmp.path()), serde_json::json!([]));
}

#[test]
fn test_delete_without_force_non_interactive_fails() {
    let tmp = init_project();
    add_aspirin(tmp.path());

    let output = run(tmp.path(), &["delete", "1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--force"));

    assert_eq!(list_json(tmp.path()).as_array().unwrap().len(), 1);
}

#[test]
fn test_delete_nonexistent_fails() {
    let tmp = init_project();

    let output = run(tmp.path(), &["delete", "1", "--force"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Medication not found"));
}

#[test]
fn test_storage_file_holds_full_list() {
    let tmp = init_project();
    add_aspirin(tmp.path());
    add_aspirin(tmp.path());

    let text =
        fs::read_to_string(tmp.path().join(".medtracker/medtracker-medications.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(stored, list_json(tmp.path()));
    assert_eq!(stored.as_array().unwrap().len(), 2);
}

#[test]
fn test_imports_legacy_export() {
    let tmp = init_project();
    fs::write(
        tmp.path().join(".medtracker/medtracker-medications.json"),
        r#"[{"name":"Vitamin D","dosage":"1000 IU","time":"09:30","frequency":"daily","taken":true,"lastTaken":"2024-03-10T12:31:00.123Z","id":1710063060123,"createdAt":"2024-03-10T09:31:00.123Z"}]"#,
    )
    .unwrap();

    let meds = list_json(tmp.path());
    assert_eq!(meds[0]["name"], "Vitamin D");
    assert_eq!(meds[0]["id"], "00000000-0000-0000-0000-018e27b3849b");
    assert_eq!(meds[0]["takenAt"], "2024-03-10T12:31:00.123Z");
    assert_eq!(meds[0]["createdAt"], "2024-03-10T09:31:00.123Z");

    let output = run(tmp.path(), &["list"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Pending]"));
    assert!(stdout.contains("Last taken: 2024-03-10 at"));

    // The next write stores the id in its new form.
    let output = run(tmp.path(), &["update", "1", "--dosage=2000 IU"]);
    assert!(output.status.success());
    let text =
        fs::read_to_string(tmp.path().join(".medtracker/medtracker-medications.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(stored[0]["id"], "00000000-0000-0000-0000-018e27b3849b");
    assert_eq!(stored[0]["dosage"], "2000 IU");
}

#[test]
fn test_remind_with_nothing_due() {
    let tmp = init_project();

    let output = run(tmp.path(), &["remind", "--json"]);
    assert!(output.status.success());
    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(events, serde_json::json!([]));

    let output = run(tmp.path(), &["remind"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No reminders due"));
}

#[test]
fn test_remind_respects_disabled_notifications() {
    let tmp = init_project();
    fs::write(
        tmp.path().join(".medtracker/config.yaml"),
        "notifications: false\n",
    )
    .unwrap();

    let output = run(tmp.path(), &["remind"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Notifications are disabled"));
}

#[test]
fn test_custom_storage_key() {
    let tmp = init_project();
    fs::write(
        tmp.path().join(".medtracker/config.yaml"),
        "storage_key: family-meds\n",
    )
    .unwrap();
    add_aspirin(tmp.path());

    assert!(tmp.path().join(".medtracker/family-meds.json").exists());
    assert!(!tmp
        .path()
        .join(".medtracker/medtracker-medications.json")
        .exists());
}
