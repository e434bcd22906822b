use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tasklist-{nanos}-{file_name}"))
}

fn write_store(path: &PathBuf, tasks: serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(&tasks).unwrap()).unwrap();
}

#[test]
fn toggle_command_completes_task() {
    let exe = env!("CARGO_BIN_EXE_tasklist");
    let store_path = temp_path("cli-toggle.json");

    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": 1,
                "text": "demo",
                "completed": false,
                "createdAt": "2025-12-20T00:00:00Z"
            }
        ]),
    );

    let output = Command::new(exe)
        .args(["toggle", "1"])
        .env("TASKLIST_STORE_PATH", &store_path)
        .output()
        .expect("failed to run toggle command");

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("is now completed"));
    assert_eq!(stored[0]["completed"], true);
    assert_eq!(stored[0]["text"], "demo");
}

#[test]
fn toggle_command_twice_restores_active() {
    let exe = env!("CARGO_BIN_EXE_tasklist");
    let store_path = temp_path("cli-toggle-twice.json");

    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": 7,
                "text": "demo",
                "completed": false,
                "createdAt": "2025-12-20T00:00:00Z"
            }
        ]),
    );

    for _ in 0..2 {
        let output = Command::new(exe)
            .args(["toggle", "7"])
            .env("TASKLIST_STORE_PATH", &store_path)
            .output()
            .expect("failed to run toggle command");
        assert!(output.status.success());
    }

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored[0]["completed"], false);
}

#[test]
fn toggle_command_rejects_unknown_id() {
    let exe = env!("CARGO_BIN_EXE_tasklist");
    let store_path = temp_path("cli-toggle-unknown.json");

    write_store(&store_path, serde_json::json!([]));

    let output = Command::new(exe)
        .args(["toggle", "999"])
        .env("TASKLIST_STORE_PATH", &store_path)
        .output()
        .expect("failed to run toggle command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task not found"));
}

#[test]
fn toggle_command_rejects_non_numeric_id() {
    let exe = env!("CARGO_BIN_EXE_tasklist");
    let store_path = temp_path("cli-toggle-bad-id.json");

    let output = Command::new(exe)
        .args(["toggle", "abc"])
        .env("TASKLIST_STORE_PATH", &store_path)
        .output()
        .expect("failed to run toggle command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - id must be a number"));
}
