use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tasklist-{nanos}-{file_name}"))
}

fn run_interactive(store_path: &PathBuf, input: &str) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_tasklist");

    let mut child = Command::new(exe)
        .env("TASKLIST_STORE_PATH", store_path)
        .env("TASKLIST_CONFIG_PATH", temp_path("no-config.json"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    child
        .wait_with_output()
        .expect("failed to read interactive output")
}

#[test]
fn interactive_help_shows_usage() {
    let store_path = temp_path("cli-interactive-help.json");
    let output = run_interactive(&store_path, "help\nexit\n");
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
}

#[test]
fn interactive_invalid_command_prints_error() {
    let store_path = temp_path("cli-interactive-bad.json");
    let output = run_interactive(&store_path, "nope\nexit\n");
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn interactive_add_then_list_shares_one_store() {
    let store_path = temp_path("cli-interactive-add-list.json");
    let output = run_interactive(
        &store_path,
        "add \"demo task\"\nlist\nexit\n",
    );
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: demo task"));
    assert!(stdout.contains("demo task"));
    assert!(stdout.contains("0 of 1 completed"));
}

#[test]
fn interactive_edit_session_commits_reply() {
    let store_path = temp_path("cli-interactive-edit.json");
    std::fs::write(
        &store_path,
        "[{\"id\": 1, \"text\": \"old text\", \"completed\": false, \"createdAt\": \"2025-12-20T00:00:00Z\"}]",
    )
    .unwrap();

    let output = run_interactive(&store_path, "edit 1\nnew text\nexit\n");
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Editing \"old text\""));
    assert!(stdout.contains("Updated task: new text"));
    assert_eq!(stored[0]["text"], "new text");
}

#[test]
fn interactive_edit_session_cancel_keeps_text() {
    let store_path = temp_path("cli-interactive-edit-cancel.json");
    std::fs::write(
        &store_path,
        "[{\"id\": 1, \"text\": \"old text\", \"completed\": false, \"createdAt\": \"2025-12-20T00:00:00Z\"}]",
    )
    .unwrap();

    let output = run_interactive(&store_path, "edit 1\ncancel\nexit\n");
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Kept task text: old text"));
    assert_eq!(stored[0]["text"], "old text");
}

#[test]
fn interactive_filter_sticks_for_the_session() {
    let store_path = temp_path("cli-interactive-filter.json");
    std::fs::write(
        &store_path,
        "[{\"id\": 1, \"text\": \"finished\", \"completed\": true, \"createdAt\": \"2025-12-20T00:00:00Z\"},\
          {\"id\": 2, \"text\": \"open\", \"completed\": false, \"createdAt\": \"2025-12-20T01:00:00Z\"}]",
    )
    .unwrap();

    // The second bare `list` reuses the filter set by the first one.
    let output = run_interactive(&store_path, "list --filter completed\nlist\nexit\n");
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("finished"));
    assert!(!stdout.contains("| open"));
}
