use std::fs;
use std::path::PathBuf;
use std::process::Output;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("scene_tracker_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn scene_tracker(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_scene-tracker"))
        .args(args)
        .output()
        .expect("failed to run scene-tracker")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Minimal schema JSON keyed by field name.
fn write_schema(dir: &TempDir) -> PathBuf {
    let json = serde_json::json!({
        "Time": {"name": "Time", "type": "STRING", "isDynamic": true, "defaultValue": "00:00:00"},
        "Topics": {"name": "Topics", "type": "ARRAY", "isDynamic": true},
        "Characters": {
            "name": "Characters",
            "type": "FOR_EACH_OBJECT",
            "isDynamic": true,
            "nestedFields": {
                "Hair": {"name": "Hair", "type": "STRING", "isDynamic": true}
            }
        }
    });
    let path = dir.join("schema.json");
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).expect("failed to write schema");
    path
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn test_validate_accepts_good_schema() {
    let dir = TempDir::new("validate_ok");
    let schema = write_schema(&dir);

    let out = scene_tracker(&["validate", schema.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("OK"));
}

#[test]
fn test_validate_rejects_bad_schema() {
    let dir = TempDir::new("validate_bad");
    let json = serde_json::json!({
        "Characters": {"name": "Characters", "type": "FOR_EACH_OBJECT", "isDynamic": true}
    });
    let path = dir.join("bad.json");
    fs::write(&path, json.to_string()).unwrap();

    let out = scene_tracker(&["validate", path.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("requires nested fields"));
}

// ---------------------------------------------------------------------------
// reconcile / merge
// ---------------------------------------------------------------------------

#[test]
fn test_reconcile_yaml_record_against_schema_file() {
    let dir = TempDir::new("reconcile");
    let schema = write_schema(&dir);

    let record = dir.join("turn.yaml");
    fs::write(
        &record,
        "Time: \"21:14:05\"\nTopics:\n  - storm\nMood: calm\n",
    )
    .unwrap();

    let out = scene_tracker(&[
        "reconcile",
        "--schema",
        schema.to_str().unwrap(),
        "--input",
        record.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let tracker: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(tracker["Time"], "21:14:05");
    assert_eq!(tracker["Topics"][0], "storm");
    // Unclaimed key preserved.
    assert_eq!(tracker["_extraFields"]["Mood"], "calm");
    // Field order follows the schema.
    let keys: Vec<&String> = tracker.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["Time", "Topics", "Characters", "_extraFields"]);
}

#[test]
fn test_merge_updated_side_wins() {
    let dir = TempDir::new("merge");
    let schema = write_schema(&dir);

    let original = dir.join("original.json");
    fs::write(
        &original,
        serde_json::json!({"Time": "09:00:00", "Topics": ["fog"]}).to_string(),
    )
    .unwrap();
    let updated = dir.join("updated.json");
    fs::write(&updated, serde_json::json!({"Time": "09:05:00"}).to_string()).unwrap();

    let out = scene_tracker(&[
        "merge",
        "--schema",
        schema.to_str().unwrap(),
        "--original",
        original.to_str().unwrap(),
        "--updated",
        updated.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(out.status.success());

    let tracker: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(tracker["Time"], "09:05:00");
    assert_eq!(tracker["Topics"][0], "fog");
}

// ---------------------------------------------------------------------------
// render / prompt / synthesis
// ---------------------------------------------------------------------------

#[test]
fn test_render_with_template_file() {
    let dir = TempDir::new("render");
    let record = dir.join("turn.json");
    fs::write(
        &record,
        serde_json::json!({"Time": "09:00", "Topics": ["a", "b"]}).to_string(),
    )
    .unwrap();
    let template = dir.join("view.tpl");
    fs::write(&template, "At {{Time}}: {{#join \", \" Topics}}").unwrap();

    let out = scene_tracker(&[
        "render",
        "--template",
        template.to_str().unwrap(),
        "--input",
        record.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "At 09:00: a, b\n");
}

#[test]
fn test_render_reports_unmatched_block() {
    let dir = TempDir::new("render_broken");
    let record = dir.join("turn.json");
    fs::write(&record, serde_json::json!({"x": "1"}).to_string()).unwrap();
    let template = dir.join("broken.tpl");
    fs::write(&template, "{{#if x}}no end").unwrap();

    let out = scene_tracker(&[
        "render",
        "--template",
        template.to_str().unwrap(),
        "--input",
        record.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unmatched {{#if}}"));
}

#[test]
fn test_default_tracker_uses_bundled_schema() {
    let out = scene_tracker(&["default", "--format", "json"]);
    assert!(out.status.success());

    let tracker: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(tracker["Time"], "<Updated time if changed>");
    assert!(tracker["Characters"].is_object());
}

#[test]
fn test_prompt_flattens_bundled_schema() {
    let out = scene_tracker(&["prompt"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("- **Time:**"));
    assert!(text.contains("  - **Hair:**"));
}
