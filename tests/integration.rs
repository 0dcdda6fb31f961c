use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn tlk_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tlk");
    path
}

const DIARY: &str = "2026-02-19 18:40 Jonas Petrauskas Vilnius paid 12.50 EUR for salad + coffee
2026-02-19 20:10 Ieva Kazlauskaitė Kaunas paid 7 EUR bus ticket
Bad line without structure
2026-02-20 09:05 Jonas Petrauskas Vilnius paid 120 EUR rent February
";

const LOGS: &str = "2026-02-19 10:15:03 INFO AuthService User login success code=OK
2026-02-19 10:16:11 WARN PaymentService Slow response code=SLOW_API
2026-02-19 10:17:45 ERROR OrderService Failed to create order code=DB_ERR
2026-02-19 10:18:02 DEBUG AuthService token=... code=TRACE
";

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(files_dir.join("diary.txt"), DIARY).unwrap();
    fs::write(files_dir.join("app.log"), LOGS).unwrap();
    fs::write(files_dir.join("mystery.bin"), [0u8, 1, 2, 3, 255]).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/tlk.sqlite"

[server]
bind = "127.0.0.1:7332"

[ingest]
preview_chars = 200
"#,
        root.display()
    );

    let config_path = config_dir.join("tlk.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_tlk(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = tlk_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run tlk binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Pulls the blob id out of an `ingest` command's summary output.
fn extract_id(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("id: "))
        .unwrap_or_else(|| panic!("no id in output: {stdout}"))
        .to_string()
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_tlk(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_tlk(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_tlk(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_ingest_diary_classifies_as_events() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let diary = tmp.path().join("files/diary.txt");
    let (stdout, stderr, success) =
        run_tlk(&config_path, &["ingest", diary.to_str().unwrap()]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("kind: TEXT_EVENTS"));
    assert!(stdout.contains("records: 4"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_ingest_logs_classifies_as_logs() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let log = tmp.path().join("files/app.log");
    let (stdout, _, success) = run_tlk(&config_path, &["ingest", log.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("kind: TEXT_LOGS"));
    assert!(stdout.contains("records: 4"));
}

#[test]
fn test_logs_hint_forces_log_schema_on_prose() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let prose = tmp.path().join("files/prose.txt");
    fs::write(&prose, "no severity tokens or dates in sight\n").unwrap();
    let (stdout, _, success) = run_tlk(
        &config_path,
        &["ingest", "--kind", "logs", prose.to_str().unwrap()],
    );
    assert!(success);
    assert!(stdout.contains("kind: TEXT_LOGS"));
    assert!(stdout.contains("records: 1"));
}

#[test]
fn test_get_shows_extracted_fields() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let diary = tmp.path().join("files/diary.txt");
    let (stdout, _, _) = run_tlk(&config_path, &["ingest", diary.to_str().unwrap()]);
    let id = extract_id(&stdout);

    let (stdout, stderr, success) = run_tlk(&config_path, &["get", &id]);
    assert!(success, "get failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Records (4)"));
    assert!(stdout.contains("Jonas Petrauskas"));
    assert!(stdout.contains("Vilnius"));
    assert!(stdout.contains("category=Food"));
    assert!(stdout.contains("parse_ok=false")); // the noise line survives
}

#[test]
fn test_get_unknown_id_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let (_, stderr, success) = run_tlk(&config_path, &["get", "no-such-id"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_show_lists_recent_rows() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let log = tmp.path().join("files/app.log");
    run_tlk(&config_path, &["ingest", log.to_str().unwrap()]);

    let (stdout, _, success) = run_tlk(&config_path, &["show", "text_logs"]);
    assert!(success);
    assert!(stdout.contains("TEXT_LOGS (4 rows)"));
    assert!(stdout.contains("OrderService"));
}

#[test]
fn test_delete_removes_records_then_404s() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let diary = tmp.path().join("files/diary.txt");
    let (stdout, _, _) = run_tlk(&config_path, &["ingest", diary.to_str().unwrap()]);
    let id = extract_id(&stdout);

    let (stdout, _, success) = run_tlk(&config_path, &["delete", "text_events", &id]);
    assert!(success);
    assert!(stdout.contains("deleted 4 records"));

    let (_, stderr, success) = run_tlk(&config_path, &["delete", "text_events", &id]);
    assert!(!success);
    assert!(stderr.contains("no records"));
}

#[test]
fn test_ingest_file_text_goes_through_classifier() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    // .log extension detects as text; the classifier picks the schema
    let log = tmp.path().join("files/app.log");
    let (stdout, _, success) =
        run_tlk(&config_path, &["ingest-file", log.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("kind: TEXT_LOGS"));
    assert!(stdout.contains("records: 4"));
}

#[test]
fn test_ingest_file_unknown_kind_is_stored_raw() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let bin = tmp.path().join("files/mystery.bin");
    let (stdout, _, success) =
        run_tlk(&config_path, &["ingest-file", bin.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("kind: UNKNOWN"));
    assert!(stdout.contains("records: 0"));
}

#[test]
fn test_ingest_empty_text_is_a_usage_error() {
    let (tmp, config_path) = setup_test_env();
    run_tlk(&config_path, &["init"]);

    let empty = tmp.path().join("files/empty.txt");
    fs::write(&empty, "   \n \t \n").unwrap();
    let (_, stderr, success) = run_tlk(&config_path, &["ingest", empty.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("must not be empty"));
}
