use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// The CLI with an isolated home directory and no `TOUCHPATH_*` overrides.
fn touchpath(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("touchpath").unwrap();
    cmd.env("HOME", home)
        .env_remove("TOUCHPATH_ENDPOINT")
        .env_remove("TOUCHPATH_DELAY")
        .env_remove("TOUCHPATH_STEPS")
        .env_remove("TOUCHPATH_LOG_FILE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_exits_zero() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("swipe"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn test_plan_json_single_finger() {
    let home = tempfile::tempdir().unwrap();
    let assert = touchpath(home.path())
        .args(["--format", "json", "plan", "100,100", "100,300"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let plan: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(plan["timing"]["steps"], 12);
    assert_eq!(plan["timing"]["step_delay_ms"], 83);

    let events = plan["events"].as_array().unwrap();
    assert_eq!(events.len(), 13);
    assert_eq!(events[0]["kind"], "touchStart");
    assert_eq!(events[0]["delay_ms"], 0);
    assert_eq!(events[12]["kind"], "touchEnd");
    assert_eq!(events[12]["fingers"][0]["y"], 300.0);
}

#[test]
fn test_plan_text_marks_checkpoints() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args(["plan", "--steps", "2", "0,0;50,0", "0,100;50,100", "-10,100;40,100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 events, 2 steps per transition"))
        .stdout(predicate::str::contains("touchstart  (0, 0) (50, 0)  [checkpoint]"))
        .stdout(predicate::str::contains("touchend    (-10, 100) (40, 100)"));
}

#[test]
fn test_plan_uses_configured_delay() {
    let home = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(home.path().join(".touchpath")).unwrap();
    std::fs::write(
        home.path().join(".touchpath").join("config.json"),
        r#"{"delay_ms": 1800}"#,
    )
    .unwrap();

    let assert = touchpath(home.path())
        .args(["--format", "json", "plan", "0,0", "0,100"])
        .assert()
        .success();
    let plan: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(plan["timing"]["step_delay_ms"], 150);

    // Flags win over the file.
    let assert = touchpath(home.path())
        .args(["--format", "json", "plan", "--delay", "1200", "0,0", "0,100"])
        .assert()
        .success();
    let plan: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(plan["timing"]["step_delay_ms"], 100);
}

#[test]
fn test_plan_writes_svg() {
    let home = tempfile::tempdir().unwrap();
    let svg = home.path().join("trail.svg");
    touchpath(home.path())
        .args(["--quiet", "plan", "--svg", svg.to_str().unwrap(), "10,10", "10,110"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&svg).unwrap();
    assert!(content.starts_with("<svg"));
    assert!(content.contains(r#"class="start-0""#));
    assert!(content.contains(r#"class="end-0""#));
}

#[test]
fn test_mismatched_fingers_exit_code_3() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args(["plan", "0,0;10,0", "0,100"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("checkpoint 1 has 1 fingers, expected 2"));
}

#[test]
fn test_single_checkpoint_exit_code_3() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args(["plan", "0,0"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("at least 2 checkpoints"));
}

#[test]
fn test_bad_checkpoint_syntax_exit_code_3() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args(["plan", "0,0", "100"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("expected 'x,y'"));
}

#[test]
fn test_huge_step_count_exit_code_3() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args(["plan", "--steps", "4000000000", "0,0", "0,10"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("more than the limit of 100000"));

    // Rejected before any connection attempt.
    touchpath(home.path())
        .args([
            "--endpoint",
            "http://127.0.0.1:1",
            "swipe",
            "-S",
            "canvas",
            "--steps",
            "4000000000",
            "0,0",
            "0,10",
        ])
        .assert()
        .code(3);
}

#[test]
fn test_swipe_unreachable_endpoint_exit_code_2() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args([
            "--endpoint",
            "http://127.0.0.1:1",
            "swipe",
            "--selector",
            "canvas",
            "100,100",
            "100,300",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Connection error"));
}

#[test]
fn test_swipe_validates_before_connecting() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args([
            "--endpoint",
            "http://127.0.0.1:1",
            "swipe",
            "-S",
            "canvas",
            "100,100",
        ])
        .assert()
        .code(3);
}

#[test]
fn test_config_show_defaults() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("endpoint: http://localhost:9222"))
        .stdout(predicate::str::contains("steps: auto"));
}

#[test]
fn test_config_set_endpoint_persists() {
    let home = tempfile::tempdir().unwrap();
    touchpath(home.path())
        .args(["config", "set-endpoint", "http://10.0.0.5:9222"])
        .assert()
        .success()
        .stdout(predicate::str::contains("endpoint set to http://10.0.0.5:9222"));

    let assert = touchpath(home.path())
        .args(["--format", "json", "config", "show"])
        .assert()
        .success();
    let config: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(config["endpoint"], "http://10.0.0.5:9222");
    assert_eq!(config["delay_ms"], 1000);
}

#[test]
fn test_log_file_is_created() {
    let home = tempfile::tempdir().unwrap();
    let log = home.path().join("logs").join("touchpath.log");
    touchpath(home.path())
        .args(["--log-file", log.to_str().unwrap(), "plan", "0,0", "0,10"])
        .assert()
        .success();
    assert!(log.exists());
}
