use std::process::Command;

fn log_contents(dir: &std::path::Path) -> String {
    std::fs::read_dir(dir)
        .expect("log dir should exist")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("usesorter"))
        .map(|entry| std::fs::read_to_string(entry.path()).expect("log file readable"))
        .collect()
}

#[test]
fn demo_prints_scenario_and_writes_core_log() {
    let log_dir = tempfile::tempdir().expect("temp dir");

    let output = Command::new(env!("CARGO_BIN_EXE_usesorter"))
        .env("USESORTER_LOG_DIR", log_dir.path())
        .output()
        .expect("demo binary should run");

    assert!(output.status.success(), "demo failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("usesorter_core version="));
    assert_eq!(&lines[1..], ["New Name", "New Name", "Bart Simpson"]);

    let logs = log_contents(log_dir.path());
    assert!(logs.contains("event=core_init"), "unexpected log: {logs}");
    assert!(logs.contains("alloc_policy=abort"), "unexpected log: {logs}");
    if cfg!(debug_assertions) {
        assert!(logs.contains("event=atom_destroy"), "unexpected log: {logs}");
    }
}

#[test]
fn demo_rejects_relative_log_dir() {
    let output = Command::new(env!("CARGO_BIN_EXE_usesorter"))
        .env("USESORTER_LOG_DIR", "relative/logs")
        .output()
        .expect("demo binary should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absolute"), "unexpected stderr: {stderr}");
    assert!(output.stdout.is_empty());
}
