use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn cdmigrate_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cdmigrate"))
}

fn sample_export() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/Test1.json")
}

fn run(args: &[&str]) -> Output {
    Command::new(cdmigrate_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("spawn cdmigrate")
}

#[test]
fn dry_run_writes_report_for_sample_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report_path = dir.path().join("report.json");
    let input = sample_export();

    let out = run(&[
        "--file",
        input.to_str().unwrap(),
        "--dry-run",
        "--report",
        report_path.to_str().unwrap(),
        "--log-level",
        "warn",
    ]);
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("dry run"), "stdout: {stdout}");
    assert!(stdout.contains("premises"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["claims"], 9);
    assert_eq!(report["arguments"], 6);
    assert_eq!(report["inferences"], 6);
    assert_eq!(report["base_claims"], 6);
    assert_eq!(report["premises"], 2);
    assert_eq!(report["argument_updates"], 4);
    let kinds: Vec<&str> = report["notices"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["kind"].as_str())
        .collect();
    assert_eq!(
        kinds.iter().filter(|k| **k == "claim_cites_claim").count(),
        2
    );
}

#[test]
fn missing_child_aborts_with_non_zero_exit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("broken.json");
    fs::write(
        &input,
        r#"[{"_key": "A", "type": 40, "children": {"_key": "children", "ghost": {"_key": "ghost", "polarity": 10}}}]"#,
    )
    .unwrap();

    let out = run(&["-f", input.to_str().unwrap(), "--dry-run"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("ghost"), "stderr: {stderr}");
}

#[test]
fn unreadable_input_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("absent.json");
    let out = run(&["-f", input.to_str().unwrap(), "--dry-run"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("failed to load"));
}
