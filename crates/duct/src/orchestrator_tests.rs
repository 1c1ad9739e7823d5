use super::*;
use duct_core::config::{Outputs, RecordTypes, SessionMode};
use std::time::Duration;

fn base_config(prefix: String) -> Config {
    Config {
        command: "true".to_string(),
        command_args: vec![],
        output_prefix: prefix,
        sample_interval: Duration::from_millis(20),
        report_interval: Duration::from_millis(20),
        fail_time: 0.0,
        capture_outputs: Outputs::None,
        outputs: Outputs::None,
        record_types: RecordTypes::SystemSummary,
        clobber: false,
        message: String::new(),
        session_mode: SessionMode::NewSession,
    }
}

#[tokio::test]
async fn successful_run_writes_info_document_and_returns_zero() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("run_").to_string_lossy().to_string();
    let config = base_config(prefix);

    let exit_code = run(config).await.unwrap();
    assert_eq!(exit_code, 0);

    let info_path = dir.path().join("run_info.json");
    let contents = std::fs::read_to_string(&info_path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(doc["execution_summary"]["exit_code"], 0);
}

#[tokio::test]
async fn missing_command_returns_127_and_removes_log_files() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("run_").to_string_lossy().to_string();
    let mut config = base_config(prefix);
    config.command = "this-binary-does-not-exist-xyz".to_string();
    config.record_types = RecordTypes::All;
    config.capture_outputs = Outputs::All;

    let exit_code = run(config).await.unwrap();
    assert_eq!(exit_code, 127);
    assert!(!dir.path().join("run_info.json").exists());
}
