//! The configuration surface the core consumes (spec §6). The CLI/env-file
//! layering that produces a [`Config`] is out of scope of this crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DuctError, Result};

/// Which streams get captured to files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outputs {
    #[default]
    All,
    None,
    Stdout,
    Stderr,
}

impl Outputs {
    pub fn has_stdout(self) -> bool {
        matches!(self, Outputs::All | Outputs::Stdout)
    }

    pub fn has_stderr(self) -> bool {
        matches!(self, Outputs::All | Outputs::Stderr)
    }
}

/// Whether to emit processes-samples, system-summary, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordTypes {
    #[default]
    All,
    SystemSummary,
    ProcessesSamples,
}

impl RecordTypes {
    pub fn has_system_summary(self) -> bool {
        matches!(self, RecordTypes::All | RecordTypes::SystemSummary)
    }

    pub fn has_processes_samples(self) -> bool {
        matches!(self, RecordTypes::All | RecordTypes::ProcessesSamples)
    }
}

/// Whether the child is spawned in a new process session or the wrapper's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    #[default]
    NewSession,
    CurrentSession,
}

/// Engine configuration (spec §6 "Configuration surface consumed by the core").
#[derive(Debug, Clone)]
pub struct Config {
    pub command: String,
    pub command_args: Vec<String>,
    pub output_prefix: String,
    pub sample_interval: Duration,
    pub report_interval: Duration,
    /// Negative means "trim all failures"; represented as `f64` to preserve
    /// that sentinel without a separate enum.
    pub fail_time: f64,
    pub capture_outputs: Outputs,
    pub outputs: Outputs,
    pub record_types: RecordTypes,
    pub clobber: bool,
    pub message: String,
    pub session_mode: SessionMode,
}

impl Config {
    /// Validate the invariants the core requires before executing anything.
    pub fn validate(&self) -> Result<()> {
        if self.report_interval < self.sample_interval {
            return Err(DuctError::IntervalOrder {
                sample_interval: self.sample_interval.as_secs_f64(),
                report_interval: self.report_interval.as_secs_f64(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            command: "true".into(),
            command_args: vec![],
            output_prefix: ".duct/logs/{datetime}-{pid}_".into(),
            sample_interval: Duration::from_secs(1),
            report_interval: Duration::from_secs(1),
            fail_time: 0.0,
            capture_outputs: Outputs::All,
            outputs: Outputs::All,
            record_types: RecordTypes::All,
            clobber: false,
            message: String::new(),
            session_mode: SessionMode::NewSession,
        }
    }

    #[test]
    fn report_interval_must_be_ge_sample_interval() {
        let mut cfg = base_config();
        cfg.sample_interval = Duration::from_secs(2);
        cfg.report_interval = Duration::from_secs(1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn equal_intervals_are_valid() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn outputs_matrix() {
        assert!(Outputs::All.has_stdout());
        assert!(Outputs::All.has_stderr());
        assert!(Outputs::Stdout.has_stdout());
        assert!(!Outputs::Stdout.has_stderr());
        assert!(!Outputs::None.has_stdout());
    }

    #[test]
    fn record_types_matrix() {
        assert!(RecordTypes::All.has_system_summary());
        assert!(RecordTypes::All.has_processes_samples());
        assert!(RecordTypes::SystemSummary.has_system_summary());
        assert!(!RecordTypes::SystemSummary.has_processes_samples());
    }
}
