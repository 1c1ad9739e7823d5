//! Thin flag-to-[`Config`] mapping. Several flags fall back to a `DUCT_*`
//! environment variable before their hardcoded default, matching the
//! original's "env vars override hardcoded defaults, CLI overrides env vars"
//! precedence. `.env`-file search/layering itself is still out of scope.

use std::time::Duration;

use clap::Parser;

use duct_core::config::{Config, Outputs, RecordTypes, SessionMode};
use duct_core::constants::DEFAULT_OUTPUT_PREFIX;

/// Run a command while recording CPU, memory, and wall-time usage for it and
/// every process in its session.
#[derive(Debug, Parser)]
#[command(name = "duct", version, about)]
pub struct Cli {
    /// The command to execute.
    pub command: String,

    /// Arguments passed through to `command`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command_args: Vec<String>,

    /// Template for every output path; supports `{datetime}` and `{pid}`.
    #[arg(long, env = "DUCT_OUTPUT_PREFIX", default_value = DEFAULT_OUTPUT_PREFIX)]
    pub output_prefix: String,

    /// Seconds between process samples.
    #[arg(long, env = "DUCT_SAMPLE_INTERVAL", default_value_t = 1.0)]
    pub sample_interval: f64,

    /// Seconds between usage-log reports; must be >= sample-interval.
    #[arg(long, env = "DUCT_REPORT_INTERVAL", default_value_t = 60.0)]
    pub report_interval: f64,

    /// Discard logs if the command fails within this many seconds.
    /// Negative means "always discard logs on failure".
    #[arg(long, default_value_t = 0.0)]
    pub fail_time: f64,

    /// Which streams to capture to files.
    #[arg(long, value_enum, env = "DUCT_CAPTURE_OUTPUTS", default_value_t = OutputsArg::All)]
    pub capture_outputs: OutputsArg,

    /// Which streams to also pass through live.
    #[arg(long, value_enum, default_value_t = OutputsArg::All)]
    pub outputs: OutputsArg,

    /// Which record types to emit.
    #[arg(long, value_enum, default_value_t = RecordTypesArg::All)]
    pub record_types: RecordTypesArg,

    /// Overwrite pre-existing output files instead of erroring.
    #[arg(long)]
    pub clobber: bool,

    /// Free-form note carried into the info document.
    #[arg(long, env = "DUCT_MESSAGE", default_value = "")]
    pub message: String,

    /// Run the command in duct's own process session instead of a new one.
    #[arg(long)]
    pub same_session: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
pub enum OutputsArg {
    All,
    None,
    Stdout,
    Stderr,
}

impl From<OutputsArg> for Outputs {
    fn from(value: OutputsArg) -> Self {
        match value {
            OutputsArg::All => Outputs::All,
            OutputsArg::None => Outputs::None,
            OutputsArg::Stdout => Outputs::Stdout,
            OutputsArg::Stderr => Outputs::Stderr,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
pub enum RecordTypesArg {
    All,
    SystemSummary,
    ProcessesSamples,
}

impl From<RecordTypesArg> for RecordTypes {
    fn from(value: RecordTypesArg) -> Self {
        match value {
            RecordTypesArg::All => RecordTypes::All,
            RecordTypesArg::SystemSummary => RecordTypes::SystemSummary,
            RecordTypesArg::ProcessesSamples => RecordTypes::ProcessesSamples,
        }
    }
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            command: self.command,
            command_args: self.command_args,
            output_prefix: self.output_prefix,
            sample_interval: Duration::from_secs_f64(self.sample_interval),
            report_interval: Duration::from_secs_f64(self.report_interval),
            fail_time: self.fail_time,
            capture_outputs: self.capture_outputs.into(),
            outputs: self.outputs.into(),
            record_types: self.record_types.into(),
            clobber: self.clobber,
            message: self.message,
            session_mode: if self.same_session {
                SessionMode::CurrentSession
            } else {
                SessionMode::NewSession
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_overrides_env_which_overrides_default() {
        std::env::set_var("DUCT_OUTPUT_PREFIX", "from-env-{pid}_");

        let cli = Cli::parse_from(["duct", "echo", "hi"]);
        assert_eq!(cli.output_prefix, "from-env-{pid}_");

        let cli = Cli::parse_from(["duct", "--output-prefix", "from-flag_", "echo", "hi"]);
        assert_eq!(cli.output_prefix, "from-flag_");

        std::env::remove_var("DUCT_OUTPUT_PREFIX");
        let cli = Cli::parse_from(["duct", "echo", "hi"]);
        assert_eq!(cli.output_prefix, DEFAULT_OUTPUT_PREFIX);
    }
}
