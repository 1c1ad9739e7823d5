pub mod config;
pub mod constants;
pub mod error;
pub mod summary;
pub mod types;

pub use config::{Config, Outputs, RecordTypes, SessionMode};
pub use error::{DuctError, Result};
pub use summary::{ExecutionSummary, GpuInfo, InfoDocument, OutputPathsDoc, SystemInfo};
pub use types::{ProcessStat, RunningAverages, Sample, StateCounter, UsageRecord, UsageTotals};
