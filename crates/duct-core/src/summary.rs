//! The final structured output: [`ExecutionSummary`] and the info document
//! that wraps it (spec §3 ExecutionSummary, §6 File 4).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DUCT_VERSION, SCHEMA_VERSION};

/// Host facts collected by the system-info probe (component H).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub cpu_total: u64,
    pub memory_total: u64,
    pub hostname: Option<String>,
    pub uid: u32,
    pub user: Option<String>,
}

/// One GPU as reported by the GPU-query tool, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuInfo {
    pub index: String,
    pub name: String,
    pub bus_id: String,
    pub driver_version: String,
    pub memory_total: String,
    pub compute_mode: String,
}

/// Produced once at the end of a run (spec §3 ExecutionSummary).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub exit_code: Option<i32>,
    pub command: String,
    pub logs_prefix: String,
    pub wall_clock_time: f64,
    pub peak_rss: Option<u64>,
    pub average_rss: Option<f64>,
    pub peak_vsz: Option<u64>,
    pub average_vsz: Option<f64>,
    pub peak_pmem: Option<f64>,
    pub average_pmem: Option<f64>,
    pub peak_pcpu: Option<f64>,
    pub average_pcpu: Option<f64>,
    pub num_samples: u64,
    pub num_reports: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub working_directory: String,
}

impl ExecutionSummary {
    /// The one-line plain-text summary the original always printed to
    /// stderr after a run. Deliberately bare: no color, no humanized sizes.
    pub fn format_line(&self) -> String {
        format!(
            "exit={} command={:?} logs={} wall_clock={:.3}s \
             peak_rss={} avg_rss={} peak_vsz={} avg_vsz={} \
             peak_pmem={} avg_pmem={} peak_pcpu={} avg_pcpu={}",
            self.exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string()),
            self.command,
            self.logs_prefix,
            self.wall_clock_time,
            fmt_opt_int(self.peak_rss),
            fmt_opt(self.average_rss),
            fmt_opt_int(self.peak_vsz),
            fmt_opt(self.average_vsz),
            fmt_opt(self.peak_pmem),
            fmt_opt(self.average_pmem),
            fmt_opt(self.peak_pcpu),
            fmt_opt(self.average_pcpu),
        )
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "none".to_string(),
    }
}

fn fmt_opt_int(value: Option<u64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

/// The info document (spec §6 File 4), written once at end-of-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoDocument {
    pub command: String,
    pub system: Option<SystemInfo>,
    pub env: BTreeMap<String, String>,
    pub gpu: Option<Vec<GpuInfo>>,
    pub duct_version: String,
    pub schema_version: String,
    pub execution_summary: ExecutionSummary,
    pub output_paths: OutputPathsDoc,
    pub working_directory: String,
    pub message: String,
}

/// `output_paths` object inside the info document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPathsDoc {
    pub stdout: String,
    pub stderr: String,
    pub usage: String,
    pub info: String,
    pub prefix: String,
}

impl InfoDocument {
    pub fn new(
        command: String,
        system: Option<SystemInfo>,
        env: BTreeMap<String, String>,
        gpu: Option<Vec<GpuInfo>>,
        execution_summary: ExecutionSummary,
        output_paths: OutputPathsDoc,
        working_directory: String,
        message: String,
    ) -> Self {
        Self {
            command,
            system,
            env,
            gpu,
            duct_version: DUCT_VERSION.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            execution_summary,
            output_paths,
            working_directory,
            message,
        }
    }
}
