//! The monitor loop (component F): sample on a fixed cadence, cut and
//! persist a report each time the report interval elapses, anchored to the
//! loop's own start time rather than to when samples happen to land.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use duct_core::config::RecordTypes;
use duct_core::error::{DuctError, Result};
use duct_core::types::Sample;
use duct_sampler::Sampler;

use crate::aggregator::Aggregator;
use crate::report_writer::ReportWriter;

/// What the monitor accumulated over the life of the run, handed back once
/// it stops so the orchestrator can build the execution summary.
pub struct MonitorOutcome {
    pub full_run: Sample,
    pub num_reports: u32,
}

pub struct MonitorHandle {
    stop: Arc<Notify>,
    handle: JoinHandle<Result<MonitorOutcome>>,
}

impl MonitorHandle {
    /// Signal the loop to stop sampling, flush whatever partial window it
    /// was still accumulating, and wait for it to finish.
    pub async fn stop(self) -> Result<MonitorOutcome> {
        self.stop.notify_one();
        self.handle.await.map_err(|join_err| DuctError::Io {
            path: "<monitor task>".into(),
            source: std::io::Error::other(join_err),
        })?
    }
}

/// Spawn the monitor loop as a background task. `usage_path` is `None` when
/// the config's `record_types` doesn't call for a usage log at all, in which
/// case the loop still tracks `full_run`/`num_reports` but writes nothing.
pub fn spawn(
    sampler: Arc<dyn Sampler>,
    session_id: i32,
    sample_interval: Duration,
    report_interval: Duration,
    usage_path: Option<PathBuf>,
    record_types: RecordTypes,
) -> MonitorHandle {
    let stop = Arc::new(Notify::new());
    let task_stop = stop.clone();

    let handle = tokio::spawn(async move {
        let mut writer = match &usage_path {
            Some(path) if record_types.has_processes_samples() => {
                Some(ReportWriter::create(path)?)
            }
            _ => None,
        };

        let mut aggregator = Aggregator::new();
        let start = Instant::now();

        loop {
            let sid = session_id;
            let sampler = sampler.clone();
            let sample = tokio::task::spawn_blocking(move || sampler.sample(sid))
                .await
                .map_err(|join_err| DuctError::Io {
                    path: "<sampler task>".into(),
                    source: std::io::Error::other(join_err),
                })?
                .map_err(|err| DuctError::Io {
                    path: "<ps>".into(),
                    source: std::io::Error::other(err),
                })?;

            if let Some(sample) = sample {
                aggregator.absorb(&sample);
                let boundary = report_interval.mul_f64(aggregator.num_reports as f64);
                if start.elapsed() >= boundary {
                    if let Some(window) = aggregator.cut_window() {
                        if let Some(writer) = writer.as_mut() {
                            writer.write_sample(&window)?;
                        }
                    }
                }
            }

            tokio::select! {
                _ = task_stop.notified() => break,
                _ = tokio::time::sleep(sample_interval) => {}
            }
        }

        if let Some(window) = aggregator.cut_window() {
            if let Some(writer) = writer.as_mut() {
                writer.write_sample(&window)?;
            }
        }

        Ok(MonitorOutcome {
            full_run: aggregator.full_run,
            num_reports: aggregator.num_reports,
        })
    });

    MonitorHandle { stop, handle }
}
