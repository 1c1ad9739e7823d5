//! Linux backend: a single `ps -s <sid>` call enumerates exactly the
//! session's processes, so there is no race to tolerate.

use std::process::Command;

use duct_core::types::Sample;

use crate::parse::parse_ps_line;
use crate::sampler::Sampler;

pub struct LinuxSampler;

impl Sampler for LinuxSampler {
    fn sample(&self, session_id: i32) -> anyhow::Result<Option<Sample>> {
        let output = Command::new("ps")
            .args([
                "-w",
                "-s",
                &session_id.to_string(),
                "-o",
                "pid,pcpu,pmem,rss,vsz,etime,stat,cmd",
            ])
            .output()?;

        if !output.status.success() {
            // `ps` exits non-zero when the session has no processes left.
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let timestamp = chrono::Local::now().to_rfc3339();

        let mut stats = std::collections::BTreeMap::new();
        for line in stdout.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(stat) = parse_ps_line(line, &timestamp) {
                stats.insert(stat.pid, stat);
            } else {
                tracing::debug!(line, "skipping unparsable ps line");
            }
        }

        if stats.is_empty() {
            return Ok(None);
        }
        Ok(Some(Sample::from_pids(stats)))
    }
}
