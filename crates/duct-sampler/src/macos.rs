//! macOS backend: `ps -s <sid>` is Linux-only, so this enumerates every
//! process then filters by `getsid(2)`. Between the enumeration and the
//! filter a process can exit; a lookup failure is treated the same as "not
//! in this session" rather than an error.

use std::collections::BTreeMap;
use std::process::Command;

use duct_core::types::Sample;

use crate::parse::parse_ps_line;
use crate::sampler::Sampler;

pub struct MacSampler;

impl Sampler for MacSampler {
    fn sample(&self, session_id: i32) -> anyhow::Result<Option<Sample>> {
        let output = Command::new("ps")
            .args(["-ax", "-o", "pid,pcpu,pmem,rss,vsz,etime,stat,args"])
            .output()?;

        if !output.status.success() {
            anyhow::bail!("ps exited with status {}", output.status);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let timestamp = chrono::Local::now().to_rfc3339();

        let mut stats = BTreeMap::new();
        for line in stdout.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let Some(stat) = parse_ps_line(line, &timestamp) else {
                tracing::debug!(line, "skipping unparsable ps line");
                continue;
            };
            match getsid(stat.pid) {
                Some(sid) if sid == session_id => {
                    stats.insert(stat.pid, stat);
                }
                _ => {}
            }
        }

        if stats.is_empty() {
            tracing::debug!(session_id, "no processes found for session");
            return Ok(None);
        }
        Ok(Some(Sample::from_pids(stats)))
    }
}

/// `None` means the pid no longer existed by the time we asked — not an error.
fn getsid(pid: u32) -> Option<i32> {
    let sid = unsafe { libc::getsid(pid as libc::pid_t) };
    if sid < 0 {
        None
    } else {
        Some(sid)
    }
}
