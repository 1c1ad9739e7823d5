//! System-info probe (component H): host facts, the `ENV_PREFIXES` subset of
//! the environment, and an optional GPU inventory.

use std::collections::BTreeMap;
use std::time::Duration;

use duct_core::constants::ENV_PREFIXES;
use duct_core::summary::{GpuInfo, SystemInfo};
use sysinfo::System;

/// `os.sysconf`-equivalent host facts, gathered once at startup.
pub fn collect_system_info() -> SystemInfo {
    let mut sys = System::new_all();
    sys.refresh_cpu_all();
    sys.refresh_memory();

    SystemInfo {
        cpu_total: sys.cpus().len() as u64,
        memory_total: sys.total_memory(),
        hostname: sysinfo::System::host_name(),
        uid: current_uid(),
        user: std::env::var("USER").ok(),
    }
}

#[cfg(unix)]
fn current_uid() -> u32 {
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
    0
}

/// The subset of the environment whose keys start with one of
/// [`ENV_PREFIXES`] (job-scheduler variables: PBS/SLURM/OSG).
pub fn collect_environment() -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| ENV_PREFIXES.iter().any(|prefix| key.starts_with(prefix)))
        .collect()
}

/// Queries `nvidia-smi` for a CSV GPU inventory, tolerating its absence or
/// failure (no GPU, driver not installed, sandboxed environment, etc). Bounds
/// the subprocess call so a hung driver cannot stall startup indefinitely.
pub async fn collect_gpu_info() -> Option<Vec<GpuInfo>> {
    if which::which("nvidia-smi").is_err() {
        return None;
    }

    let output = tokio::time::timeout(
        Duration::from_secs(2),
        tokio::process::Command::new("nvidia-smi")
            .args([
                "--query-gpu=index,name,pci.bus_id,driver_version,memory.total,compute_mode",
                "--format=csv",
            ])
            .output(),
    )
    .await
    .ok()?
    .ok()?;

    if !output.status.success() {
        tracing::warn!(status = ?output.status, "nvidia-smi exited non-zero");
        return None;
    }

    parse_nvidia_smi_csv(&String::from_utf8_lossy(&output.stdout))
}

fn parse_nvidia_smi_csv(csv: &str) -> Option<Vec<GpuInfo>> {
    let mut lines = csv.lines().filter(|l| !l.trim().is_empty());
    lines.next()?; // header

    let mut gpus = Vec::new();
    for line in lines {
        let cols: Vec<&str> = line.split(", ").collect();
        if cols.len() < 6 {
            tracing::warn!(line, "unexpected nvidia-smi CSV row");
            return None;
        }
        gpus.push(GpuInfo {
            index: cols[0].to_string(),
            name: cols[1].to_string(),
            bus_id: cols[2].to_string(),
            driver_version: cols[3].to_string(),
            memory_total: cols[4].to_string(),
            compute_mode: cols[5].to_string(),
        });
    }
    Some(gpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_collects_only_prefixed_keys() {
        std::env::set_var("SLURM_JOB_ID", "123");
        std::env::set_var("UNRELATED_VAR", "x");
        let env = collect_environment();
        assert_eq!(env.get("SLURM_JOB_ID"), Some(&"123".to_string()));
        assert!(!env.contains_key("UNRELATED_VAR"));
        std::env::remove_var("SLURM_JOB_ID");
        std::env::remove_var("UNRELATED_VAR");
    }

    #[test]
    fn parses_well_formed_nvidia_smi_csv() {
        let csv = "index, name, pci.bus_id, driver_version, memory.total, compute_mode\n\
                    0, Tesla T4, 00000000:00:1E.0, 535.104.05, 15360 MiB, Default\n";
        let gpus = parse_nvidia_smi_csv(csv).unwrap();
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].name, "Tesla T4");
        assert_eq!(gpus[0].memory_total, "15360 MiB");
    }

    #[test]
    fn rejects_malformed_csv_rows() {
        let csv = "header\nnot,enough,columns\n";
        assert!(parse_nvidia_smi_csv(csv).is_none());
    }
}
