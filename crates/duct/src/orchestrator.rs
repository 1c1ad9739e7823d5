//! Component I: the full run lifecycle — plan paths, spawn the child inside
//! its session, bridge signals, monitor concurrently with system-info
//! collection, then write the info document and apply the trim policy.

use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use duct_core::config::{Config, SessionMode};
use duct_core::error::{DuctError, Result};
use duct_core::summary::{ExecutionSummary, InfoDocument, OutputPathsDoc};
use duct_io::{LogPaths, Tee};
use duct_monitor::{monitor_loop, system_info};
use duct_process::signal_bridge::{self, SignalTarget};
use duct_process::{session_id_of, spawn};
use duct_sampler::default_sampler;

/// Runs `config` end to end and returns the exit code to propagate to the
/// shell (matching the child's own code, 127 for "command not found", or
/// `128 + signal` for a signal-killed child).
pub async fn run(config: Config) -> Result<i32> {
    config.validate()?;

    let pid = std::process::id();
    let log_paths = LogPaths::plan(&config.output_prefix, pid, chrono::Local::now());
    log_paths.prepare(config.clobber, config.capture_outputs)?;

    let working_directory = std::env::current_dir()
        .map_err(|source| DuctError::Io {
            path: ".".into(),
            source,
        })?
        .display()
        .to_string();
    let full_command = full_command_string(&config);

    let stdout_stdio = stdio_for(
        config.capture_outputs.has_stdout(),
        config.outputs.has_stdout(),
        &log_paths.stdout,
    )?;
    let stderr_stdio = stdio_for(
        config.capture_outputs.has_stderr(),
        config.outputs.has_stderr(),
        &log_paths.stderr,
    )?;

    let start = Instant::now();
    let start_time = unix_timestamp();

    let mut child = match spawn::spawn(
        &config.command,
        &config.command_args,
        stdout_stdio,
        stderr_stdio,
        config.session_mode,
    ) {
        Ok(child) => child,
        Err(DuctError::CommandNotFound(command)) => {
            log_paths.remove(true)?;
            tracing::error!(%command, "command not found");
            return Ok(127);
        }
        Err(err) => return Err(err),
    };

    tracing::info!(command = %full_command, prefix = %log_paths.prefix.display(), "executing");

    let child_pid = child.id().expect("child just spawned, pid must exist");
    let signal_target = match config.session_mode {
        SessionMode::NewSession => SignalTarget::ProcessGroup(child_pid),
        SessionMode::CurrentSession => SignalTarget::Pid(child_pid),
    };
    let signal_handle = signal_bridge::spawn(signal_target);
    let session_id = session_id_of(child_pid, config.session_mode);

    let tee_stdout = if config.capture_outputs.has_stdout() && config.outputs.has_stdout() {
        Some(Tee::start(&log_paths.stdout, tokio::io::stdout()).await?)
    } else {
        None
    };
    let tee_stderr = if config.capture_outputs.has_stderr() && config.outputs.has_stderr() {
        Some(Tee::start(&log_paths.stderr, tokio::io::stderr()).await?)
    } else {
        None
    };

    let monitor_handle = config.record_types.has_processes_samples().then(|| {
        monitor_loop::spawn(
            Arc::from(default_sampler()),
            session_id,
            config.sample_interval,
            config.report_interval,
            Some(log_paths.usage.clone()),
            config.record_types,
        )
    });

    let (system_info_opt, env, gpu) = if config.record_types.has_system_summary() {
        let sys = system_info::collect_system_info();
        let env = system_info::collect_environment();
        let gpu = system_info::collect_gpu_info().await;
        (Some(sys), env, gpu)
    } else {
        (None, Default::default(), None)
    };

    let status = child.wait().await.map_err(DuctError::Spawn)?;
    let end_time = unix_timestamp();
    let wall_clock_time = start.elapsed().as_secs_f64();

    signal_handle.abort();

    let outcome = match monitor_handle {
        Some(handle) => Some(handle.stop().await?),
        None => None,
    };
    if let Some(tee) = tee_stdout {
        tee.stop().await?;
    }
    if let Some(tee) = tee_stderr {
        tee.stop().await?;
    }

    let exit_code = normalize_exit_code(status);
    let (full_run, num_reports) = match outcome {
        Some(outcome) => (outcome.full_run, outcome.num_reports),
        None => Default::default(),
    };

    // A zero-sample run (spec §8 scenario 1) leaves `full_run` at its
    // `Sample::default()`; its totals are meaningless zeros, not real peaks,
    // so they must surface as `null` rather than a fabricated 0.
    let has_samples = full_run.averages.num_samples > 0;
    let execution_summary = ExecutionSummary {
        exit_code,
        command: full_command.clone(),
        logs_prefix: log_paths.prefix.display().to_string(),
        wall_clock_time,
        peak_rss: has_samples.then_some(full_run.total_rss),
        average_rss: full_run.averages.rss,
        peak_vsz: has_samples.then_some(full_run.total_vsz),
        average_vsz: full_run.averages.vsz,
        peak_pmem: has_samples.then_some(full_run.total_pmem),
        average_pmem: full_run.averages.pmem,
        peak_pcpu: has_samples.then_some(full_run.total_pcpu),
        average_pcpu: full_run.averages.pcpu,
        num_samples: full_run.averages.num_samples,
        num_reports,
        start_time,
        end_time,
        working_directory: working_directory.clone(),
    };

    if config.record_types.has_system_summary() {
        let doc = InfoDocument::new(
            full_command.clone(),
            system_info_opt,
            env,
            gpu,
            execution_summary.clone(),
            OutputPathsDoc {
                stdout: log_paths.stdout.display().to_string(),
                stderr: log_paths.stderr.display().to_string(),
                usage: log_paths.usage.display().to_string(),
                info: log_paths.info.display().to_string(),
                prefix: log_paths.prefix.display().to_string(),
            },
            working_directory,
            config.message.clone(),
        );
        let json = serde_json::to_string_pretty(&doc).map_err(|source| DuctError::Serialize {
            what: "info document",
            source,
        })?;
        std::fs::write(&log_paths.info, json).map_err(|source| DuctError::Io {
            path: log_paths.info.display().to_string(),
            source,
        })?;
    }

    eprintln!("{}", execution_summary.format_line());

    let failed = exit_code != Some(0);
    if failed && (wall_clock_time < config.fail_time || config.fail_time < 0.0) {
        tracing::info!(
            fail_time = config.fail_time,
            "removing log files since the command failed"
        );
        log_paths.remove(false)?;
    } else {
        tracing::info!(
            command = %full_command,
            exit_code,
            peak_rss = execution_summary.peak_rss,
            wall_clock_time,
            "execution summary"
        );
    }

    Ok(exit_code.unwrap_or(1))
}

fn full_command_string(config: &Config) -> String {
    std::iter::once(config.command.clone())
        .chain(config.command_args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn stdio_for(capture: bool, pass_through: bool, path: &std::path::Path) -> Result<Stdio> {
    if capture {
        Ok(Stdio::from(duct_process::open_capture_file(path)?))
    } else if pass_through {
        Ok(Stdio::inherit())
    } else {
        Ok(Stdio::null())
    }
}

/// Killed-by-signal exit statuses are normalized to `128 + signal`, per
/// POSIX shell convention, so callers can't mistake them for a 0-127 exit code.
fn normalize_exit_code(status: std::process::ExitStatus) -> Option<i32> {
    match status.code() {
        Some(code) => Some(code),
        None => status.signal().map(|sig| 128 + sig),
    }
}

fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod orchestrator_tests;
