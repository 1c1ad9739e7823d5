//! Child spawning (component I's process half): run the command with its
//! stdout/stderr aimed at the already-prepared capture files, isolated in
//! its own process session unless the caller opts out.

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};

use duct_core::config::SessionMode;
use duct_core::error::{DuctError, Result};

/// Spawn `command` with `args`, directing stdout/stderr to `stdout_sink`/
/// `stderr_sink` (a capture file, or inherited/null depending on what the
/// caller already decided). In [`SessionMode::NewSession`] the child becomes
/// the leader of a new process session via `setsid(2)`, so its session id is
/// its own pid and every descendant it forks shares that session id — which
/// is exactly what the sampler enumerates by.
pub fn spawn(
    command: &str,
    args: &[String],
    stdout_sink: Stdio,
    stderr_sink: Stdio,
    session_mode: SessionMode,
) -> Result<Child> {
    let mut cmd = Command::new(command);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(stdout_sink)
        .stderr(stderr_sink)
        .kill_on_drop(true);

    if session_mode == SessionMode::NewSession {
        // SAFETY: setsid() is async-signal-safe and runs before exec in the
        // forked child, before any other thread exists in that process.
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    cmd.spawn().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DuctError::CommandNotFound(command.to_string())
        } else {
            DuctError::Spawn(source)
        }
    })
}

/// Opens `path` for writing, for the "capture but don't tee" sink case.
pub fn open_capture_file(path: &Path) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| DuctError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// The session id of a just-spawned child: in [`SessionMode::NewSession`]
/// this is the child's own pid; in [`SessionMode::CurrentSession`] it is
/// duct's own session id, since the child inherits it.
pub fn session_id_of(child_pid: u32, session_mode: SessionMode) -> i32 {
    match session_mode {
        SessionMode::NewSession => child_pid as i32,
        SessionMode::CurrentSession => unsafe { libc::getsid(0) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawning_a_missing_command_reports_command_not_found() {
        let result = spawn(
            "this-binary-does-not-exist-xyz",
            &[],
            Stdio::null(),
            Stdio::null(),
            SessionMode::NewSession,
        );
        assert!(matches!(result, Err(DuctError::CommandNotFound(_))));
    }

    #[tokio::test]
    async fn spawning_true_succeeds_and_reports_its_own_session() {
        let child = spawn(
            "true",
            &[],
            Stdio::null(),
            Stdio::null(),
            SessionMode::NewSession,
        )
        .unwrap();
        let pid = child.id().unwrap();
        assert_eq!(session_id_of(pid, SessionMode::NewSession), pid as i32);
    }
}
