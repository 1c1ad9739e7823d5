//! Signal bridge (component G): forwards SIGINT received by the wrapper to
//! the child's process group, escalating if the child doesn't go away.
//!
//! | SIGINT # | action                                    |
//! |----------|-------------------------------------------|
//! | 1st, 2nd | forward SIGINT to the child                |
//! | 3rd      | forward SIGKILL (force)                    |
//! | 4th+     | exit the wrapper immediately, no cleanup   |

use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

/// Target of the forwarded signal: the child's pid when it leads its own
/// session (negated for `kill(2)` to mean "the whole process group"), or the
/// plain pid when it shares duct's own session.
#[derive(Debug, Clone, Copy)]
pub enum SignalTarget {
    ProcessGroup(u32),
    Pid(u32),
}

impl SignalTarget {
    fn kill_arg(self) -> libc::pid_t {
        match self {
            SignalTarget::ProcessGroup(pid) => -(pid as libc::pid_t),
            SignalTarget::Pid(pid) => pid as libc::pid_t,
        }
    }
}

/// Installs a SIGINT handler and forwards per the escalation ladder above.
/// Runs until the process exits (the 4th signal calls `std::process::exit`
/// directly) or the returned handle is dropped/aborted by the caller once
/// the child has already finished.
pub fn spawn(target: SignalTarget) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(%err, "failed to install SIGINT handler");
                return;
            }
        };

        let mut count = 0u32;
        loop {
            sigint.recv().await;
            count += 1;
            match count {
                1 => {
                    tracing::info!("received SIGINT, passing to command");
                    forward(target, libc::SIGINT);
                }
                2 => {
                    tracing::info!("received second SIGINT, again passing to command");
                    forward(target, libc::SIGINT);
                }
                3 => {
                    tracing::warn!("received third SIGINT, forcefully killing command process");
                    forward(target, libc::SIGKILL);
                }
                _ => {
                    tracing::error!("exiting duct, skipping cleanup");
                    std::process::exit(1);
                }
            }
        }
    })
}

fn forward(target: SignalTarget, signal: libc::c_int) {
    let rc = unsafe { libc::kill(target.kill_arg(), signal) };
    if rc != 0 {
        tracing::debug!(
            error = %std::io::Error::last_os_error(),
            "signal forward failed, target process likely already exited"
        );
    }
}
