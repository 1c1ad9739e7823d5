//! File-based tee (component B): forward a capture file's growing contents
//! to a live sink while the child writes to it, without going through a pipe
//! (a pipe risks deadlocking the child on a full OS buffer for large output).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use duct_core::error::{DuctError, Result};

/// How often the background task re-checks the capture file for new bytes.
const TAIL_CYCLE_TIME: Duration = Duration::from_millis(10);

/// Tails `path` into `sink` on a background task until [`Tee::stop`] is
/// called. One final read happens after the stop signal to drain whatever
/// was written between the last poll and the child exiting.
pub struct Tee {
    stop: Arc<Notify>,
    handle: JoinHandle<Result<()>>,
}

impl Tee {
    /// Opens the capture file for reading and spawns the tail task. The file
    /// is open by the time this returns, so callers can safely let the child
    /// start writing to it immediately afterward.
    pub async fn start(
        path: &Path,
        mut sink: impl AsyncWrite + Unpin + Send + 'static,
    ) -> Result<Self> {
        let mut infile = tokio::fs::File::open(path)
            .await
            .map_err(|source| DuctError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let stop = Arc::new(Notify::new());
        let task_stop = stop.clone();
        tracing::debug!(path = %path.display(), "tee started");

        let handle = tokio::spawn(async move {
            loop {
                catch_up(&mut infile, &mut sink).await?;
                tokio::select! {
                    _ = task_stop.notified() => break,
                    _ = tokio::time::sleep(TAIL_CYCLE_TIME) => {}
                }
            }
            tracing::debug!("tee stopping, draining final bytes");
            catch_up(&mut infile, &mut sink).await?;
            sink.flush().await.map_err(|source| DuctError::Io {
                path: "<tee sink>".into(),
                source,
            })
        });

        Ok(Self { stop, handle })
    }

    /// Signal the tail task to do one last catch-up read and exit, then wait
    /// for it to finish.
    pub async fn stop(self) -> Result<()> {
        self.stop.notify_one();
        self.handle.await.map_err(|join_err| DuctError::Io {
            path: "<tee task>".into(),
            source: std::io::Error::other(join_err),
        })?
    }
}

async fn catch_up(
    infile: &mut (impl AsyncRead + Unpin),
    sink: &mut (impl AsyncWrite + Unpin),
) -> Result<()> {
    let mut buf = [0u8; 8192];
    loop {
        let n = infile
            .read(&mut buf)
            .await
            .map_err(|source| DuctError::Io {
                path: "<tee source>".into(),
                source,
            })?;
        if n == 0 {
            return Ok(());
        }
        sink.write_all(&buf[..n])
            .await
            .map_err(|source| DuctError::Io {
                path: "<tee sink>".into(),
                source,
            })?;
        sink.flush().await.map_err(|source| DuctError::Io {
            path: "<tee sink>".into(),
            source,
        })?;
    }
}
