//! The `Sampler` trait (component C): one session-wide observation per call.

use duct_core::types::Sample;

/// Enumerates the processes belonging to a process session and turns them
/// into a [`Sample`]. Implementations are platform-specific since there is
/// no portable way to enumerate-by-session.
pub trait Sampler: Send + Sync {
    /// Returns `Ok(None)` when the session has no live processes left to
    /// observe (distinct from an I/O error talking to `ps`).
    fn sample(&self, session_id: i32) -> anyhow::Result<Option<Sample>>;
}

/// The `Sampler` for the host this binary was built for.
pub fn default_sampler() -> Box<dyn Sampler> {
    #[cfg(target_os = "linux")]
    {
        Box::new(crate::linux::LinuxSampler)
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(crate::macos::MacSampler)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        compile_error!("duct-sampler supports only linux and macos");
    }
}
