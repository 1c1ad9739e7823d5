//! Path planning: expand an output-prefix template into the four log paths
//! (component A) and prepare them on disk.

use chrono::{DateTime, Local};
use duct_core::config::Outputs;
use duct_core::constants::Suffixes;
use duct_core::error::{DuctError, Result};
use std::path::{Path, PathBuf};

/// The resolved paths for one run, plus the formatted prefix they share.
#[derive(Debug, Clone)]
pub struct LogPaths {
    pub stdout: PathBuf,
    pub stderr: PathBuf,
    pub usage: PathBuf,
    pub info: PathBuf,
    pub prefix: PathBuf,
}

impl LogPaths {
    /// Expand `{datetime}` and `{pid}` (plus the deprecated `{datetime_filesafe}`
    /// alias) in `output_prefix`, then append each suffix.
    pub fn plan(output_prefix: &str, pid: u32, now: DateTime<Local>) -> Self {
        let datetime_filesafe = now.format("%Y.%m.%dT%H.%M.%S").to_string();
        let formatted = output_prefix
            .replace("{datetime_filesafe}", &datetime_filesafe)
            .replace("{datetime}", &datetime_filesafe)
            .replace("{pid}", &pid.to_string());

        let prefix = PathBuf::from(&formatted);
        LogPaths {
            stdout: append_suffix(&formatted, Suffixes::STDOUT),
            stderr: append_suffix(&formatted, Suffixes::STDERR),
            usage: append_suffix(&formatted, Suffixes::USAGE),
            info: append_suffix(&formatted, Suffixes::INFO),
            prefix,
        }
    }

    fn all(&self) -> [(&'static str, &Path); 4] {
        [
            ("stdout", &self.stdout),
            ("stderr", &self.stderr),
            ("usage", &self.usage),
            ("info", &self.info),
        ]
    }

    /// Create the prefix directory (or its parent, for a file-style prefix)
    /// and touch every path this run's `capture_outputs` setting will write
    /// to. Returns a conflict error listing every pre-existing path unless
    /// `clobber` is set.
    pub fn prepare(&self, clobber: bool, capture_outputs: Outputs) -> Result<()> {
        let conflicts: Vec<String> = self
            .all()
            .iter()
            .filter(|(_, path)| path.exists())
            .map(|(_, path)| path.display().to_string())
            .collect();
        if !conflicts.is_empty() && !clobber {
            return Err(DuctError::PathConflict(conflicts));
        }

        let prefix_str = self.prefix.to_string_lossy();
        if prefix_str.ends_with(std::path::MAIN_SEPARATOR) {
            std::fs::create_dir_all(&self.prefix).map_err(|source| DuctError::Io {
                path: self.prefix.display().to_string(),
                source,
            })?;
        } else if let Some(dir) = self.prefix.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| DuctError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        }

        for (name, path) in self.all() {
            if name == "stdout" && !capture_outputs.has_stdout() {
                continue;
            }
            if name == "stderr" && !capture_outputs.has_stderr() {
                continue;
            }
            std::fs::File::create(path).map_err(|source| DuctError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Delete every prepared path that still exists, per the trim policy.
    /// `assert_empty` mirrors the original's debug-mode guard: a non-empty
    /// file at this point means the caller is trimming too late.
    pub fn remove(&self, assert_empty: bool) -> Result<()> {
        for (_, path) in self.all() {
            if !path.exists() {
                continue;
            }
            if assert_empty {
                let len = std::fs::metadata(path)
                    .map_err(|source| DuctError::Io {
                        path: path.display().to_string(),
                        source,
                    })?
                    .len();
                debug_assert_eq!(len, 0, "trimming non-empty file {}", path.display());
            }
            std::fs::remove_file(path).map_err(|source| DuctError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

fn append_suffix(formatted_prefix: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{formatted_prefix}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap()
    }

    #[test]
    fn placeholders_expand_into_all_four_paths() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("{datetime}-{pid}_");
        let paths = LogPaths::plan(prefix.to_str().unwrap(), 42, fixed_now());
        assert!(paths.stdout.to_string_lossy().ends_with("stdout"));
        assert!(paths.stdout.to_string_lossy().contains("-42_"));
        assert!(paths.stdout.to_string_lossy().contains("2024.03.05"));
    }

    #[test]
    fn legacy_datetime_filesafe_placeholder_still_expands() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("{datetime_filesafe}_");
        let paths = LogPaths::plan(prefix.to_str().unwrap(), 1, fixed_now());
        assert!(paths.prefix.to_string_lossy().contains("2024.03.05"));
    }

    #[test]
    fn prepare_creates_directory_style_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("logs").join("");
        let paths = LogPaths::plan(prefix.to_str().unwrap(), 1, fixed_now());
        paths.prepare(false, Outputs::All).unwrap();
        assert!(paths.stdout.exists());
        assert!(paths.info.exists());
    }

    #[test]
    fn prepare_skips_uncaptured_streams() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run_");
        let paths = LogPaths::plan(prefix.to_str().unwrap(), 1, fixed_now());
        paths.prepare(false, Outputs::Stdout).unwrap();
        assert!(paths.stdout.exists());
        assert!(!paths.stderr.exists());
    }

    #[test]
    fn prepare_without_clobber_rejects_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run_");
        let paths = LogPaths::plan(prefix.to_str().unwrap(), 1, fixed_now());
        paths.prepare(false, Outputs::All).unwrap();

        let again = LogPaths::plan(prefix.to_str().unwrap(), 1, fixed_now());
        let err = again.prepare(false, Outputs::All).unwrap_err();
        assert!(matches!(err, DuctError::PathConflict(_)));
    }

    #[test]
    fn prepare_with_clobber_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run_");
        let paths = LogPaths::plan(prefix.to_str().unwrap(), 1, fixed_now());
        paths.prepare(false, Outputs::All).unwrap();
        paths.prepare(true, Outputs::All).unwrap();
        assert!(paths.stdout.exists());
    }

    #[test]
    fn remove_deletes_all_prepared_paths() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run_");
        let paths = LogPaths::plan(prefix.to_str().unwrap(), 1, fixed_now());
        paths.prepare(false, Outputs::All).unwrap();
        paths.remove(true).unwrap();
        assert!(!paths.stdout.exists());
        assert!(!paths.info.exists());
    }
}
