//! JSON-lines usage log writer (component E): one `Sample` per line,
//! flushed immediately so a killed run still leaves partial data on disk.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use duct_core::error::{DuctError, Result};
use duct_core::types::Sample;

pub struct ReportWriter {
    file: File,
}

impl ReportWriter {
    /// Appends to an already-prepared usage-log path (see `duct-io`'s path
    /// planner, which creates an empty file ahead of time).
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|source| DuctError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self { file })
    }

    pub fn write_sample(&mut self, sample: &Sample) -> Result<()> {
        let line =
            serde_json::to_string(&sample.for_json()).map_err(|source| DuctError::Serialize {
                what: "usage sample",
                source,
            })?;
        writeln!(self.file, "{line}").map_err(|source| DuctError::Io {
            path: "<usage log>".into(),
            source,
        })?;
        self.file.flush().map_err(|source| DuctError::Io {
            path: "<usage log>".into(),
            source,
        })
    }
}
