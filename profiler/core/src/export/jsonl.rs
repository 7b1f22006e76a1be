use std::io::Write;
use std::path::{Path, PathBuf};

use super::{create_truncated, Exporter};
use crate::entry::Entry;
use crate::error::ProfilerError;

/// Persist entries as JSON lines, one object per entry.
///
/// Like [`super::CsvExporter`], each export replaces the file.
#[derive(Debug, Clone)]
pub struct JsonlExporter {
    path: PathBuf,
}

impl JsonlExporter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Exporter for JsonlExporter {
    fn export(&self, entries: &[Entry]) -> Result<(), ProfilerError> {
        let mut writer = create_truncated(&self.path)?;
        for entry in entries {
            serde_json::to_writer(&mut writer, entry)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}
