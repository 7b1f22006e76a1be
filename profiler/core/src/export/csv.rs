use std::io::Write;
use std::path::{Path, PathBuf};

use super::{create_truncated, Exporter};
use crate::entry::{Entry, BASIC_HEADER};
use crate::error::ProfilerError;

/// Rows written between explicit flushes.
pub const DEFAULT_FLUSH_INTERVAL: usize = 1000;

/// Writes entries as comma-separated rows, replacing the file on every export.
///
/// The header line follows the first entry's [`Entry::header`], or
/// [`BASIC_HEADER`] for an empty snapshot, unless one is set with
/// [`with_header`](CsvExporter::with_header).
///
/// Fields are joined verbatim. A name containing a comma therefore shifts
/// the columns of its row; callers pick names accordingly.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
    header: Option<Vec<String>>,
    flush_interval: usize,
}

impl CsvExporter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            header: None,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    /// Writes `header` instead of the one derived from the entries.
    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = Some(header.into_iter().map(Into::into).collect());
        self
    }

    /// Flushes after every `rows` rows. Zero disables intermediate flushes.
    pub fn with_flush_interval(mut self, rows: usize) -> Self {
        self.flush_interval = rows;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Exporter for CsvExporter {
    fn export(&self, entries: &[Entry]) -> Result<(), ProfilerError> {
        let mut writer = create_truncated(&self.path)?;
        match (&self.header, entries.first()) {
            (Some(header), _) => writeln!(writer, "{}", header.join(","))?,
            (None, Some(first)) => writeln!(writer, "{}", first.header().join(","))?,
            (None, None) => writeln!(writer, "{}", BASIC_HEADER.join(","))?,
        }

        for (count, entry) in entries.iter().enumerate() {
            writeln!(writer, "{}", entry.to_row().join(","))?;
            if self.flush_interval > 0 && (count + 1) % self.flush_interval == 0 {
                writer.flush()?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}
