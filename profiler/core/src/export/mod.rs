//! Sinks for snapshots of accumulated entries.

mod channel;
mod csv;
mod jsonl;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

pub use channel::ChannelExporter;
pub use csv::{CsvExporter, DEFAULT_FLUSH_INTERVAL};
pub use jsonl::JsonlExporter;

use crate::entry::Entry;
use crate::error::ProfilerError;

/// Writes a snapshot of entries somewhere.
///
/// `entries` is an ordered copy taken by the profiler; the exporter owns the
/// choice of destination and format. Errors are returned to the profiler,
/// which reports them and carries on.
pub trait Exporter: Send + Sync {
    fn export(&self, entries: &[Entry]) -> Result<(), ProfilerError>;
}

impl<F> Exporter for F
where
    F: Fn(&[Entry]) -> Result<(), ProfilerError> + Send + Sync,
{
    fn export(&self, entries: &[Entry]) -> Result<(), ProfilerError> {
        self(entries)
    }
}

/// Opens `path` for writing, creating missing parent directories and
/// truncating any existing content.
pub(crate) fn create_truncated(path: &Path) -> Result<BufWriter<File>, ProfilerError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}
