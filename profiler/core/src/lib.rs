//! Lightweight manual timing spans.
//!
//! A [`Profiler`] tracks open timers by name, turns each matching
//! `start`/`end` pair into an [`Entry`], and hands copies of the accumulated
//! entries to an [`Exporter`] such as [`CsvExporter`].

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod entry;
pub mod error;
pub mod export;
mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ProfilerConfig, Retention};
pub use diagnostics::{Diagnostics, LogDiagnostics, RecordingDiagnostics};
pub use entry::{
    BasicEntryFactory, Entry, EntryFactory, ThreadEntryFactory, Timestamp, Timing, BASIC_HEADER,
    THREADED_HEADER,
};
pub use error::ProfilerError;
pub use export::{ChannelExporter, CsvExporter, Exporter, JsonlExporter};
pub use registry::{Profiler, TimerGuard};
