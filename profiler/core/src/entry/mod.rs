mod factory;
mod timing;

use serde::Serialize;

pub use factory::{BasicEntryFactory, EntryFactory, ThreadEntryFactory};
pub use timing::{current_thread_id, Timestamp, Timing};

/// Column names for [`Entry::Basic`] rows.
pub const BASIC_HEADER: [&str; 4] = ["Type", "Start Time", "End Time", "Delta Time (ms)"];

/// Column names for [`Entry::Threaded`] rows.
pub const THREADED_HEADER: [&str; 5] = [
    "Type",
    "Start Time",
    "End Time",
    "Delta Time (ms)",
    "Thread",
];

/// One completed timed event.
///
/// Entries are plain values: the profiler hands out copies, so an entry can
/// never change after the matching `end` produced it. Every variant shares
/// the same [`Timing`] and differs only in the extra fields it carries and
/// therefore in the row it serializes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    /// Name, start, end and derived duration.
    Basic(Timing),
    /// Like `Basic`, plus the OS thread that ended the timer.
    Threaded {
        #[serde(flatten)]
        timing: Timing,
        thread_id: u64,
    },
}

impl Entry {
    pub fn basic<N: Into<String>>(name: N, start: Timestamp, end: Timestamp) -> Self {
        Entry::Basic(Timing::new(name, start, end))
    }

    pub fn threaded<N: Into<String>>(
        name: N,
        start: Timestamp,
        end: Timestamp,
        thread_id: u64,
    ) -> Self {
        Entry::Threaded {
            timing: Timing::new(name, start, end),
            thread_id,
        }
    }

    pub fn timing(&self) -> &Timing {
        match self {
            Entry::Basic(timing) => timing,
            Entry::Threaded { timing, .. } => timing,
        }
    }

    pub fn name(&self) -> &str {
        &self.timing().name
    }

    pub fn start(&self) -> Timestamp {
        self.timing().start
    }

    pub fn end(&self) -> Timestamp {
        self.timing().end
    }

    /// Elapsed milliseconds, derived from start and end on every call.
    pub fn duration(&self) -> i64 {
        self.timing().duration()
    }

    /// Column names matching [`to_row`](Entry::to_row) for this variant.
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            Entry::Basic(_) => &BASIC_HEADER,
            Entry::Threaded { .. } => &THREADED_HEADER,
        }
    }

    /// Serializes this entry to a row of fields, one per output column.
    pub fn to_row(&self) -> Vec<String> {
        match self {
            Entry::Basic(timing) => timing.row(),
            Entry::Threaded { timing, thread_id } => {
                let mut row = timing.row();
                row.push(thread_id.to_string());
                row
            }
        }
    }
}
