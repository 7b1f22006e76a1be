use super::{current_thread_id, Entry, Timestamp};

/// Builds an [`Entry`] once a `start`/`end` pair resolves.
///
/// This is the seam for alternative entry representations: the profiler
/// never constructs entries itself. Implementations must be pure and cheap,
/// since `create` runs on the thread that called `end`.
pub trait EntryFactory: Send + Sync {
    fn create(&self, name: &str, start: Timestamp, end: Timestamp) -> Entry;
}

impl<F> EntryFactory for F
where
    F: Fn(&str, Timestamp, Timestamp) -> Entry + Send + Sync,
{
    fn create(&self, name: &str, start: Timestamp, end: Timestamp) -> Entry {
        self(name, start, end)
    }
}

/// Produces [`Entry::Basic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEntryFactory;

impl EntryFactory for BasicEntryFactory {
    fn create(&self, name: &str, start: Timestamp, end: Timestamp) -> Entry {
        Entry::basic(name, start, end)
    }
}

/// Produces [`Entry::Threaded`], tagged with the thread that called `end`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadEntryFactory;

impl EntryFactory for ThreadEntryFactory {
    fn create(&self, name: &str, start: Timestamp, end: Timestamp) -> Entry {
        Entry::threaded(name, start, end, current_thread_id())
    }
}
