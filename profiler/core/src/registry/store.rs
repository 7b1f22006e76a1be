use std::collections::{HashMap, VecDeque};

use crate::config::Retention;
use crate::entry::{Entry, Timestamp};

/// Open timers and accumulated entries of one profiler.
///
/// Not synchronized; the profiler keeps it behind its single lock.
#[derive(Debug, Default)]
pub(crate) struct EntryStore {
    timers: HashMap<String, Timestamp>,
    entries: VecDeque<Entry>,
    retention: Retention,
    dropped: u64,
}

/// Result of appending an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pushed {
    Kept,
    /// The push evicted the oldest entry. `first` is set on the first eviction ever.
    Evicted { first: bool },
}

impl EntryStore {
    pub(crate) fn new(retention: Retention) -> Self {
        Self {
            retention,
            ..Default::default()
        }
    }

    /// Records `at` as the start of `name`, returning the start it replaced.
    pub(crate) fn open(&mut self, name: &str, at: Timestamp) -> Option<Timestamp> {
        self.timers.insert(name.to_string(), at)
    }

    pub(crate) fn close(&mut self, name: &str) -> Option<Timestamp> {
        self.timers.remove(name)
    }

    pub(crate) fn is_open(&self, name: &str) -> bool {
        self.timers.contains_key(name)
    }

    pub(crate) fn open_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.timers.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn push(&mut self, entry: Entry) -> Pushed {
        match self.retention.capacity() {
            Some(0) => {
                self.dropped += 1;
                Pushed::Evicted {
                    first: self.dropped == 1,
                }
            }
            Some(cap) if self.entries.len() >= cap => {
                self.entries.pop_front();
                self.entries.push_back(entry);
                self.dropped += 1;
                Pushed::Evicted {
                    first: self.dropped == 1,
                }
            }
            _ => {
                self.entries.push_back(entry);
                Pushed::Kept
            }
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Entry> {
        self.entries.iter().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped
    }
}
