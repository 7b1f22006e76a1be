mod store;
mod worker;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use store::{EntryStore, Pushed};
use worker::{ExportJob, ExportWorker};

use crate::clock::Clock;
use crate::config::{ProfilerConfig, Retention};
use crate::diagnostics::Diagnostics;
use crate::entry::{Entry, EntryFactory};
use crate::error::ProfilerError;
use crate::export::Exporter;

/// Thread-safe registry of named timers.
///
/// `start(name)` opens a timer, `end(name)` closes it and appends an
/// [`Entry`] built by the configured [`EntryFactory`], and `export()` hands a
/// point-in-time copy of all entries to the configured [`Exporter`].
///
/// All bookkeeping sits behind one mutex per profiler. Exports either run on
/// the calling thread or, with `async_export`, on a single background thread
/// that processes them in the order they were requested.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use profiler_core::{BasicEntryFactory, CsvExporter, Profiler, ProfilerConfig};
///
/// let dir = tempfile::tempdir()?;
/// let profiler = Profiler::new(ProfilerConfig {
///     factory: Some(Arc::new(BasicEntryFactory)),
///     exporter: Some(Arc::new(CsvExporter::new(dir.path().join("profile.csv")))),
///     ..Default::default()
/// })?;
///
/// profiler.start("load");
/// // ... work ...
/// profiler.end("load");
///
/// profiler.export();
/// profiler.shutdown();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Profiler {
    shared: Arc<Shared>,
    worker: Mutex<Option<ExportWorker>>,
}

struct Shared {
    factory: Arc<dyn EntryFactory>,
    exporter: Arc<dyn Exporter>,
    diagnostics: Arc<dyn Diagnostics>,
    clock: Arc<dyn Clock>,
    retention: Retention,
    verbose: bool,
    store: Mutex<EntryStore>,
}

impl Shared {
    fn store(&self) -> MutexGuard<'_, EntryStore> {
        // Critical sections are single map or deque operations; a poisoned store is still consistent.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn info(&self, message: impl FnOnce() -> String) {
        if self.verbose {
            self.diagnostics.info(&message());
        }
    }

    fn run_export(&self, entries: &[Entry]) {
        self.info(|| format!("export started: {} entries", entries.len()));
        match panic::catch_unwind(AssertUnwindSafe(|| self.exporter.export(entries))) {
            Ok(Ok(())) => self.info(|| format!("export finished: {} entries", entries.len())),
            Ok(Err(err)) => self.diagnostics.error(&format!(
                "failed to export {} entries: {err}",
                entries.len()
            )),
            Err(_) => self.diagnostics.error(&format!(
                "exporter panicked while exporting {} entries",
                entries.len()
            )),
        }
    }
}

impl Profiler {
    /// Builds a profiler from `config`.
    ///
    /// Fails with [`ProfilerError::MissingFactory`] or
    /// [`ProfilerError::MissingExporter`] when a required collaborator is
    /// absent, and with [`ProfilerError::Worker`] when the background export
    /// thread cannot be started.
    pub fn new(config: ProfilerConfig) -> Result<Self, ProfilerError> {
        let (factory, exporter) = config.collaborators()?;
        let ProfilerConfig {
            async_export,
            diagnostic_logging,
            retention,
            diagnostics,
            clock,
            ..
        } = config;

        let worker = if async_export {
            Some(ExportWorker::spawn()?)
        } else {
            None
        };

        let shared = Arc::new(Shared {
            factory,
            exporter,
            diagnostics,
            clock,
            retention,
            verbose: diagnostic_logging,
            store: Mutex::new(EntryStore::new(retention)),
        });
        shared.info(|| {
            format!(
                "profiler created: async_export={async_export}, retention={retention:?}"
            )
        });

        Ok(Self {
            shared,
            worker: Mutex::new(worker),
        })
    }

    /// Opens a timer for `name` at the current time.
    ///
    /// A timer already open under the same name is replaced: the later start wins.
    pub fn start(&self, name: &str) {
        let (now, replaced) = {
            let mut store = self.shared.store();
            let now = self.shared.clock.now();
            (now, store.open(name, now))
        };
        self.shared.info(|| match replaced {
            Some(previous) => {
                format!("start '{name}' at {now} (replaces open start at {previous})")
            }
            None => format!("start '{name}' at {now}"),
        });
    }

    /// Closes the timer for `name` and records an entry.
    ///
    /// Without a matching open timer this emits one warning and changes nothing.
    pub fn end(&self, name: &str) {
        // Clock is read under the lock: timestamps follow lock order.
        let (now, start) = {
            let mut store = self.shared.store();
            let now = self.shared.clock.now();
            (now, store.close(name))
        };
        let Some(start) = start else {
            self.shared
                .diagnostics
                .warn(&format!("end() called for '{name}' with no matching start()"));
            return;
        };

        // Built outside the lock; factories may allocate.
        let entry = self.shared.factory.create(name, start, now);
        let duration = entry.duration();

        let pushed = self.shared.store().push(entry);
        if pushed == (Pushed::Evicted { first: true }) {
            self.shared.diagnostics.warn(&format!(
                "retention limit reached ({:?}), evicting oldest entries",
                self.shared.retention
            ));
        }
        self.shared
            .info(|| format!("end '{name}' at {now}, duration {duration} ms"));
    }

    /// Exports a copy of all entries recorded so far.
    ///
    /// The copy is taken under the lock before this returns. In asynchronous
    /// mode the write is queued for the export thread; after [`shutdown`]
    /// it runs on the calling thread instead. Failures are reported through
    /// the diagnostic channel and never reach the caller.
    ///
    /// [`shutdown`]: Profiler::shutdown
    pub fn export(&self) {
        let snapshot = self.shared.store().snapshot();
        self.shared
            .info(|| format!("export requested: {} entries", snapshot.len()));

        let shared = Arc::clone(&self.shared);
        let job: ExportJob = Box::new(move || shared.run_export(&snapshot));

        let rejected = match self.worker().as_ref() {
            Some(worker) => worker.submit(job).err(),
            None => Some(job),
        };
        if let Some(job) = rejected {
            job();
        }
    }

    /// Stops the export thread after it finishes every queued export.
    ///
    /// Idempotent, and a no-op for synchronous profilers. Recorded entries
    /// and open timers are kept.
    pub fn shutdown(&self) {
        let worker = self.worker().take();
        if let Some(mut worker) = worker {
            if !worker.shutdown() {
                self.shared
                    .diagnostics
                    .error("export worker terminated abnormally");
            }
            self.shared.info(|| "profiler shutdown: export worker stopped".to_string());
        } else {
            self.shared.info(|| "profiler shutdown".to_string());
        }
    }

    /// Whether exports are currently handed to a background thread.
    pub fn is_async(&self) -> bool {
        self.worker().is_some()
    }

    /// Copy of all recorded entries, oldest first.
    pub fn entries(&self) -> Vec<Entry> {
        self.shared.store().snapshot()
    }

    pub fn len(&self) -> usize {
        self.shared.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a timer is open for `name`.
    pub fn is_running(&self, name: &str) -> bool {
        self.shared.store().is_open(name)
    }

    /// Names of all open timers, sorted.
    pub fn running(&self) -> Vec<String> {
        self.shared.store().open_names()
    }

    /// Discards recorded entries. Open timers are not affected.
    pub fn clear(&self) {
        self.shared.store().clear();
        self.shared.info(|| "entries cleared".to_string());
    }

    /// Number of entries evicted by the retention policy.
    pub fn dropped(&self) -> u64 {
        self.shared.store().dropped()
    }

    /// Starts `name` now and ends it when the returned guard is dropped.
    pub fn guard<N: Into<String>>(&self, name: N) -> TimerGuard<'_> {
        let name = name.into();
        self.start(&name);
        TimerGuard {
            profiler: self,
            name,
        }
    }

    /// Times `f` under `name`.
    pub fn time<T, F: FnOnce() -> T>(&self, name: &str, f: F) -> T {
        self.start(name);
        let out = f();
        self.end(name);
        out
    }

    fn worker(&self) -> MutexGuard<'_, Option<ExportWorker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Profiler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Profiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profiler")
            .field("entries", &self.len())
            .field("running", &self.running())
            .field("async", &self.is_async())
            .field("retention", &self.shared.retention)
            .finish()
    }
}

/// Ends its timer on drop. Returned by [`Profiler::guard`].
#[must_use = "the timer ends as soon as the guard is dropped"]
pub struct TimerGuard<'a> {
    profiler: &'a Profiler,
    name: String,
}

impl TimerGuard<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.profiler.end(&self.name);
    }
}

impl fmt::Debug for TimerGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerGuard").field("name", &self.name).finish()
    }
}
