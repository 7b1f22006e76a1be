use std::sync::Mutex;

use log::Level;

/// Log target used by [`LogDiagnostics`].
pub const LOG_TARGET: &str = "profiler";

/// Operator-visible, write-only sink for profiler messages.
///
/// The profiler never reads back what it emits. Injecting the sink instead of
/// logging to a process-wide logger lets each profiler (and each test) decide
/// where its warnings go.
pub trait Diagnostics: Send + Sync {
    fn emit(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }
}

/// Forwards to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{message}");
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<(Level, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages emitted so far, oldest first.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Messages emitted at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::Error)
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_by_level() {
        let diag = RecordingDiagnostics::new();
        diag.info("hello");
        diag.warn("careful");
        diag.error("broken");
        diag.warn("again");

        assert_eq!(diag.records().len(), 4);
        assert_eq!(diag.warnings(), vec!["careful", "again"]);
        assert_eq!(diag.errors(), vec!["broken"]);
        assert_eq!(diag.messages(Level::Info), vec!["hello"]);

        diag.clear();
        assert!(diag.records().is_empty());
    }

    #[test]
    fn test_log_diagnostics_does_not_panic_without_logger() {
        LogDiagnostics.warn("no logger installed");
    }
}
