use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::entry::EntryFactory;
use crate::error::ProfilerError;
use crate::export::Exporter;

pub const ENV_ASYNC_EXPORT: &str = "PROFILER_ASYNC_EXPORT";
pub const ENV_DIAGNOSTIC_LOGGING: &str = "PROFILER_DIAGNOSTIC_LOGGING";
pub const ENV_MAX_ENTRIES: &str = "PROFILER_MAX_ENTRIES";

/// How many completed entries a profiler keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    /// Keep every entry for the lifetime of the profiler.
    #[default]
    Unbounded,
    /// Keep only the most recent `n` entries, evicting the oldest.
    KeepLatest(usize),
}

impl Retention {
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Retention::Unbounded => None,
            Retention::KeepLatest(n) => Some(*n),
        }
    }
}

/// Everything needed to build a [`crate::Profiler`].
///
/// `factory` and `exporter` are required; [`crate::Profiler::new`] rejects a
/// config missing either one. The rest have defaults:
///
/// ```rust
/// use std::sync::Arc;
/// use profiler_core::{BasicEntryFactory, CsvExporter, Profiler, ProfilerConfig};
///
/// let profiler = Profiler::new(ProfilerConfig {
///     factory: Some(Arc::new(BasicEntryFactory)),
///     exporter: Some(Arc::new(CsvExporter::new("out/profile.csv"))),
///     async_export: false,
///     ..Default::default()
/// })?;
/// # Ok::<(), profiler_core::ProfilerError>(())
/// ```
#[derive(Clone)]
pub struct ProfilerConfig {
    pub factory: Option<Arc<dyn EntryFactory>>,
    pub exporter: Option<Arc<dyn Exporter>>,
    /// Run exports on a dedicated background thread.
    pub async_export: bool,
    /// Emit informational messages for start, end, export and shutdown.
    pub diagnostic_logging: bool,
    pub retention: Retention,
    pub diagnostics: Arc<dyn Diagnostics>,
    pub clock: Arc<dyn Clock>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            factory: None,
            exporter: None,
            async_export: true,
            diagnostic_logging: false,
            retention: Retention::Unbounded,
            diagnostics: Arc::new(LogDiagnostics),
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for ProfilerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilerConfig")
            .field("factory", &self.factory.is_some())
            .field("exporter", &self.exporter.is_some())
            .field("async_export", &self.async_export)
            .field("diagnostic_logging", &self.diagnostic_logging)
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

impl ProfilerConfig {
    /// Checks that both required collaborators are present.
    pub fn validate(&self) -> Result<(), ProfilerError> {
        self.collaborators().map(|_| ())
    }

    pub(crate) fn collaborators(
        &self,
    ) -> Result<(Arc<dyn EntryFactory>, Arc<dyn Exporter>), ProfilerError> {
        let factory = self.factory.clone().ok_or(ProfilerError::MissingFactory)?;
        let exporter = self.exporter.clone().ok_or(ProfilerError::MissingExporter)?;
        Ok((factory, exporter))
    }

    /// Set an option from its string form.
    ///
    /// # Supported keys
    /// * `async_export` - bool
    /// * `diagnostic_logging` - bool
    /// * `max_entries` - `0` for unbounded, otherwise the ring buffer size
    ///
    /// Bools accept `true/false`, `1/0`, `on/off` and `yes/no`, case-insensitively.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ProfilerError> {
        let invalid = || ProfilerError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "async_export" => self.async_export = parse_bool(value).ok_or_else(invalid)?,
            "diagnostic_logging" => {
                self.diagnostic_logging = parse_bool(value).ok_or_else(invalid)?
            }
            "max_entries" => {
                let n: usize = value.trim().parse().map_err(|_| invalid())?;
                self.retention = match n {
                    0 => Retention::Unbounded,
                    n => Retention::KeepLatest(n),
                };
            }
            _ => return Err(ProfilerError::UnsupportedOption(key.to_string())),
        }
        Ok(())
    }

    /// Overrides options from `PROFILER_*` environment variables that are set.
    pub fn apply_env(&mut self) -> Result<(), ProfilerError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ProfilerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in [
            (ENV_ASYNC_EXPORT, "async_export"),
            (ENV_DIAGNOSTIC_LOGGING, "diagnostic_logging"),
            (ENV_MAX_ENTRIES, "max_entries"),
        ] {
            if let Some(value) = lookup(var) {
                self.set(key, &value)?;
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
