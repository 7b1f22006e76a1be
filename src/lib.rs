//! Manual timing spans for applications.
//!
//! ```rust
//! use std::sync::Arc;
//! use profiler::{BasicEntryFactory, CsvExporter, Profiler, ProfilerConfig};
//!
//! profiler::init_logging();
//!
//! let dir = tempfile::tempdir()?;
//! let profiler = Profiler::new(ProfilerConfig {
//!     factory: Some(Arc::new(BasicEntryFactory)),
//!     exporter: Some(Arc::new(CsvExporter::new(dir.path().join("timings.csv")))),
//!     ..Default::default()
//! })?;
//!
//! let total: u64 = profiler.time("sum", || (0..1_000u64).sum());
//! assert_eq!(total, 499_500);
//!
//! profiler.export();
//! profiler.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use profiler_core::*;

pub const ENV_PROFILER_LOGLEVEL: &str = "PROFILER_LOGLEVEL";

/// Install `env_logger` as the `log` backend, filtered by `PROFILER_LOGLEVEL`.
///
/// Safe to call more than once and alongside another logger: if a logger is
/// already installed this does nothing.
pub fn init_logging() {
    // try_init to avoid conflicts with a logger installed by the application
    if env_logger::try_init_from_env(env_logger::Env::new().filter(ENV_PROFILER_LOGLEVEL)).is_ok()
    {
        log::debug!("logging initialized from {ENV_PROFILER_LOGLEVEL}");
    }
}

/// Build a profiler from `config` after applying `PROFILER_*` environment overrides.
pub fn from_env(mut config: ProfilerConfig) -> Result<Profiler, ProfilerError> {
    config.apply_env()?;
    Profiler::new(config)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
        log::info!(target: diagnostics::LOG_TARGET, "still alive");
    }

    #[test]
    fn test_from_env_requires_collaborators() {
        let err = from_env(ProfilerConfig::default()).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_env_builds_profiler() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let profiler = from_env(ProfilerConfig {
            factory: Some(Arc::new(BasicEntryFactory)),
            exporter: Some(Arc::new(JsonlExporter::new(dir.path().join("p.jsonl")))),
            ..Default::default()
        })?;
        profiler.time("noop", || ());
        assert_eq!(profiler.len(), 1);
        Ok(())
    }
}
