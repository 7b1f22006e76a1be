use thiserror::Error;

/// Errors produced by the profiler.
///
/// Only configuration errors ever reach the caller of [`crate::Profiler`]
/// methods, and only from [`crate::Profiler::new`]. Export failures are
/// reported through the diagnostic channel instead.
#[derive(Debug, Error)]
pub enum ProfilerError {
    /// No entry factory was configured.
    #[error("entry factory not set")]
    MissingFactory,

    /// No exporter was configured.
    #[error("exporter not set")]
    MissingExporter,

    /// The option key is not recognized.
    #[error("unsupported option: {0}")]
    UnsupportedOption(String),

    /// The option value could not be parsed for the given key.
    #[error("invalid value '{value}' for option {key}")]
    InvalidOption { key: String, value: String },

    /// The background export thread could not be started.
    #[error("failed to start export worker: {0}")]
    Worker(#[source] std::io::Error),

    /// Writing to the export sink failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The receiving side of a channel exporter is gone.
    #[error("export channel closed")]
    ChannelClosed,
}

impl ProfilerError {
    /// Returns true for errors that can only happen while building a profiler.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ProfilerError::MissingFactory
                | ProfilerError::MissingExporter
                | ProfilerError::UnsupportedOption(_)
                | ProfilerError::InvalidOption { .. }
        )
    }
}
