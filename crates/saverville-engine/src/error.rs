//! Error types for the console binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the command loop.

/// Top-level error for the console binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: saverville_core::config::ConfigError,
    },

    /// The farm could not be built.
    #[error("farm error: {source}")]
    Farm {
        /// The underlying farm error.
        #[from]
        source: saverville_core::FarmError,
    },

    /// Reading commands from stdin failed.
    #[error("io error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing a snapshot failed.
    #[error("json error: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
