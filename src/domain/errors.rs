//! Domain errors for configuration bootstrap and logger wiring.

use thiserror::Error;

/// Errors raised by the configuration store and the bootstrap lifecycle.
///
/// The type is `Clone` because a bootstrap failure is handed to every caller
/// waiting in `get_config()`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `get_config()` before `init()`.
    #[error("Configuration was requested before init() was called")]
    NotInitialized,

    /// Second `init()` on the same context.
    #[error("Configuration bootstrap was already initialized")]
    AlreadyInitialized,

    /// Unsafe read while loading.
    #[error("Configuration is not ready yet")]
    NotReady,

    /// `replace_scope_config` on an undeclared label.
    #[error("Unknown configuration scope: {0}")]
    UnknownScope(String),

    /// A file, module or environment source failed.
    #[error("Failed to load scope '{scope}' from {origin}: {reason}")]
    SourceLoad {
        scope: String,
        origin: String,
        reason: String,
    },

    /// Remote or `file://` fetch failed, timed out or returned bad data.
    #[error("Failed to fetch scope '{scope}' from {url}: {reason}")]
    RemoteFetch {
        scope: String,
        url: String,
        reason: String,
    },

    /// `RemoteUrlFromKey` found no URL at its key.
    #[error("Scope '{scope}' depends on key '{key}' which no earlier source has set")]
    MissingDependency { scope: String, key: String },

    /// A plugin returned an error.
    #[error("Configuration plugin failed: {reason}")]
    Plugin { reason: String },

    /// Sink wiring failed.
    #[error("Logger setup failed: {0}")]
    Logging(#[from] LoggerError),
}

/// Errors raised while wiring the structured log sinks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoggerError {
    /// Sinks were already wired.
    #[error("Logger was already initialized")]
    AlreadyInitialized,

    /// Level name not recognised.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLevel(String),

    /// Bad `logs` settings or an unopenable file.
    #[error("Failed to set up log sink: {0}")]
    SinkSetup(String),

    /// `logs.custom.path` names no registered sink.
    #[error("No custom sink registered under '{0}'")]
    UnknownCustomSink(String),

    /// The custom sink's `init` failed.
    #[error("Custom sink initialization failed: {0}")]
    CustomSinkInit(String),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<std::io::Error> for LoggerError {
    fn from(err: std::io::Error) -> Self {
        Self::SinkSetup(err.to_string())
    }
}
