//! Log destination ports.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::models::{Level, LogMeta, LogRecord};

/// Destination for formatted log records (console, file, rotating file).
pub trait LogSink: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Minimum level this sink accepts.
    fn level(&self) -> Level;

    /// Write one record. The hub reports failures as tracing warnings and
    /// never hands them back to the logging call.
    fn write(&self, record: &LogRecord) -> std::io::Result<()>;

    /// Whether a call at `level` reaches this sink.
    fn accepts(&self, level: Level) -> bool {
        level >= self.level()
    }
}

/// Externally supplied sink receiving every log call after readiness.
#[async_trait]
pub trait CustomSink: Send + Sync {
    /// Called once with `logs.custom.settings` before the first `log`.
    async fn init(&self, settings: Value) -> anyhow::Result<()>;

    /// `key` is the logger namespace, `text` the redacted message.
    fn log(&self, level: Level, key: &str, text: &str, meta: Option<&LogMeta>);
}
