//! Log levels, call context and records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::errors::LoggerError;

/// Log level enumeration for structured logging
///
/// Levels are ordered from most verbose (Trace) to most severe (Error).
/// This ordering allows filtering and comparison operations.
///
/// # Examples
///
/// ```
/// use boiler::domain::models::Level;
///
/// assert!(Level::Error > Level::Info);
/// assert!(Level::Trace < Level::Debug);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Most verbose.
    Trace,
    /// Also reaches the debug channel.
    Debug,
    /// Routine events.
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures.
    Error,
}

impl Level {
    /// Lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.trim().to_lowercase().as_str() {
            "trace" | "silly" => Ok(Self::Trace),
            "debug" | "verbose" => Ok(Self::Debug),
            "info" | "http" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LoggerError::InvalidLevel(level.to_string())),
        }
    }
}

/// One value attached to a log call.
#[derive(Clone)]
pub enum ContextValue {
    /// Detached value tree, redacted before output.
    Data(Value),
    /// Errors bypass redaction and are rendered as-is.
    Error(Arc<dyn Error + Send + Sync>),
}

/// Placeholder for context values `serde` cannot represent.
pub const UNSERIALIZABLE: &str = "[unserializable]";

impl ContextValue {
    /// Detach any serializable value into an owned tree.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::Data(serde_json::to_value(value).unwrap_or_else(|_| Value::String(UNSERIALIZABLE.to_string())))
    }

    /// Attach an error; rendered as `{name, message, source}`.
    pub fn error<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Error(Arc::new(err))
    }

    /// JSON rendering used by sinks.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Data(value) => value.clone(),
            Self::Error(err) => json!({
                "name": "Error",
                "message": err.to_string(),
                "source": err.source().map(ToString::to_string),
            }),
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Self::Error(err) => f.debug_tuple("Error").field(&err.to_string()).finish(),
        }
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::Data(Value::String(value.to_string()))
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Data(Value::String(value))
    }
}

/// Context attached to a log record.
///
/// A single context value is kept unwrapped; two or more stay a list.
#[derive(Debug, Clone)]
pub enum LogMeta {
    /// Exactly one value.
    Single(ContextValue),
    /// Two or more values, kept in call order.
    Many(Vec<ContextValue>),
}

impl LogMeta {
    /// `None` for no context.
    pub fn from_context(mut context: Vec<ContextValue>) -> Option<Self> {
        match context.len() {
            0 => None,
            1 => context.pop().map(Self::Single),
            _ => Some(Self::Many(context)),
        }
    }

    /// JSON rendering of the whole context.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(value) => value.to_json(),
            Self::Many(values) => Value::Array(values.iter().map(ContextValue::to_json).collect()),
        }
    }
}

/// A redacted log call on its way to the sinks.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Time of the call
    pub timestamp: DateTime<Utc>,
    /// Call level
    pub level: Level,
    /// Full `:`-joined logger namespace.
    pub namespace: String,
    /// Redacted message
    pub message: String,
    /// Redacted context
    pub meta: Option<LogMeta>,
}

impl LogRecord {
    /// `[namespace] message`, the text every sink receives.
    pub fn text(&self) -> String {
        format!("[{}] {}", self.namespace, self.message)
    }

    /// Compact rendering of the meta, empty when there is none.
    pub fn meta_text(&self) -> String {
        self.meta
            .as_ref()
            .map(|meta| meta.to_json().to_string())
            .unwrap_or_default()
    }
}
