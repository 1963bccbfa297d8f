//! Sensitive-data redaction applied to every log call before any sink.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::models::{ContextValue, LogMeta};

/// Replacement for token fragments and inlined password fields in text.
pub const MASK: &str = "(hidden)";

/// Replacement for the value of a deny-listed context key.
pub const PASSWORD_MASK: &str = "(hidden password)";

/// Context keys whose value is always replaced, at any depth.
pub const DENIED_KEYS: [&str; 3] = ["password", "passwordHash", "newPassword"];

// Access tokens passed as `auth=c...` query parameters
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"auth=c[a-z0-9-]*").expect("valid token pattern"));

// Serialized password fields: "password":"..." or "password"="..."
static PASSWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(password|passwordHash|newPassword)"\s*[:=]\s*"[^"]*""#).expect("valid password pattern")
});

// Bearer tokens in Authorization headers
static BEARER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-_.=]+").expect("valid bearer pattern"));

/// Pure transform scrubbing secrets from messages and context.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedactionFilter;

impl RedactionFilter {
    /// Filter with the built-in patterns and deny list.
    pub const fn new() -> Self {
        Self
    }

    /// Scrub a message of sensitive data. Plain substitution, no parsing.
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = TOKEN_PATTERN.replace_all(message, format!("auth={MASK}").as_str());
        let scrubbed = PASSWORD_PATTERN.replace_all(&scrubbed, format!("$1={MASK}").as_str());
        BEARER_PATTERN
            .replace_all(&scrubbed, format!("Bearer {MASK}").as_str())
            .into_owned()
    }

    /// Redacted copy of a value tree.
    pub fn scrub_value(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.scrub_message(text)),
            Value::Array(items) => Value::Array(items.iter().map(|item| self.scrub_value(item)).collect()),
            Value::Object(map) => {
                let scrubbed: Map<String, Value> = map
                    .iter()
                    .map(|(key, item)| {
                        let item = if DENIED_KEYS.contains(&key.as_str()) {
                            Value::String(PASSWORD_MASK.to_string())
                        } else {
                            self.scrub_value(item)
                        };
                        (key.clone(), item)
                    })
                    .collect();
                Value::Object(scrubbed)
            }
            other => other.clone(),
        }
    }

    /// Errors are handed back untouched.
    pub fn scrub_context(&self, context: &ContextValue) -> ContextValue {
        match context {
            ContextValue::Data(value) => ContextValue::Data(self.scrub_value(value)),
            ContextValue::Error(_) => context.clone(),
        }
    }

    /// Scrub every value of a call's context.
    pub fn scrub_meta(&self, meta: &LogMeta) -> LogMeta {
        match meta {
            LogMeta::Single(value) => LogMeta::Single(self.scrub_context(value)),
            LogMeta::Many(values) => LogMeta::Many(values.iter().map(|value| self.scrub_context(value)).collect()),
        }
    }
}
