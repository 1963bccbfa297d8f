//! Namespace-filtered raw trace output, independent of the structured sinks.
//!
//! The selector follows the usual `DEBUG` convention: patterns separated by
//! commas or whitespace, `*` as wildcard, a leading `-` excludes.

use chrono::{SecondsFormat, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use parking_lot::Mutex;
use std::io::{self, Write};
use tracing::warn;

use super::sinks::BoxedWriter;

/// Environment variable holding the debug selector when none is given.
pub const DEFAULT_DEBUG_VAR: &str = "DEBUG";

/// Raw trace output filtered by namespace.
pub struct DebugChannel {
    includes: GlobSet,
    excludes: GlobSet,
    writer: Mutex<BoxedWriter>,
}

impl DebugChannel {
    /// Channel for `selector`; invalid patterns are skipped with a warning.
    pub fn new(selector: &str, writer: BoxedWriter) -> Self {
        let mut includes = GlobSetBuilder::new();
        let mut excludes = GlobSetBuilder::new();

        for pattern in selector.split([',', ' ', '\t', '\n']).filter(|p| !p.is_empty()) {
            let (builder, pattern) = match pattern.strip_prefix('-') {
                Some(excluded) => (&mut excludes, excluded),
                None => (&mut includes, pattern),
            };
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!(pattern, error = %e, "ignoring invalid debug selector pattern"),
            }
        }

        Self {
            includes: includes.build().unwrap_or_else(|_| GlobSet::empty()),
            excludes: excludes.build().unwrap_or_else(|_| GlobSet::empty()),
            writer: Mutex::new(writer),
        }
    }

    /// Channel that never fires.
    pub fn disabled() -> Self {
        Self::new("", Box::new(io::sink()))
    }

    /// Whether `namespace` is selected.
    pub fn enabled(&self, namespace: &str) -> bool {
        self.includes.is_match(namespace) && !self.excludes.is_match(namespace)
    }

    /// Write `timestamp namespace message meta` when selected.
    pub fn emit(&self, namespace: &str, message: &str, meta: &str) {
        if !self.enabled(namespace) {
            return;
        }
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut writer = self.writer.lock();
        let line = if meta.is_empty() {
            format!("{timestamp} {namespace} {message}")
        } else {
            format!("{timestamp} {namespace} {message} {meta}")
        };
        if let Err(e) = writeln!(writer, "{line}") {
            warn!(namespace, error = %e, "debug channel write failed");
        }
    }
}

impl std::fmt::Debug for DebugChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugChannel")
            .field("includes", &self.includes.len())
            .field("excludes", &self.excludes.len())
            .finish_non_exhaustive()
    }
}
