//! Hierarchical logger handles and the panic hook.

use serde::Serialize;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{self, Location};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::hub::LogHub;
use crate::domain::models::{ContextValue, Level};

/// Separator between namespace segments.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Named handle onto the shared [`LogHub`].
///
/// Children only differ by namespace, so they are cheap to create per call
/// and never need to be cached.
#[derive(Clone)]
pub struct Logger {
    name: String,
    namespace: String,
    hub: Arc<LogHub>,
}

impl Logger {
    /// Root logger; its namespace is the application name.
    pub fn root(app_name: impl Into<String>, hub: Arc<LogHub>) -> Self {
        let name = app_name.into();
        Self {
            namespace: name.clone(),
            name,
            hub,
        }
    }

    /// Last namespace segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `:`-joined path from the root to this logger.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Child logger one level below this one.
    pub fn get_logger(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: format!("{}{NAMESPACE_SEPARATOR}{name}", self.namespace),
            hub: Arc::clone(&self.hub),
        }
    }

    /// Structured call: one context value stays a single value, more become a list.
    pub fn log(&self, level: Level, message: impl AsRef<str>, context: Vec<ContextValue>) {
        self.hub.dispatch(level, &self.namespace, message.as_ref(), context);
    }

    /// Log at error level.
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message, Vec::new());
    }

    /// Log at error level with context.
    pub fn error_with(&self, message: impl AsRef<str>, context: Vec<ContextValue>) {
        self.log(Level::Error, message, context);
    }

    /// Log at warn level.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(Level::Warn, message, Vec::new());
    }

    /// Log at warn level with context.
    pub fn warn_with(&self, message: impl AsRef<str>, context: Vec<ContextValue>) {
        self.log(Level::Warn, message, context);
    }

    /// Log at info level.
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message, Vec::new());
    }

    /// Log at info level with context.
    pub fn info_with(&self, message: impl AsRef<str>, context: Vec<ContextValue>) {
        self.log(Level::Info, message, context);
    }

    /// Log at debug level.
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::Debug, message, Vec::new());
    }

    /// Log at debug level with context.
    pub fn debug_with(&self, message: impl AsRef<str>, context: Vec<ContextValue>) {
        self.log(Level::Debug, message, context);
    }

    /// Dump values at debug level, tagged with the caller location.
    #[track_caller]
    pub fn inspect(&self, values: Vec<ContextValue>) {
        let caller = Location::caller();
        self.log(
            Level::Debug,
            format!("inspect at {}:{}", caller.file(), caller.line()),
            values,
        );
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct PanicReport {
    message: String,
    name: &'static str,
    location: Option<String>,
    stack: String,
}

/// Log panics through `root` as `UncaughtException`, then run the previous hook.
///
/// The panic hook is process-global: the one installed here stays chained
/// for the life of the process and keeps `root` alive. `active` switches the
/// logging on and off without touching the chain, so a context can be reset
/// and re-initialised with a different `skipUncaughtException`.
/// The panic itself carries on unchanged.
pub fn install_panic_hook(root: Logger, active: Arc<AtomicBool>) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if active.load(Ordering::Acquire) {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            let report = PanicReport {
                message,
                name: "panic",
                location: info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
                stack: Backtrace::force_capture().to_string(),
            };
            root.error_with("UncaughtException", vec![ContextValue::serialize(&report)]);
        }
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::debug_channel::DebugChannel;
    use crate::infrastructure::logging::sinks::SharedBuffer;
    use serde_json::json;
    use std::io;

    fn root_with_raw(raw: &SharedBuffer) -> Logger {
        Logger::root(
            "app",
            Arc::new(LogHub::new(Box::new(raw.clone()), DebugChannel::disabled())),
        )
    }

    #[test]
    fn test_child_namespaces() {
        let root = Logger::root(
            "app",
            Arc::new(LogHub::new(Box::new(io::sink()), DebugChannel::disabled())),
        );
        let db = root.get_logger("db");
        let pool = db.get_logger("pool");

        assert_eq!(root.namespace(), "app");
        assert_eq!(db.namespace(), "app:db");
        assert_eq!(pool.namespace(), "app:db:pool");
        assert_eq!(pool.name(), "pool");
    }

    #[test]
    fn test_context_list_rendering() {
        let raw = SharedBuffer::new();
        let logger = root_with_raw(&raw).get_logger("http");

        logger.warn("slow");
        logger.info_with("one", vec![json!({"ms": 5}).into()]);
        logger.error_with("two", vec!["a".into(), json!(2).into()]);

        assert_eq!(
            raw.contents(),
            "Logger not initialized: warn [app:http] slow\n\
             Logger not initialized: info [app:http] one {\"ms\":5}\n\
             Logger not initialized: error [app:http] two [\"a\",2]\n"
        );
    }

    #[test]
    fn test_inspect_uses_debug_channel() {
        let debug = SharedBuffer::new();
        let raw = SharedBuffer::new();
        let root = Logger::root(
            "app",
            Arc::new(LogHub::new(
                Box::new(raw.clone()),
                DebugChannel::new("app", Box::new(debug.clone())),
            )),
        );

        root.inspect(vec![json!({"k": "v"}).into()]);

        assert!(raw.contents().is_empty());
        let output = debug.contents();
        assert!(output.contains("app inspect at "));
        assert!(output.contains("logger.rs"));
        assert!(output.contains("{\"k\":\"v\"}"));
    }

    #[test]
    fn test_panic_hook_logs_and_unwinds() {
        let raw = SharedBuffer::new();
        let active = Arc::new(AtomicBool::new(true));
        install_panic_hook(root_with_raw(&raw), Arc::clone(&active));

        let result = panic::catch_unwind(|| panic!("boom in worker"));

        assert!(result.is_err());
        let output = raw.contents();
        assert!(output.contains("error [app] UncaughtException"));
        assert!(output.contains("\"message\":\"boom in worker\""));
        assert!(output.contains("\"name\":\"panic\""));

        active.store(false, Ordering::Release);
        let before = raw.contents();
        let result = panic::catch_unwind(|| panic!("boom while inactive"));
        assert!(result.is_err());
        assert_eq!(raw.contents(), before);
    }
}
