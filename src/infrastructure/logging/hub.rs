//! Shared dispatch point behind every [`Logger`](super::Logger).
//!
//! Before wiring, calls go to a raw writer as unformatted lines. After
//! [`LogHub::init_with_config`] they are redacted and fanned out to the
//! console, file and custom sinks. `debug` calls also reach the debug
//! channel, wired or not.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::LogsConfig;
use super::debug_channel::DebugChannel;
use super::secret_scrubbing::RedactionFilter;
use super::sinks::{BoxedWriter, ConsoleSink, FileSink};
use crate::domain::errors::LoggerError;
use crate::domain::models::{ConfigStore, ContextValue, Level, LogMeta, LogRecord};
use crate::domain::ports::{CustomSink, LogSink};

/// Custom sinks registered by name; `logs.custom.path` selects one.
pub type CustomSinkRegistry = HashMap<String, Arc<dyn CustomSink>>;

#[derive(Default)]
struct Wiring {
    sinks: Vec<Box<dyn LogSink>>,
    custom: Option<Arc<dyn CustomSink>>,
}

/// Dispatch point shared by every logger of one context.
pub struct LogHub {
    raw: Mutex<BoxedWriter>,
    console_writer: Mutex<Option<BoxedWriter>>,
    debug_channel: DebugChannel,
    redaction: RedactionFilter,
    /// Set by the first `init_with_config` call, successful or not
    claimed: AtomicBool,
    /// Set once the sinks are in place
    wired: AtomicBool,
    wiring: RwLock<Wiring>,
}

impl LogHub {
    /// Unwired hub writing pre-ready lines to `raw`.
    pub fn new(raw: BoxedWriter, debug_channel: DebugChannel) -> Self {
        Self {
            raw: Mutex::new(raw),
            console_writer: Mutex::new(None),
            debug_channel,
            redaction: RedactionFilter::new(),
            claimed: AtomicBool::new(false),
            wired: AtomicBool::new(false),
            wiring: RwLock::new(Wiring::default()),
        }
    }

    /// Send console sink output somewhere other than stdout.
    #[must_use]
    pub fn with_console_writer(self, writer: BoxedWriter) -> Self {
        *self.console_writer.lock() = Some(writer);
        self
    }

    /// Whether the sinks are in place.
    pub fn is_wired(&self) -> bool {
        self.wired.load(Ordering::Acquire)
    }

    /// Redact one call and route it to the debug channel and the raw writer or sinks.
    pub fn dispatch(&self, level: Level, namespace: &str, message: &str, context: Vec<ContextValue>) {
        let message = self.redaction.scrub_message(message);
        let meta = LogMeta::from_context(context).map(|meta| self.redaction.scrub_meta(&meta));

        if level == Level::Debug {
            let meta_text = meta.as_ref().map(|m| m.to_json().to_string()).unwrap_or_default();
            self.debug_channel.emit(namespace, &message, &meta_text);
        }

        if !self.is_wired() {
            if level != Level::Debug {
                self.write_raw(level, namespace, &message, meta.as_ref());
            }
            return;
        }

        let record = LogRecord {
            timestamp: Utc::now(),
            level,
            namespace: namespace.to_string(),
            message,
            meta,
        };

        let wiring = self.wiring.read();
        for sink in wiring.sinks.iter().filter(|sink| sink.accepts(level)) {
            if let Err(e) = sink.write(&record) {
                warn!(sink = sink.name(), error = %e, "log sink write failed");
            }
        }
        if let Some(custom) = &wiring.custom {
            custom.log(level, &record.namespace, &record.message, record.meta.as_ref());
        }
    }

    fn write_raw(&self, level: Level, namespace: &str, message: &str, meta: Option<&LogMeta>) {
        let mut line = format!("Logger not initialized: {level} [{namespace}] {message}");
        if let Some(meta) = meta {
            line.push(' ');
            line.push_str(&meta.to_json().to_string());
        }
        let mut raw = self.raw.lock();
        if let Err(e) = writeln!(raw, "{line}").and_then(|()| raw.flush()) {
            warn!(error = %e, "raw log write failed");
        }
    }

    /// Wire the sinks from the `logs` key of `store`. Runs once.
    ///
    /// `console_override` forces the console sink active at that level.
    ///
    /// # Errors
    /// - `AlreadyInitialized` on any call after the first
    /// - `InvalidLevel` / `SinkSetup` for bad `logs` settings or an unopenable file
    /// - `UnknownCustomSink` / `CustomSinkInit` for the custom sink
    pub async fn init_with_config(
        &self,
        store: &ConfigStore,
        custom_sinks: &CustomSinkRegistry,
        console_override: Option<&str>,
    ) -> Result<LogsConfig, LoggerError> {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LoggerError::AlreadyInitialized);
        }

        let mut config: LogsConfig = store
            .get("logs")
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| LoggerError::SinkSetup(format!("invalid logs configuration: {e}")))?
            .unwrap_or_default();

        if let Some(level) = console_override {
            config.console.active = true;
            config.console.level = level.to_string();
        }

        let mut sinks: Vec<Box<dyn LogSink>> = Vec::new();
        if config.console.active {
            let level = config.console.level.parse()?;
            let sink = match self.console_writer.lock().take() {
                Some(writer) => ConsoleSink::new(level, config.console.format, writer),
                None => ConsoleSink::stdout(level, config.console.format),
            };
            sinks.push(Box::new(sink));
        }
        if config.file.active {
            sinks.push(Box::new(FileSink::from_config(&config.file)?));
        }

        let custom = if config.custom.active {
            let name = config.custom.path.clone().unwrap_or_default();
            let sink = custom_sinks
                .get(&name)
                .cloned()
                .ok_or(LoggerError::UnknownCustomSink(name))?;
            sink.init(config.custom.settings.clone())
                .await
                .map_err(|e| LoggerError::CustomSinkInit(format!("{e:#}")))?;
            Some(sink)
        } else {
            None
        };

        info!(
            console = config.console.active,
            file = config.file.active,
            custom = custom.is_some(),
            "log sinks wired"
        );

        *self.wiring.write() = Wiring { sinks, custom };
        self.wired.store(true, Ordering::Release);
        Ok(config)
    }

    /// Drop every sink and fall back to raw output.
    pub fn reset(&self) {
        *self.wiring.write() = Wiring::default();
        self.wired.store(false, Ordering::Release);
        self.claimed.store(false, Ordering::Release);
        debug!("log sinks reset");
    }
}

impl std::fmt::Debug for LogHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wiring = self.wiring.read();
        f.debug_struct("LogHub")
            .field("wired", &self.is_wired())
            .field("sinks", &wiring.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("custom", &wiring.custom.is_some())
            .field("debug_channel", &self.debug_channel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::sinks::SharedBuffer;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::io;

    #[derive(Default)]
    struct RecordingSink {
        settings: Mutex<Option<Value>>,
        calls: Mutex<Vec<(Level, String, String, Option<Value>)>>,
    }

    #[async_trait]
    impl CustomSink for RecordingSink {
        async fn init(&self, settings: Value) -> anyhow::Result<()> {
            *self.settings.lock() = Some(settings);
            Ok(())
        }

        fn log(&self, level: Level, key: &str, text: &str, meta: Option<&LogMeta>) {
            self.calls
                .lock()
                .push((level, key.to_string(), text.to_string(), meta.map(LogMeta::to_json)));
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl CustomSink for BrokenSink {
        async fn init(&self, _settings: Value) -> anyhow::Result<()> {
            anyhow::bail!("collector unreachable")
        }

        fn log(&self, _level: Level, _key: &str, _text: &str, _meta: Option<&LogMeta>) {}
    }

    fn hub(raw: &SharedBuffer, debug: &SharedBuffer, selector: &str) -> LogHub {
        LogHub::new(
            Box::new(raw.clone()),
            DebugChannel::new(selector, Box::new(debug.clone())),
        )
    }

    #[test]
    fn test_pre_ready_writes_raw_lines() {
        let raw = SharedBuffer::new();
        let debug = SharedBuffer::new();
        let hub = hub(&raw, &debug, "app*");

        hub.dispatch(Level::Info, "app", "starting", vec![json!({"port": 80}).into()]);
        hub.dispatch(Level::Debug, "app:db", "pool ready", vec![]);

        assert_eq!(
            raw.contents(),
            "Logger not initialized: info [app] starting {\"port\":80}\n"
        );
        assert!(debug.contents().contains("app:db pool ready"));
    }

    #[test]
    fn test_debug_channel_output_is_redacted() {
        let raw = SharedBuffer::new();
        let debug = SharedBuffer::new();
        let hub = hub(&raw, &debug, "*");

        hub.dispatch(Level::Debug, "app", "GET ?auth=c42", vec![json!({"password": "p"}).into()]);

        let output = debug.contents();
        assert!(output.contains("auth=(hidden)"));
        assert!(output.contains("(hidden password)"));
        assert!(!output.contains("c42"));
    }

    #[tokio::test]
    async fn test_wired_hub_fans_out_to_sinks() {
        let raw = SharedBuffer::new();
        let console = SharedBuffer::new();
        let hub = hub(&raw, &SharedBuffer::new(), "").with_console_writer(Box::new(console.clone()));
        let store = ConfigStore::from_scopes([(
            "default",
            json!({"logs": {
                "console": {"active": true, "level": "info", "format": {"color": false, "time": false}},
                "custom": {"active": true, "path": "recorder", "settings": {"endpoint": "mem"}}
            }}),
        )]);
        let recorder = Arc::new(RecordingSink::default());
        let mut registry = CustomSinkRegistry::new();
        registry.insert("recorder".to_string(), recorder.clone());

        hub.init_with_config(&store, &registry, None).await.unwrap();
        assert!(hub.is_wired());
        assert_eq!(*recorder.settings.lock(), Some(json!({"endpoint": "mem"})));

        hub.dispatch(Level::Warn, "app:http", "token auth=cabc", vec![json!({"password": "p"}).into()]);
        hub.dispatch(Level::Debug, "app:http", "below console level", vec![]);

        assert!(raw.contents().is_empty());
        assert_eq!(
            console.contents(),
            "[warn]: [app:http] token auth=(hidden) {\"password\":\"(hidden password)\"}\n"
        );
        let calls = recorder.calls.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, "app:http");
        assert_eq!(calls[0].2, "token auth=(hidden)");
        assert_eq!(calls[0].3, Some(json!({"password": "(hidden password)"})));
        assert_eq!(calls[1].0, Level::Debug);
    }

    #[tokio::test]
    async fn test_second_init_fails() {
        let hub = LogHub::new(Box::new(io::sink()), DebugChannel::disabled());
        let store = ConfigStore::from_scopes([("default", json!({}))]);
        let registry = CustomSinkRegistry::new();

        hub.init_with_config(&store, &registry, None).await.unwrap();
        assert_eq!(
            hub.init_with_config(&store, &registry, None).await.unwrap_err(),
            LoggerError::AlreadyInitialized
        );

        hub.reset();
        assert!(!hub.is_wired());
        assert!(hub.init_with_config(&store, &registry, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_console_override_activates_console() {
        let console = SharedBuffer::new();
        let hub = LogHub::new(Box::new(io::sink()), DebugChannel::disabled())
            .with_console_writer(Box::new(console.clone()));
        let store = ConfigStore::from_scopes([(
            "default",
            json!({"logs": {"console": {"active": false, "format": {"color": false, "time": false}}}}),
        )]);

        let config = hub
            .init_with_config(&store, &CustomSinkRegistry::new(), Some("debug"))
            .await
            .unwrap();
        assert!(config.console.active);
        assert_eq!(config.console.level, "debug");

        hub.dispatch(Level::Debug, "app", "visible", vec![]);
        assert_eq!(console.contents(), "[debug]: [app] visible\n");
    }

    #[tokio::test]
    async fn test_unknown_custom_sink() {
        let hub = LogHub::new(Box::new(io::sink()), DebugChannel::disabled());
        let store = ConfigStore::from_scopes([(
            "default",
            json!({"logs": {"custom": {"active": true, "path": "missing"}}}),
        )]);

        let err = hub
            .init_with_config(&store, &CustomSinkRegistry::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err, LoggerError::UnknownCustomSink("missing".to_string()));
        assert!(!hub.is_wired());
    }

    #[tokio::test]
    async fn test_custom_sink_init_failure() {
        let hub = LogHub::new(Box::new(io::sink()), DebugChannel::disabled());
        let store = ConfigStore::from_scopes([(
            "default",
            json!({"logs": {"custom": {"active": true, "path": "broken"}}}),
        )]);
        let mut registry = CustomSinkRegistry::new();
        registry.insert("broken".to_string(), Arc::new(BrokenSink));

        let err = hub.init_with_config(&store, &registry, None).await.unwrap_err();
        assert_eq!(err, LoggerError::CustomSinkInit("collector unreachable".to_string()));
    }
}
