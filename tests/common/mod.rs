//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

use async_trait::async_trait;
use boiler::infrastructure::logging::SharedBuffer;
use boiler::{Boiler, InitOptions, Level, LogMeta};
use parking_lot::Mutex;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write `contents` to `<dir>/<name>`.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("Failed to write fixture");
}

/// Boiler whose raw output is captured and whose debug channel is off.
#[allow(dead_code)]
pub fn quiet_boiler(raw: &SharedBuffer) -> Boiler {
    Boiler::builder("itest")
        .raw_writer(Box::new(raw.clone()))
        .debug_selector("")
        .build()
}

/// Options rooted at `dir` with an environment prefix nothing sets.
#[allow(dead_code)]
pub fn options_in(dir: &Path) -> InitOptions {
    InitOptions::new()
        .with_base_config_dir(dir)
        .with_base_files_dir(dir)
        .with_env_prefix("BOILER_ITEST_NOTHING_")
}

/// One call received by [`RecordingSink`].
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub level: Level,
    pub key: String,
    pub text: String,
    pub meta: Option<Value>,
}

/// Custom sink keeping every call in memory.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSink {
    pub settings: Mutex<Option<Value>>,
    pub calls: Mutex<Vec<RecordedCall>>,
}

#[async_trait]
impl boiler::CustomSink for RecordingSink {
    async fn init(&self, settings: Value) -> anyhow::Result<()> {
        *self.settings.lock() = Some(settings);
        Ok(())
    }

    fn log(&self, level: Level, key: &str, text: &str, meta: Option<&LogMeta>) {
        self.calls.lock().push(RecordedCall {
            level,
            key: key.to_string(),
            text: text.to_string(),
            meta: meta.map(LogMeta::to_json),
        });
    }
}
