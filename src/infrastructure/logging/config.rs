//! Settings read from the `logs` key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logging configuration read from the `logs` key of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogsConfig {
    /// `logs.console`
    #[serde(default)]
    pub console: ConsoleConfig,

    /// `logs.file`
    #[serde(default)]
    pub file: FileConfig,

    /// `logs.custom`
    #[serde(default)]
    pub custom: CustomConfig,

    /// Leave panics alone instead of logging them through the root logger.
    #[serde(default)]
    pub skip_uncaught_exception: bool,
}

/// Console sink settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Console output is silent unless active
    #[serde(default)]
    pub active: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line layout
    #[serde(default)]
    pub format: ConsoleFormat,
}

/// Console line layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleFormat {
    /// Colour the level tag
    #[serde(default = "default_true")]
    pub color: bool,

    /// Prefix lines with `YYYY-MM-DD HH:MM:SS`
    #[serde(default = "default_true")]
    pub time: bool,

    /// Tab-align the message column
    #[serde(default)]
    pub align: bool,
}

/// JSON-lines file sink settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    /// File output is off unless active
    #[serde(default)]
    pub active: bool,

    /// Log file path; parent directories are created
    #[serde(default = "default_file_path")]
    pub path: String,

    /// Minimum level written
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Daily rotation, overrides size rotation when active
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Size threshold for non-dated rotation
    #[serde(default)]
    pub max_file_bytes: Option<u64>,

    /// Files kept by non-dated rotation, the active one included
    #[serde(default)]
    pub max_nb_files: Option<usize>,
}

/// Dated rotation settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RotationConfig {
    /// Rotate daily into `<path>.YYYY-MM-DD`
    #[serde(default)]
    pub is_active: bool,

    /// Dated files to retain, unbounded when unset
    #[serde(default)]
    pub days: Option<usize>,
}

/// Custom sink selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomConfig {
    /// Custom sink is off unless active
    #[serde(default)]
    pub active: bool,

    /// Name the custom sink was registered under
    #[serde(default)]
    pub path: Option<String>,

    /// Passed to the sink's `init`
    #[serde(default)]
    pub settings: Value,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            active: false,
            level: default_log_level(),
            format: ConsoleFormat::default(),
        }
    }
}

impl Default for ConsoleFormat {
    fn default() -> Self {
        Self {
            color: true,
            time: true,
            align: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            active: false,
            path: default_file_path(),
            level: default_log_level(),
            rotation: RotationConfig::default(),
            max_file_bytes: None,
            max_nb_files: None,
        }
    }
}

/// Default size threshold before a plain log file rotates (10 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of plain log files kept.
pub const DEFAULT_MAX_NB_FILES: usize = 14;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_path() -> String {
    "application.log".to_string()
}

const fn default_true() -> bool {
    true
}
