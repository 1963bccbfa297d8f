//! Structured file parsing, the environment layer and built-in defaults.

use anyhow::{bail, Context, Result};
use figment::providers::Env;
use figment::Figment;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::infrastructure::logging::LogsConfig;

/// Structured data formats accepted for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.yml` / `.yaml`
    Yaml,
    /// `.json`
    Json,
}

impl FileFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Extensions probed, in order, when looking for `<stem>-config.*`.
const CONFIG_EXTENSIONS: [&str; 3] = ["yml", "yaml", "json"];

/// Configuration file and environment loading
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse configuration text in the given format.
    ///
    /// An empty document yields an empty object.
    pub fn parse_str(text: &str, format: FileFormat) -> Result<Value> {
        let value: Value = match format {
            FileFormat::Yaml => serde_yaml::from_str(text).context("invalid YAML")?,
            FileFormat::Json => serde_json::from_str(text).context("invalid JSON")?,
        };
        Ok(if value.is_null() { json!({}) } else { value })
    }

    /// Parse a fetched body: JSON first, then YAML.
    pub fn parse_remote_body(body: &str) -> Result<Value> {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return Ok(value);
        }
        Self::parse_str(body, FileFormat::Yaml).context("body is neither JSON nor YAML")
    }

    /// Load a configuration file synchronously.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let format = Self::format_of(path)?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::parse_str(&text, format)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load a configuration file with async I/O.
    pub async fn load_file_async(path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let format = Self::format_of(path)?;
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::parse_str(&text, format)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Collect `<prefix>*` environment variables into a tree.
    ///
    /// `__` nests: `APP_LOGS__CONSOLE__LEVEL=debug` becomes
    /// `{"logs": {"console": {"level": "debug"}}}`.
    pub fn load_env(prefix: &str) -> Result<Value> {
        Figment::from(Env::prefixed(prefix).split("__"))
            .extract::<Value>()
            .context("Failed to extract environment configuration from figment")
    }

    /// Find `<dir>/<stem>-config.{yml,yaml,json}`.
    pub fn find_config_file(dir: &Path, stem: &str) -> Option<PathBuf> {
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{stem}-config.{ext}")))
            .find(|candidate| candidate.is_file())
    }

    /// Built-in lowest-precedence layer.
    pub fn builtin_defaults() -> Value {
        json!({ "logs": LogsConfig::default() })
    }

    fn format_of(path: &Path) -> Result<FileFormat> {
        match FileFormat::from_path(path) {
            Some(format) => Ok(format),
            None => bail!("Unsupported config file format: {}", path.display()),
        }
    }
}
