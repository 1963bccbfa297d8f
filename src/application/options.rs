//! Options accepted by the bootstrap.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::models::ConfigDescriptor;
use crate::domain::ports::CustomSink;
use crate::infrastructure::config::DEFAULT_REMOTE_TIMEOUT;
use crate::infrastructure::logging::CustomSinkRegistry;

/// Directory holding `default-config.*` and `<profile>-config.*`.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Options for [`Boiler::init`](super::Boiler::init).
///
/// ```
/// use boiler::application::InitOptions;
/// use boiler::domain::models::ConfigDescriptor;
/// use serde_json::json;
///
/// let options = InitOptions::new()
///     .with_base_config_dir("settings")
///     .with_profile("staging")
///     .with_extra(ConfigDescriptor::data("overrides", json!({"port": 8080})));
/// assert_eq!(options.extra_configs.len(), 1);
/// ```
#[derive(Clone)]
pub struct InitOptions {
    /// Directory holding `default-config.*` and `<profile>-config.*`
    pub base_config_dir: PathBuf,
    /// Root for `file://` remote URLs
    pub base_files_dir: PathBuf,
    /// Prefix of the environment layer; derived from the application name when unset
    pub env_prefix: Option<String>,
    /// Loads `<profile>-config.*` above the default file
    pub profile: Option<String>,
    /// Sources ranked below the environment, first one highest
    pub extra_configs: Vec<ConfigDescriptor>,
    /// Custom sinks selectable through `logs.custom.path`
    pub custom_sinks: CustomSinkRegistry,
    /// Upper bound on each remote fetch
    pub remote_timeout: Duration,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            base_config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            base_files_dir: PathBuf::from("."),
            env_prefix: None,
            profile: None,
            extra_configs: Vec::new(),
            custom_sinks: CustomSinkRegistry::new(),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

impl InitOptions {
    /// Options with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory searched for the default and profile files.
    #[must_use]
    pub fn with_base_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_config_dir = dir.into();
        self
    }

    /// Root for `file://` URLs.
    #[must_use]
    pub fn with_base_files_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_files_dir = dir.into();
        self
    }

    /// Prefix of the environment layer, e.g. `APP_`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Load `<profile>-config.*` above the default file.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Append a source, ranked below every source added before it.
    #[must_use]
    pub fn with_extra(mut self, descriptor: ConfigDescriptor) -> Self {
        self.extra_configs.push(descriptor);
        self
    }

    /// Make a custom sink selectable through `logs.custom.path`.
    #[must_use]
    pub fn with_custom_sink(mut self, name: impl Into<String>, sink: Arc<dyn CustomSink>) -> Self {
        self.custom_sinks.insert(name.into(), sink);
        self
    }

    /// Bound each remote fetch; a timeout fails with `RemoteFetch`.
    #[must_use]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }
}

impl fmt::Debug for InitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitOptions")
            .field("base_config_dir", &self.base_config_dir)
            .field("base_files_dir", &self.base_files_dir)
            .field("env_prefix", &self.env_prefix)
            .field("profile", &self.profile)
            .field("extra_configs", &self.extra_configs)
            .field("custom_sinks", &self.custom_sinks.keys().collect::<Vec<_>>())
            .field("remote_timeout", &self.remote_timeout)
            .finish()
    }
}

/// `my-app` -> `MY_APP_`
pub fn default_env_prefix(app_name: &str) -> String {
    let mut prefix: String = app_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    prefix.push('_');
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = InitOptions::default();
        assert_eq!(options.base_config_dir, PathBuf::from("config"));
        assert_eq!(options.remote_timeout, Duration::from_secs(30));
        assert!(options.profile.is_none());
        assert!(options.custom_sinks.is_empty());
    }

    #[test]
    fn test_default_env_prefix() {
        assert_eq!(default_env_prefix("my-app"), "MY_APP_");
        assert_eq!(default_env_prefix("svc2"), "SVC2_");
    }
}
