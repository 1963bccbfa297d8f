//! Resolves one configuration descriptor into a scoped value tree.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::errors::{ConfigError, ConfigResult};
use crate::domain::models::key_path;
use crate::domain::models::{AsyncFileSource, ConfigDescriptor, ConfigStore, FileSource};
use crate::infrastructure::config::loader::ConfigLoader;

/// Default bound on a single remote fetch.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of resolving one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Tree to place in the descriptor's scope slot.
    Scope(Value),
    /// A plugin ran; it reported this name.
    Plugin(String),
}

/// Turns descriptors into value trees.
///
/// Resolution has no side effect on the store except through plugins.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    base_config_dir: PathBuf,
    base_files_dir: PathBuf,
    remote_timeout: Duration,
    http: reqwest::Client,
}

impl SourceResolver {
    /// Resolver with the default remote timeout.
    pub fn new(base_config_dir: impl Into<PathBuf>, base_files_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_config_dir: base_config_dir.into(),
            base_files_dir: base_files_dir.into(),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            http: reqwest::Client::new(),
        }
    }

    /// Bound each remote fetch.
    #[must_use]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Resolve one descriptor. Plugins run here against `store`.
    ///
    /// # Errors
    /// `SourceLoad`, `RemoteFetch`, `MissingDependency` or `Plugin`, by descriptor kind.
    pub async fn resolve(&self, descriptor: &ConfigDescriptor, store: &ConfigStore) -> ConfigResult<Resolution> {
        debug!(
            kind = descriptor.kind(),
            scope = descriptor.scope().unwrap_or("-"),
            origin = %descriptor.origin(),
            "resolving configuration source"
        );

        match descriptor {
            ConfigDescriptor::File { scope, key, source } => {
                let tree = match source {
                    FileSource::Path(path) => {
                        let path = self.config_path(path);
                        ConfigLoader::load_file(&path).map_err(|e| source_load(scope, &path.display().to_string(), &e))?
                    }
                    FileSource::Module(module) => module.build().map_err(|e| source_load(scope, "module", &e))?,
                };
                Ok(Resolution::Scope(key_path::nest(key.as_deref(), tree)))
            }
            ConfigDescriptor::FileAsync { scope, key, source } => {
                let tree = match source {
                    AsyncFileSource::Path(path) => {
                        let path = self.config_path(path);
                        ConfigLoader::load_file_async(&path)
                            .await
                            .map_err(|e| source_load(scope, &path.display().to_string(), &e))?
                    }
                    AsyncFileSource::Module(module) => module
                        .build()
                        .await
                        .map_err(|e| source_load(scope, "async module", &e))?,
                };
                Ok(Resolution::Scope(key_path::nest(key.as_deref(), tree)))
            }
            ConfigDescriptor::Data { key, data, .. } => {
                Ok(Resolution::Scope(key_path::nest(key.as_deref(), data.clone())))
            }
            ConfigDescriptor::RemoteUrl { scope, key, url } => {
                let tree = self.fetch(scope, url).await?;
                Ok(Resolution::Scope(key_path::nest(key.as_deref(), tree)))
            }
            ConfigDescriptor::RemoteUrlFromKey { scope, key, url_from_key } => {
                let url = store
                    .get(url_from_key)
                    .and_then(|value| value.as_str().map(str::to_string))
                    .ok_or_else(|| ConfigError::MissingDependency {
                        scope: scope.clone(),
                        key: url_from_key.clone(),
                    })?;
                let tree = self.fetch(scope, &url).await?;
                Ok(Resolution::Scope(key_path::nest(key.as_deref(), tree)))
            }
            ConfigDescriptor::Plugin(plugin) => plugin
                .load(store)
                .map(Resolution::Plugin)
                .map_err(|e| ConfigError::Plugin { reason: format!("{e:#}") }),
            ConfigDescriptor::AsyncPlugin(plugin) => plugin
                .load(store)
                .await
                .map(Resolution::Plugin)
                .map_err(|e| ConfigError::Plugin { reason: format!("{e:#}") }),
        }
    }

    /// Fetch and parse a remote fragment. `file://` URLs are read from disk
    /// relative to the base files directory.
    async fn fetch(&self, scope: &str, url: &str) -> ConfigResult<Value> {
        let remote_fetch = |reason: String| ConfigError::RemoteFetch {
            scope: scope.to_string(),
            url: url.to_string(),
            reason,
        };

        let body = if let Some(relative) = url.strip_prefix("file://") {
            let path = resolve_against(&self.base_files_dir, Path::new(relative));
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| remote_fetch(format!("{}: {e}", path.display())))?
        } else {
            let response = self
                .http
                .get(url)
                .timeout(self.remote_timeout)
                .send()
                .await
                .map_err(|e| remote_fetch(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                warn!(scope, url, status = status.as_u16(), "remote configuration fetch rejected");
                return Err(remote_fetch(format!("HTTP {status}")));
            }
            response.text().await.map_err(|e| remote_fetch(e.to_string()))?
        };

        ConfigLoader::parse_remote_body(&body).map_err(|e| remote_fetch(format!("{e:#}")))
    }

    fn config_path(&self, path: &Path) -> PathBuf {
        resolve_against(&self.base_config_dir, path)
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn source_load(scope: &str, origin: &str, err: &anyhow::Error) -> ConfigError {
    ConfigError::SourceLoad {
        scope: scope.to_string(),
        origin: origin.to_string(),
        reason: format!("{err:#}"),
    }
}
