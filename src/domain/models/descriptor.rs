//! Configuration source descriptors.

use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::ports::{AsyncConfigModule, AsyncConfigPlugin, ConfigModule, ConfigPlugin};

/// Where a synchronous `File` descriptor gets its fragment.
#[derive(Clone)]
pub enum FileSource {
    /// Structured data file; format chosen by extension (`yml`, `yaml`, `json`).
    Path(PathBuf),
    /// Executable configuration module registered by value.
    Module(Arc<dyn ConfigModule>),
}

/// Where a `FileAsync` descriptor gets its fragment.
#[derive(Clone)]
pub enum AsyncFileSource {
    /// Structured data file read with async I/O.
    Path(PathBuf),
    /// Awaited configuration factory.
    Module(Arc<dyn AsyncConfigModule>),
}

/// Declarative record describing one configuration source.
///
/// Data-bearing kinds occupy one scope slot; plugins write through
/// `ConfigStore::set` and occupy none.
#[derive(Clone)]
pub enum ConfigDescriptor {
    /// Structured file or registered module.
    File {
        scope: String,
        key: Option<String>,
        source: FileSource,
    },
    /// Like `File`, read or built asynchronously.
    FileAsync {
        scope: String,
        key: Option<String>,
        source: AsyncFileSource,
    },
    /// Inline value tree.
    Data {
        scope: String,
        key: Option<String>,
        data: Value,
    },
    /// JSON or YAML fetched over HTTP(S) or from `file://`.
    RemoteUrl {
        scope: String,
        key: Option<String>,
        url: String,
    },
    /// Remote source whose URL is read from an earlier layer.
    RemoteUrlFromKey {
        scope: String,
        key: Option<String>,
        url_from_key: String,
    },
    /// Synchronous plugin.
    Plugin(Arc<dyn ConfigPlugin>),
    /// Asynchronous plugin.
    AsyncPlugin(Arc<dyn AsyncConfigPlugin>),
}

impl ConfigDescriptor {
    /// Data file, relative to the base config dir unless absolute.
    pub fn file(scope: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            scope: scope.into(),
            key: None,
            source: FileSource::Path(path.into()),
        }
    }

    /// Registered synchronous module.
    pub fn module(scope: impl Into<String>, module: impl ConfigModule + 'static) -> Self {
        Self::File {
            scope: scope.into(),
            key: None,
            source: FileSource::Module(Arc::new(module)),
        }
    }

    /// Data file read with async I/O.
    pub fn file_async(scope: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::FileAsync {
            scope: scope.into(),
            key: None,
            source: AsyncFileSource::Path(path.into()),
        }
    }

    /// Registered async module.
    pub fn async_module(scope: impl Into<String>, module: impl AsyncConfigModule + 'static) -> Self {
        Self::FileAsync {
            scope: scope.into(),
            key: None,
            source: AsyncFileSource::Module(Arc::new(module)),
        }
    }

    /// Inline tree.
    pub fn data(scope: impl Into<String>, data: Value) -> Self {
        Self::Data {
            scope: scope.into(),
            key: None,
            data,
        }
    }

    /// Fetch `url`; `file://` reads relative to the base files dir.
    pub fn remote_url(scope: impl Into<String>, url: impl Into<String>) -> Self {
        Self::RemoteUrl {
            scope: scope.into(),
            key: None,
            url: url.into(),
        }
    }

    /// Fetch the URL found at `url_from_key`.
    pub fn remote_url_from_key(scope: impl Into<String>, url_from_key: impl Into<String>) -> Self {
        Self::RemoteUrlFromKey {
            scope: scope.into(),
            key: None,
            url_from_key: url_from_key.into(),
        }
    }

    /// Run `plugin` against the live store.
    pub fn plugin(plugin: impl ConfigPlugin + 'static) -> Self {
        Self::Plugin(Arc::new(plugin))
    }

    /// Await `plugin` against the live store.
    pub fn async_plugin(plugin: impl AsyncConfigPlugin + 'static) -> Self {
        Self::AsyncPlugin(Arc::new(plugin))
    }

    /// Place the resolved fragment under `key` instead of at the root.
    ///
    /// No effect on plugin descriptors.
    #[must_use]
    pub fn under_key(mut self, target: impl Into<String>) -> Self {
        match &mut self {
            Self::File { key, .. }
            | Self::FileAsync { key, .. }
            | Self::Data { key, .. }
            | Self::RemoteUrl { key, .. }
            | Self::RemoteUrlFromKey { key, .. } => *key = Some(target.into()),
            Self::Plugin(_) | Self::AsyncPlugin(_) => {}
        }
        self
    }

    /// Scope label, `None` for plugins.
    pub fn scope(&self) -> Option<&str> {
        match self {
            Self::File { scope, .. }
            | Self::FileAsync { scope, .. }
            | Self::Data { scope, .. }
            | Self::RemoteUrl { scope, .. }
            | Self::RemoteUrlFromKey { scope, .. } => Some(scope.as_str()),
            Self::Plugin(_) | Self::AsyncPlugin(_) => None,
        }
    }

    /// Key the fragment is nested under, if any.
    pub fn target_key(&self) -> Option<&str> {
        match self {
            Self::File { key, .. }
            | Self::FileAsync { key, .. }
            | Self::Data { key, .. }
            | Self::RemoteUrl { key, .. }
            | Self::RemoteUrlFromKey { key, .. } => key.as_deref(),
            Self::Plugin(_) | Self::AsyncPlugin(_) => None,
        }
    }

    /// Kind name used in logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::FileAsync { .. } => "file_async",
            Self::Data { .. } => "data",
            Self::RemoteUrl { .. } => "remote_url",
            Self::RemoteUrlFromKey { .. } => "remote_url_from_key",
            Self::Plugin(_) => "plugin",
            Self::AsyncPlugin(_) => "async_plugin",
        }
    }

    /// Human description of the origin, stored as the scope's `info`.
    pub fn origin(&self) -> String {
        match self {
            Self::File { source: FileSource::Path(path), .. }
            | Self::FileAsync { source: AsyncFileSource::Path(path), .. } => path.display().to_string(),
            Self::File { source: FileSource::Module(_), .. } => "module".to_string(),
            Self::FileAsync { source: AsyncFileSource::Module(_), .. } => "async module".to_string(),
            Self::Data { .. } => "data".to_string(),
            Self::RemoteUrl { url, .. } => url.clone(),
            Self::RemoteUrlFromKey { url_from_key, .. } => format!("url from key '{url_from_key}'"),
            Self::Plugin(_) | Self::AsyncPlugin(_) => self.kind().to_string(),
        }
    }
}

impl fmt::Debug for ConfigDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDescriptor")
            .field("kind", &self.kind())
            .field("scope", &self.scope())
            .field("key", &self.target_key())
            .field("origin", &self.origin())
            .finish()
    }
}
