//! Configuration capabilities registered by value.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::models::ConfigStore;

/// Executable configuration module evaluated synchronously.
///
/// Registered by value in a `File` descriptor instead of being looked up on
/// disk at runtime.
pub trait ConfigModule: Send + Sync {
    /// Produce the configuration fragment.
    fn build(&self) -> anyhow::Result<Value>;
}

/// Configuration module whose fragment is produced by an awaited factory.
#[async_trait]
pub trait AsyncConfigModule: Send + Sync {
    /// Produce the configuration fragment.
    async fn build(&self) -> anyhow::Result<Value>;
}

/// Plugin given the live store during bootstrap.
///
/// Plugins write through [`ConfigStore::set`] and return an identifying name.
pub trait ConfigPlugin: Send + Sync {
    /// Apply the plugin and return its name.
    fn load(&self, store: &ConfigStore) -> anyhow::Result<String>;
}

/// Asynchronous variant of [`ConfigPlugin`].
#[async_trait]
pub trait AsyncConfigPlugin: Send + Sync {
    /// Apply the plugin and return its name.
    async fn load(&self, store: &ConfigStore) -> anyhow::Result<String>;
}

impl<F> ConfigModule for F
where
    F: Fn() -> anyhow::Result<Value> + Send + Sync,
{
    fn build(&self) -> anyhow::Result<Value> {
        self()
    }
}
