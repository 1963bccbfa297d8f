//! Boiler - layered configuration bootstrap
//!
//! Boiler assembles an application's configuration from ordered sources
//! (environment, files, in-memory data, remote URLs, plugins) into one
//! precedence-aware store, and gates a hierarchical logger on its readiness.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): store, descriptors, log records, capability ports
//! - **Application Layer** (`application`): bootstrap lifecycle
//! - **Infrastructure Layer** (`infrastructure`): file/env/remote loading, log sinks
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use boiler::{Boiler, ConfigDescriptor, InitOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let boiler = Boiler::new("my-app");
//!     let store = boiler
//!         .init(InitOptions::new().with_extra(ConfigDescriptor::data("overrides", json!({"port": 8080}))))
//!         .await?;
//!
//!     boiler.get_logger(Some("http")).info(format!("listening on {}", store.get("port").unwrap_or_default()));
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use application::{Boiler, BoilerBuilder, InitOptions};
pub use domain::errors::{ConfigError, ConfigResult, LoggerError};
pub use domain::models::{
    BootstrapState, ConfigDescriptor, ConfigStore, ContextValue, Level, LogMeta, Precedence, ScopeAndValue,
};
pub use domain::ports::{AsyncConfigModule, AsyncConfigPlugin, ConfigModule, ConfigPlugin, CustomSink, LogSink};
pub use infrastructure::logging::{Logger, LogsConfig, RedactionFilter};
