//! Configuration management infrastructure
//!
//! - YAML / JSON file loading
//! - Environment variable layer (figment)
//! - Descriptor resolution (files, modules, remote URLs, plugins)

pub mod loader;
pub mod resolver;

pub use loader::{ConfigLoader, FileFormat};
pub use resolver::{Resolution, SourceResolver, DEFAULT_REMOTE_TIMEOUT};
