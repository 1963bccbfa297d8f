//! Logging infrastructure
//!
//! - Hierarchical loggers over a shared hub
//! - Raw pre-ready output, structured sinks once wired
//! - Console, JSON-lines file (size or daily rotation) and custom sinks
//! - Secret scrubbing on every call
//! - Namespace-filtered debug channel

pub mod config;
pub mod debug_channel;
pub mod hub;
pub mod logger;
pub mod rotation;
pub mod secret_scrubbing;
pub mod sinks;

pub use config::{ConsoleConfig, ConsoleFormat, CustomConfig, FileConfig, LogsConfig, RotationConfig};
pub use debug_channel::{DebugChannel, DEFAULT_DEBUG_VAR};
pub use hub::{CustomSinkRegistry, LogHub};
pub use logger::{install_panic_hook, Logger};
pub use secret_scrubbing::RedactionFilter;
pub use sinks::{BoxedWriter, ConsoleSink, FileSink, SharedBuffer};
