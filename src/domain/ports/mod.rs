//! Port trait definitions (Hexagonal Architecture)
//!
//! Capabilities registered by value at startup:
//! - `ConfigModule` / `AsyncConfigModule`: executable configuration fragments
//! - `ConfigPlugin` / `AsyncConfigPlugin`: code run against the live store
//! - `LogSink`: built-in structured log destinations
//! - `CustomSink`: externally supplied log destination

pub mod config_source;
pub mod sink;

pub use config_source::{AsyncConfigModule, AsyncConfigPlugin, ConfigModule, ConfigPlugin};
pub use sink::{CustomSink, LogSink};
