//! Infrastructure layer module
//!
//! - Configuration loading and descriptor resolution
//! - Logging sinks, rotation and redaction
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
