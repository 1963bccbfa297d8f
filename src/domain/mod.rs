//! Domain layer for the configuration bootstrap
//!
//! Pure types and the in-memory configuration store. No I/O happens here.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConfigError, ConfigResult, LoggerError};
