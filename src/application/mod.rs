//! Application layer: the bootstrap lifecycle and its options.

pub mod bootstrap;
pub mod options;

pub use bootstrap::{Boiler, BoilerBuilder, BUILTIN_SCOPE, DEFAULT_SCOPE, ENV_SCOPE, LOGS_ENV_VAR};
pub use options::{default_env_prefix, InitOptions, DEFAULT_CONFIG_DIR};
