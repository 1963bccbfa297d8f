//! Domain models: the store, its layers and log records.

pub mod descriptor;
pub mod key_path;
pub mod log;
pub mod scope;
pub mod state;
pub mod store;

pub use descriptor::{AsyncFileSource, ConfigDescriptor, FileSource};
pub use log::{ContextValue, Level, LogMeta, LogRecord, UNSERIALIZABLE};
pub use scope::{Precedence, ScopeAndValue, ScopeEntry};
pub use state::BootstrapState;
pub use store::ConfigStore;
