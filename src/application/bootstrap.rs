//! Configuration bootstrap lifecycle
//!
//! [`Boiler`] is the per-process context object: it owns the store, the
//! logger hub and the readiness state, and is passed by handle to whatever
//! needs configuration or logging.
//!
//! ```text
//! Created ──init()──▶ Loading ──▶ Ready   (sinks wired, callback fired)
//!                             └─▶ Failed  (first source / wiring error)
//! ```
//!
//! Readiness is broadcast over a `tokio::sync::watch` channel, so any number
//! of `get_config()` callers queue while loading and all observe the same
//! `Arc<ConfigStore>`.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use super::options::{default_env_prefix, InitOptions};
use crate::domain::errors::{ConfigError, ConfigResult};
use crate::domain::models::{BootstrapState, ConfigDescriptor, ConfigStore, ContextValue};
use crate::infrastructure::config::{ConfigLoader, Resolution, SourceResolver};
use crate::infrastructure::logging::{
    install_panic_hook, BoxedWriter, DebugChannel, LogHub, Logger, DEFAULT_DEBUG_VAR,
};

/// Environment variable forcing the console sink active at the given level.
pub const LOGS_ENV_VAR: &str = "LOGS";

/// Scope label of the environment layer.
pub const ENV_SCOPE: &str = "env";

/// Scope label of the `default-config.*` layer.
pub const DEFAULT_SCOPE: &str = "default";

/// Scope label of the built-in lowest layer.
pub const BUILTIN_SCOPE: &str = "boiler-defaults";

#[derive(Debug, Clone)]
enum Readiness {
    Created,
    Loading,
    Ready,
    Failed(ConfigError),
}

impl Readiness {
    const fn state(&self) -> BootstrapState {
        match self {
            Self::Created => BootstrapState::Created,
            Self::Loading => BootstrapState::Loading,
            Self::Ready => BootstrapState::Ready,
            Self::Failed(_) => BootstrapState::Failed,
        }
    }
}

/// Configuration and logging context for one application.
pub struct Boiler {
    app_name: String,
    store: Arc<ConfigStore>,
    hub: Arc<LogHub>,
    root: Logger,
    readiness: watch::Sender<Readiness>,
    panic_hook_installed: AtomicBool,
    /// Read by the installed panic hook; follows `logs.skipUncaughtException`
    panic_logging: Arc<AtomicBool>,
}

impl Boiler {
    /// Context with raw output on stdout and the debug selector from `DEBUG`.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self::builder(app_name).build()
    }

    /// Builder for non-default raw, console and debug outputs.
    pub fn builder(app_name: impl Into<String>) -> BoilerBuilder {
        BoilerBuilder {
            app_name: app_name.into(),
            raw_writer: None,
            console_writer: None,
            debug_selector: None,
            debug_writer: None,
        }
    }

    /// Root logger namespace.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BootstrapState {
        self.readiness.borrow().state()
    }

    /// Logger whose namespace is the application name.
    pub const fn root_logger(&self) -> &Logger {
        &self.root
    }

    /// Root logger for `None`, otherwise a child of it.
    pub fn get_logger(&self, name: Option<&str>) -> Logger {
        name.map_or_else(|| self.root.clone(), |name| self.root.get_logger(name))
    }

    /// Resolve every source, wire the log sinks and release waiters.
    pub async fn init(&self, options: InitOptions) -> ConfigResult<Arc<ConfigStore>> {
        self.init_with(options, |_| {}).await
    }

    /// [`init`](Self::init) with a callback run once the store is ready.
    ///
    /// # Errors
    /// - `AlreadyInitialized` when called more than once; the store is untouched
    /// - the first source or logger wiring error, also handed to every waiter
    pub async fn init_with<F>(&self, options: InitOptions, on_ready: F) -> ConfigResult<Arc<ConfigStore>>
    where
        F: FnOnce(&Arc<ConfigStore>),
    {
        let claimed = self.readiness.send_if_modified(|current| {
            if matches!(current, Readiness::Created) {
                *current = Readiness::Loading;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(ConfigError::AlreadyInitialized);
        }
        info!(app = %self.app_name, "configuration bootstrap started");

        match self.bootstrap(options).await {
            Ok(()) => {
                self.transition(Readiness::Ready);
                info!(
                    app = %self.app_name,
                    scopes = self.store.scopes().len(),
                    "configuration ready"
                );
                on_ready(&self.store);
                Ok(Arc::clone(&self.store))
            }
            Err(err) => {
                self.root
                    .error_with("Configuration bootstrap failed", vec![ContextValue::error(err.clone())]);
                self.transition(Readiness::Failed(err.clone()));
                Err(err)
            }
        }
    }

    async fn bootstrap(&self, options: InitOptions) -> ConfigResult<()> {
        let InitOptions {
            base_config_dir,
            base_files_dir,
            env_prefix,
            profile,
            extra_configs,
            custom_sinks,
            remote_timeout,
        } = options;

        self.store.set_base_config_dir(&base_config_dir);
        let resolver = SourceResolver::new(&base_config_dir, &base_files_dir).with_remote_timeout(remote_timeout);
        let env_prefix = env_prefix.unwrap_or_else(|| default_env_prefix(&self.app_name));

        // Slots are declared up front so precedence follows declaration
        // order whatever order they are filled in.
        let env_rank = self.store.declare_scope(ENV_SCOPE, format!("environment {env_prefix}*"));
        let extra_ranks: Vec<Option<usize>> = extra_configs
            .iter()
            .map(|descriptor| {
                descriptor
                    .scope()
                    .map(|scope| self.store.declare_scope(scope, descriptor.origin()))
            })
            .collect();

        // `<stem>-config.*`, named relative to the config dir the resolver joins
        let base_file = |stem: &str| {
            ConfigLoader::find_config_file(&base_config_dir, stem)
                .and_then(|path| path.file_name().map(PathBuf::from))
                .map(|name| ConfigDescriptor::file(stem, name))
        };
        let mut base_files = Vec::new();
        if let Some(profile) = profile.as_deref() {
            match base_file(profile) {
                Some(descriptor) => base_files.push(descriptor),
                None => debug!(profile, "no profile configuration file"),
            }
        }
        base_files.extend(base_file(DEFAULT_SCOPE));
        let base_ranks: Vec<usize> = base_files
            .iter()
            .filter_map(|descriptor| {
                descriptor
                    .scope()
                    .map(|scope| self.store.declare_scope(scope, descriptor.origin()))
            })
            .collect();
        let builtin_rank = self.store.declare_scope(BUILTIN_SCOPE, "built-in");

        // Base layers first: local and synchronous, and extras may read them.
        let env = ConfigLoader::load_env(&env_prefix).map_err(|e| ConfigError::SourceLoad {
            scope: ENV_SCOPE.to_string(),
            origin: format!("{env_prefix}*"),
            reason: format!("{e:#}"),
        })?;
        self.store.fill_scope(env_rank, env);
        for (descriptor, rank) in base_files.iter().zip(base_ranks) {
            self.apply(&resolver, descriptor, Some(rank)).await?;
        }
        self.store.fill_scope(builtin_rank, ConfigLoader::builtin_defaults());

        for (descriptor, rank) in extra_configs.iter().zip(extra_ranks) {
            self.apply(&resolver, descriptor, rank).await?;
        }

        let console_override = std::env::var(LOGS_ENV_VAR)
            .ok()
            .filter(|level| !level.trim().is_empty());
        let logs = self
            .hub
            .init_with_config(&self.store, &custom_sinks, console_override.as_deref())
            .await?;

        self.panic_logging
            .store(!logs.skip_uncaught_exception, Ordering::Release);
        if !logs.skip_uncaught_exception && !self.panic_hook_installed.swap(true, Ordering::AcqRel) {
            install_panic_hook(self.root.clone(), Arc::clone(&self.panic_logging));
        }
        Ok(())
    }

    async fn apply(
        &self,
        resolver: &SourceResolver,
        descriptor: &ConfigDescriptor,
        rank: Option<usize>,
    ) -> ConfigResult<()> {
        match resolver.resolve(descriptor, &self.store).await? {
            Resolution::Scope(tree) => {
                if let Some(rank) = rank {
                    self.store.fill_scope(rank, tree);
                }
            }
            Resolution::Plugin(name) => debug!(plugin = %name, "configuration plugin applied"),
        }
        Ok(())
    }

    fn transition(&self, next: Readiness) {
        self.readiness.send_modify(|current| {
            debug_assert!(current.state().can_transition_to(next.state()));
            debug!(from = current.state().as_str(), to = next.state().as_str(), "bootstrap state changed");
            *current = next;
        });
    }

    /// Wait for readiness.
    ///
    /// # Errors
    /// - `NotInitialized` before `init()`
    /// - the bootstrap error once it has failed
    pub async fn get_config(&self) -> ConfigResult<Arc<ConfigStore>> {
        let mut receiver = self.readiness.subscribe();
        let readiness = receiver
            .wait_for(|readiness| !matches!(readiness, Readiness::Loading))
            .await
            .map_err(|_| ConfigError::NotReady)?
            .clone();

        match readiness {
            Readiness::Ready => Ok(Arc::clone(&self.store)),
            Readiness::Failed(err) => Err(err),
            Readiness::Created | Readiness::Loading => Err(ConfigError::NotInitialized),
        }
    }

    /// The store without waiting.
    ///
    /// Before readiness this fails with `NotReady`, unless `warn_only` is set:
    /// then one warning is logged and the partial store is returned.
    pub fn get_config_unsafe(&self, warn_only: bool) -> ConfigResult<Arc<ConfigStore>> {
        let state = self.state();
        if state == BootstrapState::Ready {
            return Ok(Arc::clone(&self.store));
        }
        if !warn_only {
            return Err(ConfigError::NotReady);
        }
        self.root.warn_with(
            "Configuration read before it was ready, returning a partial store",
            vec![ContextValue::from(state.as_str())],
        );
        Ok(Arc::clone(&self.store))
    }

    /// Back to `Created` with an empty store (same instance) and raw logging.
    ///
    /// Panic logging is switched off until the next successful `init()`, which
    /// reads `skipUncaughtException` again. Test escape hatch; never called
    /// implicitly.
    pub fn reset_for_testing(&self) {
        self.panic_logging.store(false, Ordering::Release);
        self.store.clear();
        self.hub.reset();
        self.readiness.send_replace(Readiness::Created);
        debug!(app = %self.app_name, "bootstrap reset");
    }
}

impl std::fmt::Debug for Boiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Boiler")
            .field("app_name", &self.app_name)
            .field("state", &self.state())
            .field("hub", &self.hub)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Boiler`] with non-default log outputs.
pub struct BoilerBuilder {
    app_name: String,
    raw_writer: Option<BoxedWriter>,
    console_writer: Option<BoxedWriter>,
    debug_selector: Option<String>,
    debug_writer: Option<BoxedWriter>,
}

impl BoilerBuilder {
    /// Destination of pre-ready raw lines (stdout by default).
    #[must_use]
    pub fn raw_writer(mut self, writer: BoxedWriter) -> Self {
        self.raw_writer = Some(writer);
        self
    }

    /// Destination of the console sink (stdout by default).
    #[must_use]
    pub fn console_writer(mut self, writer: BoxedWriter) -> Self {
        self.console_writer = Some(writer);
        self
    }

    /// Debug selector used instead of the `DEBUG` variable.
    #[must_use]
    pub fn debug_selector(mut self, selector: impl Into<String>) -> Self {
        self.debug_selector = Some(selector.into());
        self
    }

    /// Destination of the debug channel (stderr by default).
    #[must_use]
    pub fn debug_writer(mut self, writer: BoxedWriter) -> Self {
        self.debug_writer = Some(writer);
        self
    }

    /// Finish the context. The store is created here and never replaced.
    pub fn build(self) -> Boiler {
        let selector = self
            .debug_selector
            .unwrap_or_else(|| std::env::var(DEFAULT_DEBUG_VAR).unwrap_or_default());
        let debug_channel = DebugChannel::new(
            &selector,
            self.debug_writer.unwrap_or_else(|| Box::new(io::stderr())),
        );

        let mut hub = LogHub::new(
            self.raw_writer.unwrap_or_else(|| Box::new(io::stdout())),
            debug_channel,
        );
        if let Some(writer) = self.console_writer {
            hub = hub.with_console_writer(writer);
        }
        let hub = Arc::new(hub);
        let (readiness, _) = watch::channel(Readiness::Created);

        Boiler {
            root: Logger::root(self.app_name.clone(), Arc::clone(&hub)),
            app_name: self.app_name,
            store: Arc::new(ConfigStore::new(super::options::DEFAULT_CONFIG_DIR)),
            hub,
            readiness,
            panic_hook_installed: AtomicBool::new(false),
            panic_logging: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl std::fmt::Debug for BoilerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoilerBuilder")
            .field("app_name", &self.app_name)
            .field("debug_selector", &self.debug_selector)
            .finish_non_exhaustive()
    }
}
