//! Command-line front end over [`Boiler`](crate::application::Boiler).

pub mod types;

pub use types::{Cli, Commands};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::application::{Boiler, InitOptions};
use crate::domain::models::ConfigDescriptor;

/// Application name of the binary; also the root logger namespace.
pub const APP_NAME: &str = "boiler";

/// Bootstrap from the command-line options and run one command.
pub async fn execute(cli: Cli) -> Result<()> {
    let boiler = Boiler::new(APP_NAME);
    let store = boiler
        .init(init_options(&cli))
        .await
        .context("Failed to bootstrap configuration")?;

    let output = match cli.command {
        Commands::Get { key } => store.get(&key).unwrap_or(Value::Null),
        Commands::Dump => store.get_all(),
        Commands::Scope { key } => serde_json::to_value(store.get_scope_and_value(&key))?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Map command-line options onto bootstrap options.
///
/// Extra files are scoped by file stem, URLs as `remote-<n>`.
pub fn init_options(cli: &Cli) -> InitOptions {
    let mut options = InitOptions::new()
        .with_base_config_dir(&cli.config_dir)
        .with_base_files_dir(&cli.files_dir);
    if let Some(prefix) = &cli.env_prefix {
        options = options.with_env_prefix(prefix);
    }
    if let Some(profile) = &cli.profile {
        options = options.with_profile(profile);
    }
    for path in &cli.extras {
        let scope = path
            .file_stem()
            .map_or_else(|| "extra".to_string(), |stem| stem.to_string_lossy().into_owned());
        options = options.with_extra(ConfigDescriptor::file(scope, path));
    }
    for (index, url) in cli.urls.iter().enumerate() {
        options = options.with_extra(ConfigDescriptor::remote_url(format!("remote-{index}"), url));
    }
    options
}

/// Print an error chain to stderr and exit non-zero.
pub fn handle_error(err: &anyhow::Error) -> ! {
    eprintln!("Error: {err:#}");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_options() {
        let cli = Cli::try_parse_from([
            "boiler",
            "--config-dir",
            "settings",
            "--extra",
            "local/overrides.yml",
            "--url",
            "https://config.example/app.json",
            "get",
            "logs:console:level",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Get { ref key } if key == "logs:console:level"));
        let options = init_options(&cli);
        assert_eq!(options.base_config_dir, PathBuf::from("settings"));
        assert_eq!(options.base_files_dir, PathBuf::from("."));
        let scopes: Vec<Option<&str>> = options.extra_configs.iter().map(ConfigDescriptor::scope).collect();
        assert_eq!(scopes, vec![Some("overrides"), Some("remote-0")]);
    }

    #[test]
    fn test_dump_takes_no_arguments() {
        let cli = Cli::try_parse_from(["boiler", "dump"]).unwrap();
        assert!(matches!(cli.command, Commands::Dump));
        assert!(Cli::try_parse_from(["boiler", "dump", "extra"]).is_err());
    }
}
