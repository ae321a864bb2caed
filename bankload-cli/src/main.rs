use anyhow::{Context, Result};
use bankload_config::{BankloadConfig, ConfigLoader};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn};

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{handle_config_generate, handle_config_show, handle_config_validate};
use commands::run::{apply_overrides, handle_run};

/// Configuration as read, before command-line flags and validation
struct LoadedConfig {
    config: BankloadConfig,
    /// `--config` path that did not exist, reported once logging is up
    missing_file: Option<PathBuf>,
}

/// Load configuration from file or use defaults
fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) if path.exists() => Ok(LoadedConfig {
            config: loader
                .read_file(path)
                .context(format!("Failed to load configuration from {:?}", path))?,
            missing_file: None,
        }),
        Some(path) => Ok(LoadedConfig {
            config: loader
                .read_env()
                .context("Failed to load configuration from environment")?,
            missing_file: Some(path.clone()),
        }),
        None => Ok(LoadedConfig {
            config: loader
                .read_env()
                .context("Failed to load configuration from environment")?,
            missing_file: None,
        }),
    }
}

/// Apply `run` flags, then validate the final configuration
fn finalize_config(config: &mut BankloadConfig, command: Option<&Commands>) -> Result<()> {
    match command {
        Some(Commands::Run(args)) => apply_overrides(config, args),
        _ => config.validate_all().context("Invalid configuration"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config validate` works on its own file and must not fail on a broken default config
    if let Some(Commands::Config {
        config_cmd: ConfigCommands::Validate { config_file },
    }) = &cli.command
    {
        bankload_logging::init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
        return handle_config_validate(config_file);
    }

    let LoadedConfig {
        mut config,
        missing_file,
    } = load_config(cli.config.as_ref())?;
    finalize_config(&mut config, cli.command.as_ref())?;

    // Held for the whole run so file appenders flush on exit
    let _logging_guard = match bankload_logging::init_logging_from_config(
        &config.logging,
        cli.log_level.as_deref(),
    ) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!(
                "Failed to initialize structured logging: {}, falling back to simple tracing",
                e
            );
            bankload_logging::init_simple_tracing(cli.log_level.as_deref().unwrap_or("info"))?;
            None
        }
    };

    match (&cli.config, missing_file) {
        (_, Some(path)) => warn!("Configuration file not found: {:?}. Using defaults.", path),
        (Some(path), None) => debug!("Configuration loaded from {:?}", path),
        (None, None) => debug!("No configuration file specified, using environment and defaults"),
    }

    match &cli.command {
        Some(Commands::Run(args)) => {
            info!("bankload {} starting", env!("CARGO_PKG_VERSION"));
            handle_run(config, args).await
        }
        Some(Commands::Config { config_cmd }) => match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
            ConfigCommands::Show { format } => handle_config_show(&config, *format),
        },
        None => {
            // If no subcommand is provided, print help
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
