//! CLI argument parsing definitions

use bankload_config::Variant;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a load test against the banking API
    Run(RunArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

/// Flags of `run`. Each one overrides the loaded configuration.
#[derive(Debug, Default, clap::Args)]
pub struct RunArgs {
    /// Base URL of the banking API
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Number of virtual users
    #[arg(short, long, value_name = "N")]
    pub users: Option<usize>,

    /// Users spawned per second
    #[arg(short = 'r', long, value_name = "RATE")]
    pub spawn_rate: Option<f64>,

    /// Stop after this many seconds; runs until Ctrl-C when unset
    #[arg(short = 't', long, value_name = "SECS")]
    pub run_time: Option<u64>,

    /// Transfer target policy
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Print the run summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration in use
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "bankload",
            "--log-level",
            "debug",
            "run",
            "--host",
            "http://bank:8080",
            "-u",
            "20",
            "--spawn-rate",
            "2.5",
            "--run-time",
            "60",
            "--variant",
            "peer-to-peer",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.host.as_deref(), Some("http://bank:8080"));
        assert_eq!(args.users, Some(20));
        assert_eq!(args.spawn_rate, Some(2.5));
        assert_eq!(args.run_time, Some(60));
        assert_eq!(args.variant, Some(Variant::PeerToPeer));
        assert!(args.json);
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["bankload", "config", "show", "--config", "load.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("load.yaml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                config_cmd: ConfigCommands::Show {
                    format: OutputFormat::Yaml
                }
            })
        ));
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let result = Cli::try_parse_from(["bankload", "run", "--variant", "round-robin"]);
        assert!(result.is_err());
    }
}
