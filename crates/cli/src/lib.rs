pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use bazaar_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};
use clap::{Parser, Subcommand};

use crate::commands::{rank::RankArgs, validate::ValidateArgs, CommandResult};

#[derive(Debug, Parser)]
#[command(
    name = "bazaar",
    about = "Bazaar product ranking CLI",
    long_about = "Rank catalog snapshots, validate product records, and inspect ranking configuration.",
    after_help = "Examples:\n  bazaar rank --input catalog.json\n  bazaar rank --input catalog.json --view similar --reference sku-42\n  bazaar validate --input catalog.json\n  bazaar config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a bazaar.toml file (required to exist when given)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override the configured log level")]
    log_level: Option<String>,
    #[arg(long, global = true, value_parser = parse_log_format, help = "compact|pretty|json")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Score and order a catalog snapshot, emitting the ranked view as JSON")]
    Rank(RankArgs),
    #[command(about = "Check product records and report which ones the engine would reject")]
    Validate(ValidateArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Rank(_) => "rank",
            Self::Validate(_) => "validate",
            Self::Config => "config",
        }
    }
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                log_format: self.log_format,
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.load_options()) {
        Ok(config) => config,
        Err(error) => {
            let result = CommandResult::failure(
                cli.command.name(),
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };

    if let Err(error) = init_logging(&config.logging) {
        eprintln!("logging unavailable: {error}");
    }

    let result = match cli.command {
        Command::Rank(args) => commands::rank::run(&config, &args),
        Command::Validate(args) => commands::validate::run(&args),
        Command::Config => CommandResult {
            exit_code: 0,
            output: commands::config::run(&config, cli.config.as_deref()),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr; stdout carries only command payloads.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!(error))
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse::<LogFormat>().map_err(|error| error.to_string())
}
