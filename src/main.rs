//! Binary entry point for gemhook.
//!
//! This binary provides the CLI interface for managing registry webhooks.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{WebhookArgs, cmd_webhook};
use gemhook::config::GemhookConfig;
use gemhook::observability::{self, InitOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Gemhook - manage package-registry webhooks.
#[derive(Parser)]
#[command(name = "gemhook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Registry host (default: https://rubygems.org).
    #[arg(long, global = true, value_name = "URL")]
    host: Option<String>,

    /// API key to use instead of the stored credentials.
    #[arg(short, long, global = true, value_name = "KEY")]
    key: Option<String>,

    /// Use an HTTP proxy for remote operations.
    #[arg(short = 'p', long, global = true, value_name = "URL")]
    http_proxy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Register a webhook that will be called any time a gem is updated.
    ///
    /// Webhooks can be created for either specific gems or all gems. In both
    /// cases you'll get a POST request of the gem in JSON format at the URL
    /// you specify. You can also use this command to test fire a webhook.
    Webhook(WebhookArgs),

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_config(
        &config.logging,
        InitOptions {
            verbose: cli.verbose,
        },
    ) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    if let Some(e) = dotenv_problem(&dotenv) {
        tracing::debug!(error = %e, "Ignoring unreadable .env file");
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "Command failed");
            if !e.already_reported() {
                eprintln!("ERROR: {e}");
            }
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: &GemhookConfig) -> gemhook::Result<()> {
    match command {
        Commands::Webhook(args) => cmd_webhook(args, config),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "gemhook",
                &mut std::io::stdout(),
            );
            Ok(())
        },
    }
}

/// Returns the `.env` load error worth reporting; a missing file is not one.
fn dotenv_problem(result: &Result<PathBuf, dotenvy::Error>) -> Option<&dotenvy::Error> {
    result.as_ref().err().filter(|e| !e.not_found())
}

/// Loads configuration: file, then environment, then command line flags.
fn load_config(cli: &Cli) -> gemhook::Result<GemhookConfig> {
    load_config_with(cli, |name| std::env::var(name).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
fn load_config_with<F>(cli: &Cli, lookup: F) -> gemhook::Result<GemhookConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match cli.config.as_deref() {
        Some(path) => GemhookConfig::load_from_file(path)?,
        None => GemhookConfig::load_default(),
    }
    .with_overrides_from(lookup);

    if let Some(host) = &cli.host {
        config = config.with_host(host);
    }
    if let Some(key) = &cli.key {
        config = config.with_api_key(key);
    }
    if let Some(proxy) = &cli.http_proxy {
        config = config.with_proxy(proxy);
    }

    Ok(config)
}
