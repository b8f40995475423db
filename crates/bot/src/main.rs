//! Courier Bot
//!
//! Browse and fetch files on this machine from a private Telegram chat.

use std::path::{Path, PathBuf};

use bot::config::{default_config_path, Config, ConfigError};
use bot::service::BotService;
use clap::{Parser, Subcommand};
use explorer::format_size;
use tracing_subscriber::EnvFilter;

/// Courier Bot - browse and fetch host files through Telegram.
#[derive(Parser, Debug)]
#[command(name = "courier-bot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the bot until interrupted
    Run,

    /// Write a configuration template
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, short)]
        force: bool,
    },

    /// Validate the configuration and print a summary
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Init { force } => {
            init_tracing(cli.verbose, "info");
            write_template(&config_path, force)
        }
        Commands::Run => {
            let config = load_config(&config_path, cli.verbose)?;
            run(config).await
        }
        Commands::Check => {
            let config = load_config(&config_path, cli.verbose)?;
            print_summary(&config_path, &config);
            Ok(())
        }
    }
}

/// Load, apply environment overrides, start logging and validate.
///
/// Exits the process with guidance when validation fails.
fn load_config(path: &Path, verbose: bool) -> anyhow::Result<Config> {
    let mut config = Config::load(path)?;
    let overrides = config.apply_env_overrides();

    init_tracing(verbose, &config.daemon.log_level);
    tracing::debug!("Using config file: {:?}", path);
    for var in overrides {
        tracing::info!(var, "Applied environment override");
    }

    if let Err(e) = config.validate() {
        report_config_error(path, &e);
        std::process::exit(1);
    }

    Ok(config)
}

/// `RUST_LOG` wins, then `--verbose`, then the configured level.
fn init_tracing(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn report_config_error(path: &Path, error: &ConfigError) {
    eprintln!("Error: {}", error);
    eprintln!();
    eprintln!("{}", error.guidance());
    eprintln!();
    eprintln!("Config file: {}", path.display());
}

fn write_template(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save(path)?;

    println!("Wrote configuration template to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Fill in [telegram] api_id, api_hash and bot_token");
    println!("  2. Set [access] allowed_user_id to your Telegram user ID");
    println!("  3. Run: courier-bot run");
    Ok(())
}

fn print_summary(path: &Path, config: &Config) {
    println!("Configuration OK ({})", path.display());
    println!();
    println!("  API URL:          {}", config.telegram.api_url);
    println!("  Allowed user:     {}", config.access.allowed_user_id);
    println!("  Root path:        {}", config.browse.root_path.display());
    println!("  Items per page:   {}", config.browse.items_per_page);
    println!("  Show hidden:      {}", config.browse.show_hidden);
    println!(
        "  Max file size:    {}",
        format_size(config.transfer.max_file_size)
    );

    if !config.browse.root_path.is_dir() {
        println!();
        println!("Warning: root path is not an accessible directory");
    }
}

/// Run the bot until SIGINT or SIGTERM.
async fn run(config: Config) -> anyhow::Result<()> {
    let root = config.browse.root_path.clone();
    if !root.is_dir() {
        tracing::warn!(
            root = %root.display(),
            "Root path is not an accessible directory; browsing will report it as missing"
        );
    }

    tracing::info!(
        root = %root.display(),
        allowed_user = config.access.allowed_user_id,
        items_per_page = config.browse.items_per_page,
        max_file_size = %format_size(config.transfer.max_file_size),
        "Courier bot starting..."
    );

    let mut service = BotService::new(config)?;
    service.start().await?;

    wait_for_shutdown_signal().await?;
    tracing::info!("Received shutdown signal");

    service.stop().await?;
    Ok(())
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::try_parse_from(["courier-bot", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run));
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_init_with_force() {
        let cli = Cli::try_parse_from(["courier-bot", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));

        let cli = Cli::try_parse_from(["courier-bot", "init"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: false }));
    }

    #[test]
    fn test_global_flags_after_command() {
        let cli =
            Cli::try_parse_from(["courier-bot", "check", "-v", "--config", "/tmp/c.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::Check));
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["courier-bot"]).is_err());
    }

    #[test]
    fn test_write_template_refuses_overwrite() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        write_template(&path, false).unwrap();
        assert!(path.exists());
        assert!(write_template(&path, false).is_err());
        write_template(&path, true).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.browse.items_per_page, 12);
    }
}
