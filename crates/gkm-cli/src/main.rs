//! git-key-manager CLI
//!
//! Keeps a registry of named SSH keys and loads them into ssh-agent:
//! - Registry management (list, add, remove)
//! - Agent operations (load, unload, status, watch)
//! - Remote authentication check against a Git host (test)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_key_manager::commands;
use git_key_manager::output::{format_keys, format_status, print_warning};
use gkm_core::config::{self, AppConfig};
use gkm_core::AppContext;

#[derive(Parser)]
#[command(name = "git-key-manager")]
#[command(author, version, about = "Manage named SSH keys and load them into ssh-agent")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the key registry (overrides config)
    #[arg(long, global = true, env = "GIT_KEY_MANAGER_REGISTRY")]
    registry: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured keys
    #[command(alias = "ls")]
    List,

    /// Register a private key under a name
    Add {
        /// Key name (e.g. "work", "personal")
        name: String,
        /// Path to the private key (may start with ~)
        path: String,
    },

    /// Remove a key from the registry
    #[command(alias = "rm")]
    Remove {
        /// Key name
        name: String,
        /// Remove without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Load a registered key into the SSH agent
    Load {
        /// Key name
        name: String,
    },

    /// Unload all keys from the SSH agent
    Unload,

    /// Show how many keys the SSH agent holds
    Status,

    /// Test SSH authentication against a Git host
    Test {
        /// Host to test (defaults to the configured auth_host)
        #[arg(long)]
        host: Option<String>,
    },

    /// Keep polling the SSH agent and print status changes
    Watch,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show config directory path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let app_config = load_app_config(cli.config.as_ref(), cli.registry);

    let mut ctx = AppContext::from_config(app_config);
    if let Some(warning) = ctx.load_warning() {
        print_warning(&format!("{}; starting with an empty registry", warning));
    }

    match cli.command {
        None => show_overview(&ctx).await,
        Some(Commands::List) => commands::list_command(&ctx).await?,
        Some(Commands::Add { name, path }) => commands::add_command(&ctx, &name, &path).await?,
        Some(Commands::Remove { name, force }) => {
            commands::remove_command(&ctx, &name, force).await?
        }
        Some(Commands::Load { name }) => commands::load_command(&ctx, &name).await?,
        Some(Commands::Unload) => commands::unload_command(&ctx).await?,
        Some(Commands::Status) => commands::status_command(&ctx).await?,
        Some(Commands::Test { host }) => commands::test_command(&ctx, host.as_deref()).await?,
        Some(Commands::Watch) => {
            commands::ensure_agent(&ctx).await;
            commands::watch_command(&mut ctx).await?
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config_show(cli.config.as_ref(), ctx.config())?,
            ConfigAction::Path => commands::config_path(cli.config.as_ref())?,
            ConfigAction::Init { force } => commands::config_init(cli.config.as_ref(), force)?,
        },
    }

    Ok(())
}

/// Load the config file (or defaults) and apply command-line overrides
fn load_app_config(config_path: Option<&PathBuf>, registry: Option<PathBuf>) -> AppConfig {
    let path = config_path
        .cloned()
        .unwrap_or_else(config::default_config_path);
    let mut app_config: AppConfig = config::load_config_or_default(&path);

    if let Some(registry) = registry {
        app_config.registry_path = registry;
    }
    tracing::debug!("Registry at {:?}", app_config.registry_path);
    app_config
}

/// Status plus key list, shown when no command is given
async fn show_overview(ctx: &AppContext) {
    let status = ctx.controller().current_status().await;
    println!("{}", format_status(&status));
    println!();
    println!("Configured Keys:");
    println!("{}", format_keys(&ctx.keys().await));
}
