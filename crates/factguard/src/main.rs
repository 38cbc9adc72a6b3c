//! Fact Guard server - relays URL fact-check analyses to the browser

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use factguard::FactGuardError;
use factguard::analysis::CannedScript;
use factguard::catalog::ArticleCatalog;
use factguard::config::Config;
use factguard::error::Result;
use factguard::proxy::{AppState, FactGuardServer};

/// Fact Guard - streaming front-end for URL fact-check analyses
#[derive(Parser)]
#[command(name = "factguard")]
#[command(about = "Streaming front-end for URL fact-check analyses")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server (default command)
    #[command(name = "serve")]
    Serve,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => serve(cli.config).await,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,factguard=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn read_config_file(path: &Path) -> Result<Config> {
    tracing::info!("Loading config from: {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| {
        FactGuardError::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    Config::from_toml_str(&content)
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let mut config = if let Some(path) = config_path {
        read_config_file(&path)?
    } else {
        let default_paths = [
            dirs::home_dir().map(|h| h.join(".factguard").join("config.toml")),
            dirs::config_dir().map(|c| c.join("factguard").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        match default_paths.iter().flatten().find(|p| p.exists()) {
            Some(path) => read_config_file(path)?,
            None => {
                tracing::info!("No config file found, using defaults");
                Config::default()
            }
        }
    };

    config.apply_env();
    config.validate()?;
    Ok(config)
}

async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    tracing::info!("Starting Fact Guard");

    let config = load_config(config_path)?;
    tracing::debug!(
        "Config loaded: listen_addr={}, mode={}",
        config.server.listen_addr,
        config.analysis.mode().as_str()
    );

    let catalog = ArticleCatalog::load_optional(config.library.articles_path.as_deref())?;
    let canned = CannedScript::builtin()?;

    let state = AppState::new(config, canned, catalog)?;
    FactGuardServer::new(state).serve().await?;

    tracing::info!("Fact Guard stopped");
    Ok(())
}
