use clap::{Parser, Subcommand};
use factguard_cli::commands::{AnalyzeCommand, StatsCommand};
use factguard_cli::error::CliResult;
use factguard_cli::output::OutputFormat;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "factguard-cli")]
#[command(about = "Fact Guard CLI - Stream analyses and inspect history from the terminal")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(
        long,
        short,
        global = true,
        env = "FACTGUARD_SERVER",
        default_value = DEFAULT_SERVER,
        help = "Base URL of the Fact Guard server"
    )]
    pub server: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Stream a credibility analysis of an article")]
    Analyze(AnalyzeCommand),

    #[clap(about = "Show analysis history statistics")]
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    match &cli.command {
        Command::Analyze(cmd) => cmd.execute(&cli.server, format).await,
        Command::Stats(cmd) => cmd.execute(&cli.server, format).await,
    }
}
