mod analyze;
mod check;
mod deliver;
mod export;
mod report;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "xsent")]
#[command(about = "Sentiment analysis of X posts for a natural-language or advanced-search request")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a request, crawl posts, classify and report their sentiment
    Analyze(analyze::AnalyzeArgs),
    /// Verify the harvester runs and report which services are configured
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = xsent_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "configuration loaded");
    if config.groq_api_key.is_none() {
        tracing::warn!(
            "GROQ_API_KEY is not set; only requests written as advanced search queries can be resolved"
        );
    }

    match cli.command {
        Commands::Analyze(args) => analyze::run_analyze(&config, args).await,
        Commands::Check => check::run_check(&config).await,
    }
}
