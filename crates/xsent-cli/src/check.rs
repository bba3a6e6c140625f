//! `check` command: environment readiness.

use xsent_core::AppConfig;
use xsent_crawler::BirdHarvester;

fn status(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "missing"
    }
}

/// Runs the harvester's `--version` and lists which credentials are present.
///
/// # Errors
///
/// Returns an error if the harvester cannot be run.
pub(crate) async fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    let harvester = BirdHarvester::from_command_line(&config.harvester_bin);
    let version = harvester.version().await?;

    println!("{:<22}{}", "harvester", version);
    println!(
        "{:<22}{}",
        "twitter credentials",
        status(config.twitter_auth_token.is_some())
    );
    println!("{:<22}{}", "groq api key", status(config.groq_api_key.is_some()));
    println!("{:<22}{}", "translation", config.translate_url);
    println!(
        "{:<22}{}",
        "discord webhook",
        status(config.discord_webhook_url.is_some())
    );
    println!("{:<22}{}", "output directory", config.output_dir.display());
    Ok(())
}
