//! `analyze` command: resolve, crawl, classify, aggregate, then report.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use xsent_core::{
    AppConfig, Cancellation, ClassifiedPost, Request, ResolvedQuery, SentimentLabel, TimeWindow,
};
use xsent_crawler::{AdaptiveCrawler, BirdHarvester, CrawlError, CrawlerOptions, Harvester};
use xsent_query::{GroqClient, QueryProposer, QueryResolver, ResolutionError};
use xsent_sentiment::{
    aggregate, classify_batch, AggregateOptions, Classifier, GoogleTranslator, SentimentError,
    SentimentReport, SlangNormalizer, Translator,
};

use crate::deliver::DiscordWebhook;
use crate::{export, report};

const WEBHOOK_RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Args)]
pub(crate) struct AnalyzeArgs {
    /// Natural-language request or advanced search query
    #[arg(required = true, num_args = 1..)]
    pub request: Vec<String>,

    /// Number of posts to fetch (defaults to XSENT_DEFAULT_LIMIT)
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,

    /// Earliest post date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Latest post date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Number of representative posts to show
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Label whose most-engaged posts are shown
    #[arg(long, default_value = "negative")]
    pub label: SentimentLabel,

    /// Score the normalized Indonesian text without translating it
    #[arg(long)]
    pub no_translate: bool,

    /// Print the resolved strategies without crawling
    #[arg(long)]
    pub dry_run: bool,

    /// Skip writing the JSON export
    #[arg(long)]
    pub no_export: bool,

    /// Post the report to DISCORD_WEBHOOK_URL
    #[arg(long)]
    pub deliver: bool,
}

/// Terminal failure of one analysis run, worded for the person who asked.
#[derive(Debug, Error)]
pub(crate) enum AnalysisError {
    #[error("could not understand request \"{request}\": {detail}")]
    NotUnderstood { request: String, detail: String },

    #[error("no results found after exhausting {count} strategies:\n{tried}")]
    NoResults { count: usize, tried: String },

    #[error("internal service unavailable: {detail}{tried}")]
    ServiceUnavailable { detail: String, tried: String },

    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    fn from_resolution(err: ResolutionError) -> Self {
        match err {
            ResolutionError::EmptyRequest => AnalysisError::NotUnderstood {
                request: String::new(),
                detail: "request is empty".to_string(),
            },
            ResolutionError::Unavailable { reason } => AnalysisError::ServiceUnavailable {
                detail: format!("query service: {reason}"),
                tried: String::new(),
            },
            ResolutionError::NoValidCandidate { request, rejected } => {
                let detail = if rejected.is_empty() {
                    "no usable search query".to_string()
                } else {
                    rejected
                        .iter()
                        .map(|(raw, reason)| format!("`{raw}` ({reason})"))
                        .collect::<Vec<_>>()
                        .join("; ")
                };
                AnalysisError::NotUnderstood { request, detail }
            }
        }
    }

    fn from_crawl(err: CrawlError, request: &str) -> Self {
        match err {
            CrawlError::NoStrategies => AnalysisError::NotUnderstood {
                request: request.to_string(),
                detail: "no search strategies".to_string(),
            },
            CrawlError::Exhausted { failures } => AnalysisError::NoResults {
                count: failures.len(),
                tried: failures
                    .iter()
                    .map(|f| format!("  - {f}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },
            CrawlError::Unavailable {
                strategy,
                query,
                failures,
                source,
            } => {
                let mut tried: Vec<String> = failures.iter().map(|f| format!("  - {f}")).collect();
                tried.push(format!("  - {strategy} `{query}`: {source}"));
                AnalysisError::ServiceUnavailable {
                    detail: format!("harvester ({})", source.kind()),
                    tried: format!("\nstrategies attempted:\n{}", tried.join("\n")),
                }
            }
            CrawlError::Cancelled => AnalysisError::Cancelled,
        }
    }
}

/// How the kept posts were obtained.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CrawlSummary {
    pub strategy: ResolvedQuery,
    pub partial: bool,
    pub attempts: u32,
    /// Strategies abandoned before the kept one.
    pub failed_strategies: Vec<String>,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnalysisRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub request: Request,
    pub strategies: Vec<ResolvedQuery>,
    pub crawl: CrawlSummary,
    pub posts: Vec<ClassifiedPost>,
    pub report: SentimentReport,
}

/// The stages of one run, each behind its own contract.
pub(crate) struct Pipeline<P, H, T> {
    pub resolver: QueryResolver<P>,
    pub crawler: AdaptiveCrawler<H>,
    pub classifier: Classifier<T>,
    pub workers: usize,
    pub aggregate: AggregateOptions,
}

impl<P, H, T> Pipeline<P, H, T>
where
    P: QueryProposer,
    H: Harvester,
    T: Translator,
{
    pub async fn resolve(
        &self,
        request: &Request,
        cancel: &Cancellation,
    ) -> Result<Vec<ResolvedQuery>, AnalysisError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AnalysisError::Cancelled),
            out = self.resolver.resolve(request) => out.map_err(AnalysisError::from_resolution),
        }
    }

    /// Runs every stage for `request`, fetching up to `target` posts.
    ///
    /// # Errors
    ///
    /// Returns the [`AnalysisError`] that ended the run.
    pub async fn run(
        &self,
        request: Request,
        target: u32,
        cancel: &Cancellation,
    ) -> Result<AnalysisRun, AnalysisError> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, request = request.text(), target, "analysis started");

        let strategies = self.resolve(&request, cancel).await?;
        let outcome = self
            .crawler
            .crawl(&strategies, target, cancel)
            .await
            .map_err(|e| AnalysisError::from_crawl(e, request.text()))?;

        let posts = classify_batch(&self.classifier, outcome.posts, self.workers, cancel)
            .await
            .map_err(|e| match e {
                SentimentError::Cancelled => AnalysisError::Cancelled,
                other => AnalysisError::ServiceUnavailable {
                    detail: other.to_string(),
                    tried: String::new(),
                },
            })?;
        let report = aggregate(&posts, &self.aggregate);
        tracing::info!(
            %run_id,
            total = report.total,
            majority = report.majority.map_or("none", SentimentLabel::as_str),
            "analysis finished"
        );

        Ok(AnalysisRun {
            run_id,
            started_at,
            request,
            strategies,
            crawl: CrawlSummary {
                strategy: outcome.strategy,
                partial: outcome.partial,
                attempts: outcome.attempts,
                failed_strategies: outcome.failures.iter().map(ToString::to_string).collect(),
            },
            posts,
            report,
        })
    }
}

/// Builds the request from command-line arguments.
///
/// # Errors
///
/// Returns an error when `--since` is after `--until`.
pub(crate) fn build_request(args: &AnalyzeArgs, default_limit: u32) -> anyhow::Result<(Request, u32)> {
    let target = args.limit.unwrap_or(default_limit).max(1);
    let mut request = Request::new(args.request.join(" ")).with_limit(target);
    if args.since.is_some() || args.until.is_some() {
        request = request.with_window(TimeWindow::new(args.since, args.until)?);
    }
    Ok((request, target))
}

/// Runs the `analyze` command against the configured services.
///
/// # Errors
///
/// Returns an error for missing credentials, unusable configuration, or a
/// failed run ([`AnalysisError`]).
#[allow(clippy::too_many_lines)]
pub(crate) async fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let (request, target) = build_request(&args, config.default_limit)?;

    let proposer = match &config.groq_api_key {
        Some(key) => Some(
            GroqClient::with_base_url(
                key,
                &config.groq_model,
                config.llm_timeout_secs,
                &config.groq_base_url,
            )?
            .with_default_window_days(config.default_window_days),
        ),
        None => None,
    };
    let resolver = QueryResolver::new(proposer);

    let harvester = BirdHarvester::from_command_line(&config.harvester_bin)
        .with_credentials(config.twitter_auth_token.clone(), config.twitter_ct0.clone())
        .with_timeout(Duration::from_secs(config.harvest_timeout_secs));
    let crawler = AdaptiveCrawler::new(
        harvester,
        CrawlerOptions {
            min_fraction: config.crawl_min_fraction,
            max_retries: config.crawl_max_retries,
            retry_delay_ms: config.crawl_retry_delay_ms,
        },
    );

    let normalizer = match &config.slang_path {
        Some(path) => {
            let file = xsent_core::load_slang_file(path)?;
            tracing::info!(path = %path.display(), entries = file.slang.len(), "loaded slang overrides");
            SlangNormalizer::with_overrides(&file.slang)?
        }
        None => SlangNormalizer::builtin(),
    };
    let translator = if args.no_translate {
        None
    } else {
        Some(GoogleTranslator::with_base_url(
            &config.translate_url,
            config.translate_timeout_secs,
            config.translate_max_concurrent,
        )?)
    };
    let classifier =
        Classifier::new(normalizer, translator).with_threshold(config.sentiment_threshold);

    let pipeline = Pipeline {
        resolver,
        crawler,
        classifier,
        workers: config.classify_workers,
        aggregate: AggregateOptions {
            top_n: args.top,
            top_label: args.label,
            ..AggregateOptions::default()
        },
    };

    let (handle, cancel) = Cancellation::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling run");
            handle.cancel();
        }
    });

    if args.dry_run {
        let strategies = pipeline.resolve(&request, &cancel).await?;
        println!("{}", report::render_strategies(&request, &strategies));
        return Ok(());
    }

    if config.twitter_auth_token.is_none() {
        anyhow::bail!("TWITTER_AUTH_TOKEN is not set; the harvester cannot search without it");
    }
    let webhook = if args.deliver {
        let Some(url) = &config.discord_webhook_url else {
            anyhow::bail!("--deliver needs DISCORD_WEBHOOK_URL to be set");
        };
        Some(DiscordWebhook::new(url, WEBHOOK_RETRY_DELAY_MS)?)
    } else {
        None
    };

    let run = pipeline.run(request, target, &cancel).await?;
    let markdown = report::render_markdown(&run);
    println!("{markdown}");

    if !args.no_export {
        let path: PathBuf = export::write_export(&config.output_dir, &run).await?;
        println!("\nexported to {}", path.display());
    }
    if let Some(webhook) = webhook {
        let sent = webhook.send_report(&markdown).await?;
        tracing::info!(messages = sent, "report delivered");
    }

    Ok(())
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
