use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use xsent_core::{Post, StrategyTag};
use xsent_crawler::HarvestError;
use xsent_query::{LlmError, Proposal};
use xsent_sentiment::TranslationError;

use super::*;

enum Propose {
    Query(&'static str, &'static [&'static str]),
    Decline,
}

struct FakeProposer(Propose);

impl QueryProposer for FakeProposer {
    async fn propose(&self, _request: &Request) -> Result<Proposal, LlmError> {
        Ok(match &self.0 {
            Propose::Query(query, alternatives) => Proposal {
                valid: true,
                query: (*query).to_string(),
                alternatives: alternatives.iter().map(|a| (*a).to_string()).collect(),
            },
            Propose::Decline => Proposal {
                valid: false,
                query: String::new(),
                alternatives: Vec::new(),
            },
        })
    }
}

#[derive(Clone, Copy)]
enum Reply {
    Texts(&'static [&'static str]),
    AuthExpired,
}

/// Answers each query from a fixed table; unknown queries return nothing.
struct TableHarvester {
    table: HashMap<&'static str, Reply>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl TableHarvester {
    fn new(table: &[(&'static str, Reply)]) -> Self {
        Self {
            table: table.iter().copied().collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Harvester for TableHarvester {
    async fn harvest(&self, query: &str, _limit: u32) -> Result<Vec<Post>, HarvestError> {
        self.calls.lock().unwrap().push(query.to_string());
        match self.table.get(query).copied() {
            Some(Reply::Texts(texts)) => Ok(texts
                .iter()
                .enumerate()
                .map(|(i, text)| Post {
                    id: format!("{i}"),
                    author: "warga".to_string(),
                    created_at: None,
                    text: (*text).to_string(),
                    reply_count: u64::try_from(i).unwrap(),
                    like_count: 0,
                    retweet_count: 0,
                    lang: Some("id".to_string()),
                })
                .collect()),
            Some(Reply::AuthExpired) => Err(HarvestError::AuthExpired("401".to_string())),
            None => Ok(Vec::new()),
        }
    }
}

struct Offline;

impl Translator for Offline {
    async fn translate(&self, _text: &str) -> Result<String, TranslationError> {
        Err(TranslationError::Empty)
    }
}

const THREE_POSTS: &[&str] = &[
    "Sangat bagus dan memuaskan!",
    "sangat buruk dan mengecewakan",
    "update informasi terbaru",
];

fn pipeline(
    proposer: Option<FakeProposer>,
    harvester: TableHarvester,
) -> Pipeline<FakeProposer, TableHarvester, Offline> {
    Pipeline {
        resolver: QueryResolver::new(proposer),
        crawler: AdaptiveCrawler::new(
            harvester,
            CrawlerOptions {
                min_fraction: 0.2,
                max_retries: 0,
                retry_delay_ms: 0,
            },
        ),
        classifier: Classifier::new(SlangNormalizer::builtin(), Some(Offline)),
        workers: 2,
        aggregate: AggregateOptions::default(),
    }
}

#[tokio::test]
async fn grammar_request_runs_end_to_end() {
    let p = pipeline(
        None,
        TableHarvester::new(&[("banjir lang:id", Reply::Texts(THREE_POSTS))]),
    );
    let run = p
        .run(Request::new("banjir lang:id"), 10, &Cancellation::never())
        .await
        .unwrap();

    assert_eq!(run.strategies.len(), 1);
    assert_eq!(run.crawl.strategy.strategy(), StrategyTag::Primary);
    assert_eq!(run.posts.len(), 3);
    assert_eq!(run.report.total, 3);
    assert_eq!(run.report.majority, Some(SentimentLabel::Positive));
    assert_eq!(run.report.top_posts.len(), 1);
    assert_eq!(run.report.top_posts[0].post.text, THREE_POSTS[1]);
}

#[tokio::test]
async fn natural_language_request_falls_back_to_broader_query() {
    let harvester = TableHarvester::new(&[("#banjir lang:id", Reply::Texts(THREE_POSTS))]);
    let calls = Arc::clone(&harvester.calls);
    let p = pipeline(
        Some(FakeProposer(Propose::Query(
            "#banjir lang:id since:2024-01-01",
            &["#banjir lang:id"],
        ))),
        harvester,
    );
    let run = p
        .run(Request::new("banjir awal tahun"), 10, &Cancellation::never())
        .await
        .unwrap();

    assert!(run.crawl.strategy.strategy().is_fallback());
    assert_eq!(run.crawl.strategy.query(), "#banjir lang:id");
    assert_eq!(run.crawl.failed_strategies.len(), 1);
    assert_eq!(
        calls.lock().unwrap().as_slice(),
        ["#banjir lang:id since:2024-01-01", "#banjir lang:id"]
    );
}

#[tokio::test]
async fn exhausted_crawl_reports_every_strategy() {
    let p = pipeline(
        Some(FakeProposer(Propose::Query(
            "#banjir lang:id since:2024-01-01",
            &["#banjir lang:id"],
        ))),
        TableHarvester::new(&[]),
    );
    let err = p
        .run(Request::new("banjir awal tahun"), 10, &Cancellation::never())
        .await
        .unwrap_err();

    match &err {
        AnalysisError::NoResults { count, tried } => {
            assert_eq!(*count, p_strategy_count(&p).await);
            assert!(tried.contains("primary `#banjir lang:id since:2024-01-01`"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err
        .to_string()
        .starts_with("no results found after exhausting"));
}

async fn p_strategy_count(p: &Pipeline<FakeProposer, TableHarvester, Offline>) -> usize {
    p.resolve(&Request::new("banjir awal tahun"), &Cancellation::never())
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn declined_request_is_not_understood() {
    let p = pipeline(
        Some(FakeProposer(Propose::Decline)),
        TableHarvester::new(&[]),
    );
    let err = p
        .run(Request::new("asdf qwer"), 10, &Cancellation::never())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::NotUnderstood { .. }));
    assert!(err.to_string().starts_with("could not understand request \"asdf qwer\""));
}

#[tokio::test]
async fn natural_language_without_proposer_is_service_unavailable() {
    let p = pipeline(None, TableHarvester::new(&[]));
    let err = p
        .run(Request::new("bagaimana harga beras"), 10, &Cancellation::never())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::ServiceUnavailable { .. }));
    assert!(err.to_string().starts_with("internal service unavailable"));
}

#[tokio::test]
async fn expired_credentials_name_the_attempted_strategy() {
    let p = pipeline(
        None,
        TableHarvester::new(&[("banjir lang:id", Reply::AuthExpired)]),
    );
    let err = p
        .run(Request::new("banjir lang:id"), 10, &Cancellation::never())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("internal service unavailable: harvester (auth-expired)"));
    assert!(message.contains("primary `banjir lang:id`"));
}

#[tokio::test]
async fn cancelled_run_stops_before_crawling() {
    let harvester = TableHarvester::new(&[("banjir lang:id", Reply::Texts(THREE_POSTS))]);
    let calls = Arc::clone(&harvester.calls);
    let p = pipeline(None, harvester);
    let (handle, cancel) = Cancellation::channel();
    handle.cancel();

    let err = p
        .run(Request::new("banjir lang:id"), 10, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Cancelled));
    assert!(calls.lock().unwrap().is_empty());
}
