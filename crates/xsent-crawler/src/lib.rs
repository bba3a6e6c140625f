//! Adaptive crawling: runs a ladder of search strategies against a
//! rate-limited, failure-prone harvester until one yields enough posts.

pub mod bird;
pub mod crawler;
pub mod error;
pub mod harvester;
pub(crate) mod retry;

pub use bird::BirdHarvester;
pub use crawler::{AdaptiveCrawler, CrawlOutcome, CrawlerOptions};
pub use error::{CrawlError, FailureReason, HarvestError, StrategyFailure};
pub use harvester::Harvester;
