//! JSON export of a finished run.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::analyze::AnalysisRun;

const FALLBACK_STEM: &str = "hasil_crawling";
const MAX_STEM_CHARS: usize = 50;

/// Filesystem-safe file name for `query` at `at`, e.g.
/// `harga_beras_lang_id_20240101_120000.json`.
pub(crate) fn export_file_name(query: &str, at: DateTime<Utc>) -> String {
    let mut stem = String::new();
    for c in query.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            stem.push(c);
        } else if !stem.ends_with('_') && !stem.is_empty() {
            stem.push('_');
        }
        if stem.len() >= MAX_STEM_CHARS {
            break;
        }
    }
    let stem = stem.trim_end_matches('_');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    format!("{stem}_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Writes `run` as pretty JSON into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub(crate) async fn write_export(dir: &Path, run: &AnalysisRun) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating export directory {}", dir.display()))?;

    let path = dir.join(export_file_name(
        run.crawl.strategy.query(),
        run.started_at,
    ));
    let json = serde_json::to_vec_pretty(run).context("serializing analysis run")?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("writing export {}", path.display()))?;

    tracing::info!(path = %path.display(), posts = run.posts.len(), "export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;
    use xsent_core::{Request, ResolvedQuery, StrategyTag};
    use xsent_sentiment::{aggregate, AggregateOptions};

    use super::*;
    use crate::analyze::CrawlSummary;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn file_name_is_slugged_and_timestamped() {
        assert_eq!(
            export_file_name("harga beras lang:id", at()),
            "harga_beras_lang_id_20240102_030405.json"
        );
        assert_eq!(
            export_file_name("\"Banjir Jakarta\" -from:bmkg", at()),
            "banjir_jakarta_from_bmkg_20240102_030405.json"
        );
    }

    #[test]
    fn file_name_falls_back_for_symbol_only_queries() {
        assert_eq!(
            export_file_name("#!?", at()),
            "hasil_crawling_20240102_030405.json"
        );
    }

    #[test]
    fn file_name_stem_is_bounded() {
        let name = export_file_name(&"panjang ".repeat(40), at());
        assert!(name.len() <= MAX_STEM_CHARS + "_20240102_030405.json".len());
    }

    #[tokio::test]
    async fn export_round_trips_as_json() {
        let dir = std::env::temp_dir().join(format!("xsent-export-{}", Uuid::new_v4()));
        let strategy = ResolvedQuery::new("banjir lang:id", StrategyTag::Primary, 11);
        let run = AnalysisRun {
            run_id: Uuid::new_v4(),
            started_at: at(),
            request: Request::new("banjir"),
            strategies: vec![strategy.clone()],
            crawl: CrawlSummary {
                strategy,
                partial: false,
                attempts: 1,
                failed_strategies: Vec::new(),
            },
            posts: Vec::new(),
            report: aggregate(&[], &AggregateOptions::default()),
        };

        let path = write_export(&dir, &run).await.unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(value["run_id"], run.run_id.to_string());
        assert_eq!(value["crawl"]["strategy"]["strategy"], "primary");
        assert_eq!(value["report"]["total"], 0);
        assert!(value["report"]["majority"].is_null());
    }
}
