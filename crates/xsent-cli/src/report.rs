//! Markdown rendering of an analysis run.

use std::fmt::Write as _;

use xsent_core::{Request, ResolvedQuery, SentimentLabel};
use xsent_sentiment::LabelSummary;

use crate::analyze::AnalysisRun;

const PREVIEW_CHARS: usize = 100;

fn title(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "Positive",
        SentimentLabel::Negative => "Negative",
        SentimentLabel::Neutral => "Neutral",
    }
}

/// First `PREVIEW_CHARS` characters of `text` on one line, with `...` when cut.
pub(crate) fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

fn engagement_cells(summary: &LabelSummary) -> String {
    let e = &summary.engagement;
    if e.defined {
        format!(
            "{:.1} | {:.1} | {:.1}",
            e.mean_replies, e.mean_likes, e.mean_retweets
        )
    } else {
        "n/a | n/a | n/a".to_string()
    }
}

/// Lists resolved strategies for `--dry-run`.
pub(crate) fn render_strategies(request: &Request, strategies: &[ResolvedQuery]) -> String {
    let mut out = format!("Strategies for \"{}\":\n", request.text());
    for s in strategies {
        let _ = writeln!(
            out,
            "  {:<12} {:>4}  {}",
            s.strategy().to_string(),
            s.specificity(),
            s.query()
        );
    }
    out
}

#[must_use]
pub(crate) fn render_markdown(run: &AnalysisRun) -> String {
    let report = &run.report;
    let mut out = String::new();

    let _ = writeln!(out, "# Sentiment Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "**Request**: {}", run.request.text());
    let _ = writeln!(
        out,
        "**Generated**: {}",
        run.started_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "**Run**: {}", run.run_id);

    let strategy = &run.crawl.strategy;
    let how = if strategy.strategy().is_fallback() {
        format!(
            "fallback after {} failed strateg{}",
            run.crawl.failed_strategies.len(),
            if run.crawl.failed_strategies.len() == 1 { "y" } else { "ies" }
        )
    } else {
        "primary".to_string()
    };
    let _ = writeln!(
        out,
        "**Strategy**: `{}` ({how}, {} harvester call{})",
        strategy.query(),
        run.crawl.attempts,
        if run.crawl.attempts == 1 { "" } else { "s" }
    );
    if run.crawl.partial {
        let _ = writeln!(
            out,
            "**Note**: no strategy reached the target; showing the largest partial result."
        );
    }
    let _ = writeln!(out, "**Posts analysed**: {}", report.total);
    let _ = writeln!(out);
    let _ = writeln!(out, "---");
    let _ = writeln!(out);

    let _ = writeln!(out, "## Distribution");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "| Label | Posts | Share | Avg replies | Avg likes | Avg retweets |"
    );
    let _ = writeln!(
        out,
        "|-------|-------|-------|-------------|-----------|--------------|"
    );
    for summary in &report.labels {
        let _ = writeln!(
            out,
            "| {} | {} | {:.1}% | {} |",
            title(summary.label),
            summary.count,
            summary.percentage,
            engagement_cells(summary)
        );
    }
    let _ = writeln!(out);
    let majority = report.majority.map_or("none (no posts)", title);
    let _ = writeln!(out, "**Majority**: {majority}");
    let _ = writeln!(out);

    let _ = writeln!(out, "## Top keywords");
    let _ = writeln!(out);
    for summary in &report.labels {
        let words = if summary.keywords.is_empty() {
            "_none_".to_string()
        } else {
            summary
                .keywords
                .iter()
                .map(|k| format!("{} ({})", k.word, k.count))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "- **{}**: {words}", title(summary.label));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Top {} posts", title(report.top_label).to_lowercase());
    let _ = writeln!(out);
    if report.top_posts.is_empty() {
        let _ = writeln!(out, "_No {} posts._", report.top_label);
    }
    for (i, classified) in report.top_posts.iter().enumerate() {
        let post = &classified.post;
        let _ = writeln!(
            out,
            "{}. @{} · {} replies · {} likes · {} retweets",
            i + 1,
            post.author,
            post.reply_count,
            post.like_count,
            post.retweet_count
        );
        let _ = writeln!(out, "   > {}", preview(&post.text));
        let _ = writeln!(out, "   {}", post.url());
    }

    out
}
