//! Harvester backed by the `bird` CLI.
//!
//! Invokes `bird search --json -n {limit} [--auth-token ... --ct0 ...] -- "{query}"`
//! as a subprocess and parses the JSON array it prints on stdout. The query
//! always follows `--`, since it may start with an exclusion like `-buzzer`.

use std::collections::HashSet;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use tokio::process::Command;
use xsent_core::Post;

use crate::error::HarvestError;
use crate::harvester::Harvester;

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const STDERR_EXCERPT_CHARS: usize = 500;

static HTTP_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(400|401|403|429)\b").expect("valid regex"));

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BirdTweet {
    id: String,
    #[serde(default)]
    text: String,
    created_at: Option<String>,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
    lang: Option<String>,
    author: BirdAuthor,
}

#[derive(Deserialize)]
struct BirdAuthor {
    username: String,
}

pub struct BirdHarvester {
    program: String,
    /// Arguments placed before `search`, e.g. when the program is a launcher such as `npx`.
    prefix_args: Vec<String>,
    auth_token: Option<String>,
    ct0: Option<String>,
    timeout: Duration,
}

impl BirdHarvester {
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            prefix_args: Vec::new(),
            auth_token: None,
            ct0: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builds a harvester from a whitespace-separated command line such as
    /// `bird` or `npx @steipete/bird`. Blank input falls back to `bird`.
    #[must_use]
    pub fn from_command_line(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| "bird".to_string());
        let mut harvester = Self::new(&program);
        harvester.prefix_args = parts.collect();
        harvester
    }

    #[must_use]
    pub fn with_credentials(mut self, auth_token: Option<String>, ct0: Option<String>) -> Self {
        self.auth_token = auth_token;
        self.ct0 = ct0;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn search_args(&self, query: &str, limit: u32) -> Vec<String> {
        let mut args = self.prefix_args.clone();
        args.extend([
            "search".to_string(),
            "--json".to_string(),
            "-n".to_string(),
            limit.to_string(),
        ]);
        if let Some(token) = &self.auth_token {
            args.extend(["--auth-token".to_string(), token.clone()]);
        }
        if let Some(ct0) = &self.ct0 {
            args.extend(["--ct0".to_string(), ct0.clone()]);
        }
        args.extend(["--".to_string(), query.to_string()]);
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<std::process::Output, HarvestError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => Err(HarvestError::Timeout {
                secs: self.timeout.as_secs(),
            }),
            Ok(result) => result.map_err(|e| HarvestError::Spawn {
                program: self.program.clone(),
                source: e,
            }),
        }
    }

    /// Runs `bird --version` to confirm the executable is installed.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Spawn`] if it cannot be started, or
    /// [`HarvestError::Failed`] on a non-zero exit.
    pub async fn version(&self) -> Result<String, HarvestError> {
        let mut args = self.prefix_args.clone();
        args.push("--version".to_string());
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(HarvestError::Failed {
                code: output.status.code(),
                stderr: excerpt(&String::from_utf8_lossy(&output.stderr)),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Harvester for BirdHarvester {
    async fn harvest(&self, query: &str, limit: u32) -> Result<Vec<Post>, HarvestError> {
        tracing::debug!(query, limit, program = %self.program, "running bird search");
        let output = self.run(self.search_args(query, limit)).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let err = categorize_failure(output.status.code(), &stderr);
            tracing::warn!(query, kind = err.kind(), "bird search returned non-zero exit");
            return Err(err);
        }

        let posts = parse_posts(&output.stdout)?;
        tracing::debug!(query, count = posts.len(), "bird search finished");
        Ok(posts)
    }
}

/// Maps a failed run to an error category using its stderr text.
pub(crate) fn categorize_failure(code: Option<i32>, stderr: &str) -> HarvestError {
    let lower = stderr.to_lowercase();
    let status = HTTP_STATUS
        .captures(&lower)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    let message = excerpt(stderr);

    if status == Some("429") || lower.contains("rate limit") || lower.contains("too many requests")
    {
        HarvestError::RateLimited(message)
    } else if matches!(status, Some("401" | "403"))
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
        || lower.contains("authenticat")
        || lower.contains("auth token")
    {
        HarvestError::AuthExpired(message)
    } else if status == Some("400") || lower.contains("invalid query") || lower.contains("bad request")
    {
        HarvestError::MalformedQuery(message)
    } else {
        HarvestError::Failed {
            code,
            stderr: message,
        }
    }
}

/// Parses bird's JSON output, dropping duplicate ids and posts without text.
pub(crate) fn parse_posts(stdout: &[u8]) -> Result<Vec<Post>, HarvestError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let tweets: Vec<BirdTweet> =
        serde_json::from_slice(stdout).map_err(|e| HarvestError::Output {
            context: "bird search output".to_string(),
            source: e,
        })?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut posts = Vec::with_capacity(tweets.len());
    for tweet in tweets {
        if tweet.text.trim().is_empty() || !seen.insert(tweet.id.clone()) {
            continue;
        }
        posts.push(Post {
            created_at: tweet.created_at.as_deref().and_then(parse_created_at),
            id: tweet.id,
            author: tweet.author.username,
            text: tweet.text,
            reply_count: tweet.reply_count,
            like_count: tweet.like_count,
            retweet_count: tweet.retweet_count,
            lang: tweet.lang,
        });
    }
    Ok(posts)
}

/// Accepts RFC 3339 and the legacy `Wed Oct 10 20:19:24 +0000 2018` form.
fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn excerpt(stderr: &str) -> String {
    stderr.trim().chars().take(STDERR_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_bird_output() {
        let json = br#"[
            {
                "id": "1234567890",
                "text": "Harga beras naik lagi",
                "createdAt": "2024-01-01T08:00:00Z",
                "replyCount": 3,
                "likeCount": 42,
                "retweetCount": 7,
                "lang": "in",
                "author": { "username": "warga", "name": "Warga" },
                "authorId": "111"
            }
        ]"#;
        let posts = parse_posts(json).unwrap();
        assert_eq!(posts.len(), 1);
        let p = &posts[0];
        assert_eq!(p.id, "1234567890");
        assert_eq!(p.author, "warga");
        assert_eq!(p.reply_count, 3);
        assert_eq!(p.like_count, 42);
        assert_eq!(p.retweet_count, 7);
        assert_eq!(p.lang.as_deref(), Some("in"));
        assert_eq!(
            p.created_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn missing_counts_default_to_zero() {
        let json = br#"[{ "id": "1", "text": "halo", "author": { "username": "a" } }]"#;
        let posts = parse_posts(json).unwrap();
        assert_eq!(posts[0].reply_count, 0);
        assert!(posts[0].created_at.is_none());
        assert!(posts[0].lang.is_none());
    }

    #[test]
    fn drops_duplicates_and_empty_text() {
        let json = br#"[
            { "id": "1", "text": "pertama", "author": { "username": "a" } },
            { "id": "1", "text": "pertama lagi", "author": { "username": "a" } },
            { "id": "2", "text": "   ", "author": { "username": "b" } },
            { "id": "3", "text": "ketiga", "author": { "username": "c" } }
        ]"#;
        let posts = parse_posts(json).unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(posts[0].text, "pertama");
    }

    #[test]
    fn blank_output_is_no_posts() {
        assert!(parse_posts(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn malformed_output_is_error() {
        let err = parse_posts(b"not json").unwrap_err();
        assert!(matches!(err, HarvestError::Output { .. }));
    }

    #[test]
    fn parses_legacy_timestamp() {
        let dt = parse_created_at("Wed Oct 10 20:19:24 +0000 2018").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap());
        assert!(parse_created_at("yesterday").is_none());
    }

    #[test]
    fn categorizes_stderr() {
        assert!(matches!(
            categorize_failure(Some(1), "Error: 429 Too Many Requests"),
            HarvestError::RateLimited(_)
        ));
        assert!(matches!(
            categorize_failure(Some(1), "Rate limit exceeded"),
            HarvestError::RateLimited(_)
        ));
        assert!(matches!(
            categorize_failure(Some(1), "HTTP 401 Unauthorized"),
            HarvestError::AuthExpired(_)
        ));
        assert!(matches!(
            categorize_failure(Some(1), "Invalid query syntax"),
            HarvestError::MalformedQuery(_)
        ));
        assert!(matches!(
            categorize_failure(Some(2), "segfault at 0x4001"),
            HarvestError::Failed { code: Some(2), .. }
        ));
    }

    #[test]
    fn search_args_include_credentials_when_set() {
        let harvester = BirdHarvester::new("bird")
            .with_credentials(Some("tok".to_string()), Some("ct".to_string()));
        assert_eq!(
            harvester.search_args("banjir lang:id", 50),
            vec![
                "search",
                "--json",
                "-n",
                "50",
                "--auth-token",
                "tok",
                "--ct0",
                "ct",
                "--",
                "banjir lang:id"
            ]
        );
    }

    #[test]
    fn leading_exclusion_follows_end_of_options() {
        let args = BirdHarvester::new("bird").search_args("-buzzer banjir", 10);
        assert_eq!(args, vec!["search", "--json", "-n", "10", "--", "-buzzer banjir"]);
    }

    #[test]
    fn command_line_splits_launcher_args() {
        let harvester = BirdHarvester::from_command_line("npx @steipete/bird");
        assert_eq!(harvester.program, "npx");
        assert_eq!(
            harvester.search_args("q", 10),
            vec!["@steipete/bird", "search", "--json", "-n", "10", "--", "q"]
        );
        assert_eq!(BirdHarvester::from_command_line("  ").program, "bird");
    }
}
