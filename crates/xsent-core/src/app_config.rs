use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub twitter_auth_token: Option<String>,
    pub twitter_ct0: Option<String>,
    pub harvester_bin: String,
    pub harvest_timeout_secs: u64,
    pub crawl_min_fraction: f64,
    pub crawl_max_retries: u32,
    pub crawl_retry_delay_ms: u64,
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub groq_model: String,
    pub llm_timeout_secs: u64,
    pub translate_url: String,
    pub translate_timeout_secs: u64,
    pub translate_max_concurrent: usize,
    pub classify_workers: usize,
    pub sentiment_threshold: f32,
    pub default_limit: u32,
    pub default_window_days: u32,
    pub output_dir: PathBuf,
    pub slang_path: Option<PathBuf>,
    pub discord_webhook_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "twitter_auth_token",
                &self.twitter_auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field("twitter_ct0", &self.twitter_ct0.as_ref().map(|_| "[redacted]"))
            .field("harvester_bin", &self.harvester_bin)
            .field("harvest_timeout_secs", &self.harvest_timeout_secs)
            .field("crawl_min_fraction", &self.crawl_min_fraction)
            .field("crawl_max_retries", &self.crawl_max_retries)
            .field("crawl_retry_delay_ms", &self.crawl_retry_delay_ms)
            .field(
                "groq_api_key",
                &self.groq_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("groq_base_url", &self.groq_base_url)
            .field("groq_model", &self.groq_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("translate_url", &self.translate_url)
            .field("translate_timeout_secs", &self.translate_timeout_secs)
            .field("translate_max_concurrent", &self.translate_max_concurrent)
            .field("classify_workers", &self.classify_workers)
            .field("sentiment_threshold", &self.sentiment_threshold)
            .field("default_limit", &self.default_limit)
            .field("default_window_days", &self.default_window_days)
            .field("output_dir", &self.output_dir)
            .field("slang_path", &self.slang_path)
            .field(
                "discord_webhook_url",
                &self.discord_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
