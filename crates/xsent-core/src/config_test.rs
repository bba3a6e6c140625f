use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn with_var<'a>(key: &'a str, value: &'a str) -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert(key, value);
    m
}

fn assert_invalid(result: Result<AppConfig, ConfigError>, expected_var: &str) {
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == expected_var),
        "expected InvalidEnvVar({expected_var}), got: {result:?}"
    );
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "XSENT_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.twitter_auth_token.is_none());
    assert!(cfg.twitter_ct0.is_none());
    assert_eq!(cfg.harvester_bin, "bird");
    assert_eq!(cfg.harvest_timeout_secs, 300);
    assert!((cfg.crawl_min_fraction - 0.2).abs() < f64::EPSILON);
    assert_eq!(cfg.crawl_max_retries, 2);
    assert_eq!(cfg.crawl_retry_delay_ms, 2000);
    assert!(cfg.groq_api_key.is_none());
    assert_eq!(cfg.groq_base_url, "https://api.groq.com/openai/v1");
    assert_eq!(cfg.groq_model, "llama-3.1-8b-instant");
    assert_eq!(cfg.llm_timeout_secs, 30);
    assert_eq!(cfg.translate_url, "https://translate.googleapis.com");
    assert_eq!(cfg.translate_timeout_secs, 10);
    assert_eq!(cfg.translate_max_concurrent, 4);
    assert_eq!(cfg.classify_workers, 4);
    assert!((cfg.sentiment_threshold - 0.05).abs() < f32::EPSILON);
    assert_eq!(cfg.default_limit, 100);
    assert_eq!(cfg.default_window_days, 30);
    assert_eq!(cfg.output_dir, PathBuf::from("results"));
    assert!(cfg.slang_path.is_none());
    assert!(cfg.discord_webhook_url.is_none());
}

#[test]
fn blank_credentials_are_treated_as_absent() {
    let map = with_var("GROQ_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.groq_api_key.is_none());
}

#[test]
fn credentials_are_read_when_present() {
    let mut map = with_var("TWITTER_AUTH_TOKEN", "tok");
    map.insert("TWITTER_CT0", "ct0");
    map.insert("GROQ_API_KEY", "gsk_test");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.twitter_auth_token.as_deref(), Some("tok"));
    assert_eq!(cfg.twitter_ct0.as_deref(), Some("ct0"));
    assert_eq!(cfg.groq_api_key.as_deref(), Some("gsk_test"));
}

#[test]
fn debug_output_redacts_credentials() {
    let mut map = with_var("TWITTER_AUTH_TOKEN", "super-secret-token");
    map.insert("GROQ_API_KEY", "gsk_secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret-token"));
    assert!(!rendered.contains("gsk_secret"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn harvest_timeout_override() {
    let map = with_var("XSENT_HARVEST_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.harvest_timeout_secs, 60);
}

#[test]
fn harvest_timeout_zero_is_invalid() {
    let map = with_var("XSENT_HARVEST_TIMEOUT_SECS", "0");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "XSENT_HARVEST_TIMEOUT_SECS",
    );
}

#[test]
fn crawl_max_retries_invalid() {
    let map = with_var("XSENT_CRAWL_MAX_RETRIES", "not-a-number");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "XSENT_CRAWL_MAX_RETRIES",
    );
}

#[test]
fn crawl_max_retries_zero_disables_retries() {
    let map = with_var("XSENT_CRAWL_MAX_RETRIES", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.crawl_max_retries, 0);
}

#[test]
fn crawl_min_fraction_out_of_range() {
    let map = with_var("XSENT_CRAWL_MIN_FRACTION", "1.5");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "XSENT_CRAWL_MIN_FRACTION",
    );
}

#[test]
fn crawl_min_fraction_override() {
    let map = with_var("XSENT_CRAWL_MIN_FRACTION", "0.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.crawl_min_fraction - 0.5).abs() < f64::EPSILON);
}

#[test]
fn sentiment_threshold_must_be_below_one() {
    let map = with_var("XSENT_SENTIMENT_THRESHOLD", "1.0");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "XSENT_SENTIMENT_THRESHOLD",
    );
}

#[test]
fn classify_workers_zero_is_invalid() {
    let map = with_var("XSENT_CLASSIFY_WORKERS", "0");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "XSENT_CLASSIFY_WORKERS",
    );
}

#[test]
fn default_limit_override() {
    let map = with_var("XSENT_DEFAULT_LIMIT", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.default_limit, 250);
}

#[test]
fn default_limit_invalid() {
    let map = with_var("XSENT_DEFAULT_LIMIT", "-5");
    assert_invalid(
        build_app_config(lookup_from_map(&map)),
        "XSENT_DEFAULT_LIMIT",
    );
}

#[test]
fn slang_path_and_output_dir_override() {
    let mut map = with_var("XSENT_SLANG_PATH", "./config/slang.yaml");
    map.insert("XSENT_OUTPUT_DIR", "/tmp/out");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.slang_path, Some(PathBuf::from("./config/slang.yaml")));
    assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
}
