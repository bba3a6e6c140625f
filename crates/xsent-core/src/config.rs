use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; credentials are optional here and checked by
/// the command that needs them.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse = |var: &str, default: &str| -> ParsedVar {
        ParsedVar {
            var: var.to_string(),
            raw: or_default(var, default),
        }
    };

    let env = parse_environment(&or_default("XSENT_ENV", "development"))?;
    let log_level = or_default("XSENT_LOG_LEVEL", "info");

    let twitter_auth_token = optional("TWITTER_AUTH_TOKEN");
    let twitter_ct0 = optional("TWITTER_CT0");
    let harvester_bin = or_default("XSENT_HARVESTER_BIN", "bird");
    let harvest_timeout_secs = parse("XSENT_HARVEST_TIMEOUT_SECS", "300").positive::<u64>()?;

    let crawl_min_fraction = parse("XSENT_CRAWL_MIN_FRACTION", "0.2").get::<f64>()?;
    if !(0.0..=1.0).contains(&crawl_min_fraction) {
        return Err(ConfigError::InvalidEnvVar {
            var: "XSENT_CRAWL_MIN_FRACTION".to_string(),
            reason: format!("{crawl_min_fraction} is outside [0, 1]"),
        });
    }
    let crawl_max_retries = parse("XSENT_CRAWL_MAX_RETRIES", "2").get::<u32>()?;
    let crawl_retry_delay_ms = parse("XSENT_CRAWL_RETRY_DELAY_MS", "2000").get::<u64>()?;

    let groq_api_key = optional("GROQ_API_KEY");
    let groq_base_url = or_default("GROQ_BASE_URL", "https://api.groq.com/openai/v1");
    let groq_model = or_default("GROQ_MODEL", "llama-3.1-8b-instant");
    let llm_timeout_secs = parse("XSENT_LLM_TIMEOUT_SECS", "30").positive::<u64>()?;

    let translate_url = or_default("XSENT_TRANSLATE_URL", "https://translate.googleapis.com");
    let translate_timeout_secs = parse("XSENT_TRANSLATE_TIMEOUT_SECS", "10").positive::<u64>()?;
    let translate_max_concurrent =
        parse("XSENT_TRANSLATE_MAX_CONCURRENT", "4").positive::<usize>()?;
    let classify_workers = parse("XSENT_CLASSIFY_WORKERS", "4").positive::<usize>()?;

    let sentiment_threshold = parse("XSENT_SENTIMENT_THRESHOLD", "0.05").get::<f32>()?;
    if !(0.0..1.0).contains(&sentiment_threshold) {
        return Err(ConfigError::InvalidEnvVar {
            var: "XSENT_SENTIMENT_THRESHOLD".to_string(),
            reason: format!("{sentiment_threshold} is outside [0, 1)"),
        });
    }

    let default_limit = parse("XSENT_DEFAULT_LIMIT", "100").positive::<u32>()?;
    let default_window_days = parse("XSENT_DEFAULT_WINDOW_DAYS", "30").get::<u32>()?;
    let output_dir = PathBuf::from(or_default("XSENT_OUTPUT_DIR", "results"));
    let slang_path = optional("XSENT_SLANG_PATH").map(PathBuf::from);
    let discord_webhook_url = optional("DISCORD_WEBHOOK_URL");

    Ok(AppConfig {
        env,
        log_level,
        twitter_auth_token,
        twitter_ct0,
        harvester_bin,
        harvest_timeout_secs,
        crawl_min_fraction,
        crawl_max_retries,
        crawl_retry_delay_ms,
        groq_api_key,
        groq_base_url,
        groq_model,
        llm_timeout_secs,
        translate_url,
        translate_timeout_secs,
        translate_max_concurrent,
        classify_workers,
        sentiment_threshold,
        default_limit,
        default_window_days,
        output_dir,
        slang_path,
        discord_webhook_url,
    })
}

/// A raw env value paired with its variable name for error reporting.
struct ParsedVar {
    var: String,
    raw: String,
}

impl ParsedVar {
    fn get<T>(&self) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: self.var.clone(),
                reason: e.to_string(),
            })
    }

    fn positive<T>(&self) -> Result<T, ConfigError>
    where
        T: FromStr + PartialEq + Default,
        T::Err: std::fmt::Display,
    {
        let value = self.get::<T>()?;
        if value == T::default() {
            return Err(ConfigError::InvalidEnvVar {
                var: self.var.clone(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "XSENT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
