use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use engine_logging::engine_info;
use expander_core::RunLimits;
use expander_engine::{FetchSettings, RunSettings};

/// Application configuration loaded from environment variables, optionally
/// seeded from a `.env` file in the working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // Search endpoint
    pub endpoint: String,
    pub language: String,
    pub categories: String,
    pub safesearch: u8,
    pub page_size_hint: Option<usize>,

    // Limits
    pub target_unique: usize,
    pub max_pages: u32,

    // Pacing and retries (seconds)
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    pub request_timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_wait_min_secs: u64,
    pub retry_wait_max_secs: u64,
    pub cooldown_secs: u64,

    // Files
    pub output_path: PathBuf,
    pub modifier_file: PathBuf,
    pub state_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        // A missing .env is normal; the process environment is enough.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unset and blank values
    /// fall back to defaults; unparsable values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let endpoint = get("SEARXNG_URL")
            .map(|value| value.trim().to_string())
            .ok_or_else(|| anyhow!("SEARXNG_URL environment variable is required"))?;

        let config = Self {
            endpoint,
            language: get("SEARCH_LANGUAGE").unwrap_or_else(|| "en-US".to_string()),
            categories: get("SEARCH_CATEGORIES").unwrap_or_else(|| "general".to_string()),
            safesearch: parse_or(&get, "SEARCH_SAFESEARCH", 0)?,
            page_size_hint: parse_optional(&get, "PAGE_SIZE_HINT")?,
            target_unique: parse_or(&get, "TOP_N_RESULTS_PER_QUERY", 2666)?,
            max_pages: parse_or(&get, "MAX_PAGES_TO_FETCH_PER_QUERY", 100)?,
            min_delay_secs: parse_or(&get, "MIN_DELAY_SECONDS", 94.2)?,
            max_delay_secs: parse_or(&get, "MAX_DELAY_SECONDS", 300.0)?,
            request_timeout_secs: parse_or(&get, "REQUEST_TIMEOUT", 30)?,
            retry_attempts: parse_or(&get, "RETRY_ATTEMPTS", 3)?,
            retry_wait_min_secs: parse_or(&get, "RETRY_WAIT_MIN_SECONDS", 30)?,
            retry_wait_max_secs: parse_or(&get, "RETRY_WAIT_MAX_SECONDS", 300)?,
            cooldown_secs: parse_or(&get, "COOLDOWN_SECONDS", 600)?,
            output_path: get("OUTPUT_CSV_FILENAME")
                .unwrap_or_else(|| "queries_with_urls.csv".to_string())
                .into(),
            modifier_file: get("MODIFIER_FILE")
                .unwrap_or_else(|| "modifiers.csv".to_string())
                .into(),
            state_file: get("STATE_FILE")
                .unwrap_or_else(|| "searxng_scraper_state.ron".to_string())
                .into(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("MIN_DELAY_SECONDS", self.min_delay_secs),
            ("MAX_DELAY_SECONDS", self.max_delay_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{key} must be a non-negative number of seconds, got {value}");
            }
        }
        if self.min_delay_secs > self.max_delay_secs {
            bail!(
                "MIN_DELAY_SECONDS ({}) is greater than MAX_DELAY_SECONDS ({})",
                self.min_delay_secs,
                self.max_delay_secs
            );
        }
        if self.retry_wait_min_secs > self.retry_wait_max_secs {
            bail!(
                "RETRY_WAIT_MIN_SECONDS ({}) is greater than RETRY_WAIT_MAX_SECONDS ({})",
                self.retry_wait_min_secs,
                self.retry_wait_max_secs
            );
        }
        if self.retry_attempts == 0 {
            bail!("RETRY_ATTEMPTS must be at least 1");
        }
        if self.max_pages == 0 {
            bail!("MAX_PAGES_TO_FETCH_PER_QUERY must be at least 1");
        }
        if self.target_unique == 0 {
            bail!("TOP_N_RESULTS_PER_QUERY must be at least 1");
        }
        if self.page_size_hint == Some(0) {
            bail!("PAGE_SIZE_HINT must be at least 1 when set");
        }
        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            endpoint: self.endpoint.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_attempts: self.retry_attempts,
            retry_wait_min: Duration::from_secs(self.retry_wait_min_secs),
            retry_wait_max: Duration::from_secs(self.retry_wait_max_secs),
            page_size_hint: self.page_size_hint,
            language: self.language.clone(),
            categories: self.categories.clone(),
            safesearch: self.safesearch,
            ..FetchSettings::default()
        }
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            limits: RunLimits {
                target_unique: self.target_unique,
                max_pages: self.max_pages,
            },
            min_delay: Duration::from_secs_f64(self.min_delay_secs),
            max_delay: Duration::from_secs_f64(self.max_delay_secs),
            cooldown: Duration::from_secs(self.cooldown_secs),
        }
    }

    pub fn log_summary(&self) {
        engine_info!("Search endpoint: {}", self.endpoint);
        engine_info!(
            "Target {} unique results per query, at most {} pages",
            self.target_unique,
            self.max_pages
        );
        engine_info!(
            "Delay between requests {:.1}-{:.1}s, cooldown after an empty page {}s",
            self.min_delay_secs,
            self.max_delay_secs,
            self.cooldown_secs
        );
        engine_info!(
            "Output {:?}, modifiers {:?}, session state {:?}",
            self.output_path,
            self.modifier_file,
            self.state_file
        );
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(parse_optional(get, key)?.unwrap_or(default))
}

fn parse_optional<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|err| anyhow!("{key} has invalid value {raw:?}: {err}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_endpoint_is_set() {
        let config = config_from(&[("SEARXNG_URL", "http://localhost:8080/search")])
            .expect("valid config");
        assert_eq!(config.target_unique, 2666);
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.min_delay_secs, 94.2);
        assert_eq!(config.max_delay_secs, 300.0);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.cooldown_secs, 600);
        assert_eq!(config.page_size_hint, None);
        assert_eq!(config.output_path, PathBuf::from("queries_with_urls.csv"));
        assert_eq!(config.state_file, PathBuf::from("searxng_scraper_state.ron"));
    }

    #[test]
    fn endpoint_is_required() {
        let err = config_from(&[]).expect_err("missing endpoint");
        assert!(err.to_string().contains("SEARXNG_URL"));

        let err = config_from(&[("SEARXNG_URL", "  ")]).expect_err("blank endpoint");
        assert!(err.to_string().contains("SEARXNG_URL"));
    }

    #[test]
    fn invalid_numbers_name_the_variable() {
        let err = config_from(&[
            ("SEARXNG_URL", "http://localhost:8080/search"),
            ("RETRY_ATTEMPTS", "three"),
        ])
        .expect_err("bad number");
        assert!(err.to_string().contains("RETRY_ATTEMPTS"));
    }

    #[test]
    fn inverted_delay_bounds_are_rejected() {
        let err = config_from(&[
            ("SEARXNG_URL", "http://localhost:8080/search"),
            ("MIN_DELAY_SECONDS", "10"),
            ("MAX_DELAY_SECONDS", "5"),
        ])
        .expect_err("min above max");
        assert!(err.to_string().contains("MIN_DELAY_SECONDS"));
    }

    #[test]
    fn overrides_flow_into_engine_settings() {
        let config = config_from(&[
            ("SEARXNG_URL", "http://search.local/search"),
            ("TOP_N_RESULTS_PER_QUERY", "50"),
            ("MAX_PAGES_TO_FETCH_PER_QUERY", "7"),
            ("MIN_DELAY_SECONDS", "1.5"),
            ("MAX_DELAY_SECONDS", "2"),
            ("COOLDOWN_SECONDS", "20"),
            ("PAGE_SIZE_HINT", "10"),
            ("SEARCH_SAFESEARCH", "2"),
        ])
        .expect("valid config");

        let run = config.run_settings();
        assert_eq!(run.limits.target_unique, 50);
        assert_eq!(run.limits.max_pages, 7);
        assert_eq!(run.min_delay, Duration::from_millis(1500));
        assert_eq!(run.cooldown, Duration::from_secs(20));

        let fetch = config.fetch_settings();
        assert_eq!(fetch.endpoint, "http://search.local/search");
        assert_eq!(fetch.page_size_hint, Some(10));
        assert_eq!(fetch.safesearch, 2);
        assert_eq!(fetch.max_attempts, 3);
    }
}
