use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use expander_core::{backoff_delay, FetchOutcome, ResultRecord};
use futures_util::StreamExt;
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;

use crate::{FailureKind, FetchError};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Search endpoint, e.g. `http://localhost:8080/search`.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub retry_wait_min: Duration,
    pub retry_wait_max: Duration,
    pub max_bytes: u64,
    /// Raw results on a full page. A shorter page clears `has_more`.
    pub page_size_hint: Option<usize>,
    pub language: String,
    pub categories: String,
    pub safesearch: u8,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/search".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_wait_min: Duration::from_secs(30),
            retry_wait_max: Duration::from_secs(300),
            max_bytes: 5 * 1024 * 1024,
            page_size_hint: None,
            language: "en-US".to_string(),
            categories: "general".to_string(),
            safesearch: 0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches one page of results for a query and classifies the response.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, query: &str, page: u32) -> FetchOutcome;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Fetcher for SearXNG-style JSON search endpoints.
#[derive(Debug, Clone)]
pub struct SearxFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl SearxFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        url::Url::parse(&settings.endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn page_url(&self, query: &str, page: u32) -> Result<url::Url, FetchError> {
        let mut url = url::Url::parse(&self.settings.endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("pageno", &page.to_string())
            .append_pair("language", &self.settings.language)
            .append_pair("categories", &self.settings.categories)
            .append_pair("safesearch", &self.settings.safesearch.to_string());
        Ok(url)
    }

    /// One request, no retries.
    async fn attempt(&self, query: &str, page: u32) -> Result<SearchResponse, FetchError> {
        let url = self.page_url(query, page)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            match response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
            {
                Some(after) => engine_warn!(
                    "rate limited (429) on page {page}; server suggests waiting {after} seconds"
                ),
                None => engine_warn!("rate limited (429) on page {page}"),
            }
        }
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::MalformedResponse, err.to_string()))
    }

    fn classify(&self, query: &str, response: SearchResponse) -> FetchOutcome {
        let raw_count = response.results.len();
        if raw_count == 0 {
            return FetchOutcome::Empty;
        }
        let items = response
            .results
            .into_iter()
            .filter_map(|hit| {
                let url = hit.url?;
                if url.trim().is_empty() {
                    return None;
                }
                Some(ResultRecord::new(
                    query,
                    hit.title.unwrap_or_default(),
                    url,
                ))
            })
            .collect();
        let has_more = self
            .settings
            .page_size_hint
            .map_or(true, |full| raw_count >= full);
        FetchOutcome::Results { items, has_more }
    }
}

#[async_trait::async_trait]
impl PageFetcher for SearxFetcher {
    async fn fetch_page(&self, query: &str, page: u32) -> FetchOutcome {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(query, page).await {
                Ok(response) => return self.classify(query, response),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = backoff_delay(
                        attempt,
                        self.settings.retry_wait_min,
                        self.settings.retry_wait_max,
                    );
                    engine_warn!(
                        "attempt {attempt}/{max_attempts} for page {page} failed ({err}); retrying in {}s",
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    return FetchOutcome::TransientError(format!(
                        "page {page} failed after {attempt} attempts: {err}"
                    ));
                }
                Err(err) => {
                    engine_debug!("page {page} failed permanently after {attempt} attempt(s): {err}");
                    return FetchOutcome::FatalError(format!("page {page}: {err}"));
                }
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::MalformedResponse, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
