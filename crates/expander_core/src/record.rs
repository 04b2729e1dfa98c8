/// A single search hit attributed to the derived query that produced it.
/// The URL is the session-wide dedup key; the title is informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub query: String,
    pub title: String,
    pub url: String,
}

impl ResultRecord {
    pub fn new(query: impl Into<String>, title: impl AsRef<str>, url: impl AsRef<str>) -> Self {
        Self {
            query: query.into(),
            title: title.as_ref().trim().to_string(),
            url: url.as_ref().trim().to_string(),
        }
    }
}

/// Classified result of fetching one page, after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Results {
        items: Vec<ResultRecord>,
        has_more: bool,
    },
    Empty,
    TransientError(String),
    FatalError(String),
}
