use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::models::SearchResponse;

pub const DEFAULT_API_BASE: &str = "https://hn.algolia.com/api/v1";

const PARAM_SEARCH: &str = "query=";
const PARAM_PAGE: &str = "page=";

/// `{base}/search?query={term}&page={page}`. The term is percent-encoded, so
/// plain words produce the same URL as raw concatenation.
pub fn build_url(base: &str, search_term: &str, page: u32) -> String {
    format!(
        "{}/search?{}{}&{}{}",
        base.trim_end_matches('/'),
        PARAM_SEARCH,
        urlencoding::encode(search_term),
        PARAM_PAGE,
        page
    )
}

/// Best-effort inverse of [`build_url`]: takes the text between the last `?`
/// and the last `&`, minus the `query=` prefix. Never fails; malformed input
/// yields whatever substring those delimiters describe.
pub fn extract_search_term(url: &str) -> String {
    let start = url.rfind('?').map(|pos| pos + 1).unwrap_or(0);
    let end = match url.rfind('&') {
        Some(pos) if pos >= start => pos,
        _ => url.len(),
    };

    let raw = url[start..end].replacen(PARAM_SEARCH, "", 1);
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}

/// The HTTP transport as seen by the fetch orchestrator.
#[async_trait]
pub trait StoryFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<SearchResponse>;
}

pub struct SearchClient {
    client: Client,
}

impl SearchClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hacker_stories/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl StoryFetcher for SearchClient {
    async fn fetch(&self, url: &str) -> Result<SearchResponse> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body: SearchResponse = response.json().await?;
        debug!(url, hits = body.hits.len(), page = body.page, "search response decoded");
        Ok(body)
    }
}
