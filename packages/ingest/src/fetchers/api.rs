//! Fetcher for the commercial jobs API.
//!
//! Outbound HTTPS GET with bearer auth. HTTP error codes are mapped to a
//! generic upstream-unavailable condition so the orchestration layer can
//! degrade to cached data without caring about the specific status.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::SourceFetcher;
use crate::types::job::{JobSource, RawJob, SearchParams};

/// Response envelope the jobs API wraps results in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    jobs: Vec<RawJob>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    total_pages: Option<u32>,
}

/// HTTP client for a third-party jobs API.
pub struct ApiFetcher {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiFetcher {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Use a caller-provided HTTP client (custom timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn query_pairs(query: &SearchParams) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        pairs.push(("page".to_string(), query.page.unwrap_or(1).to_string()));
        if let Some(search) = &query.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(location) = &query.location {
            pairs.push(("location".to_string(), location.clone()));
        }
        if let Some(remote) = query.remote {
            pairs.push(("remote".to_string(), remote.to_string()));
        }
        for (key, value) in &query.extra {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }
}

#[async_trait]
impl SourceFetcher for ApiFetcher {
    async fn fetch(&self, query: &SearchParams) -> FetchResult<Vec<RawJob>> {
        debug!(url = %self.base_url, search = ?query.search, "jobs API fetch starting");

        let response = self
            .client
            .get(&self.base_url)
            .bearer_auth(&self.token)
            .query(&Self::query_pairs(query))
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.base_url, error = %e, "jobs API request failed");
                FetchError::Http(Box::new(e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::Auth);
        }
        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
            });
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        debug!(
            jobs = body.jobs.len(),
            total = ?body.total,
            page = ?body.page,
            total_pages = ?body.total_pages,
            "jobs API fetch completed"
        );

        Ok(body.jobs)
    }

    fn source(&self) -> JobSource {
        JobSource::Api
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_include_passthrough_filters() {
        let query = SearchParams::new("rust")
            .with_location("Oslo")
            .with_remote(true)
            .with_page(2)
            .with_extra("salary_min", "50000");

        let pairs = ApiFetcher::query_pairs(&query);

        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("search".to_string(), "rust".to_string())));
        assert!(pairs.contains(&("location".to_string(), "Oslo".to_string())));
        assert!(pairs.contains(&("remote".to_string(), "true".to_string())));
        assert!(pairs.contains(&("salary_min".to_string(), "50000".to_string())));
    }

    #[test]
    fn test_page_defaults_to_one() {
        let pairs = ApiFetcher::query_pairs(&SearchParams::default());
        assert!(pairs.contains(&("page".to_string(), "1".to_string())));
    }

    #[test]
    fn test_envelope_parses_with_missing_counts() {
        let body: ApiResponse =
            serde_json::from_str(r#"{"jobs": [{"title": "Dev", "description": "d"}]}"#).unwrap();
        assert_eq!(body.jobs.len(), 1);
        assert!(body.total.is_none());
    }
}
