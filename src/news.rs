//! News search client for the NewsAPI `everything` endpoint.
//!
//! One request per run, scoped to a single day (`from == to`) and sorted by
//! popularity on the server side:
//!
//! ```text
//! GET {news_api_url}?q=trending&from=2024-01-01&to=2024-01-01
//!     &language=en&pageSize=20&sortBy=popularity&apiKey=...
//! ```
//!
//! A response whose `status` is not `"ok"` becomes
//! [`FetchOutcome::Failed`] carrying the raw body; it is never retried.

use crate::config::Settings;
use crate::error::Result;
use crate::models::{FetchFailure, FetchOutcome, NewsApiResponse};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use reqwest::Client;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Success sentinel of the `status` field.
const STATUS_OK: &str = "ok";

/// Anything that can produce the articles for a given day.
pub trait NewsSource {
    /// Fetch the articles published on `day`.
    ///
    /// # Returns
    ///
    /// - `Ok(FetchOutcome::Articles(..))`, possibly empty, on success
    /// - `Ok(FetchOutcome::Failed(..))` when the API itself reports failure
    /// - `Err(..)` for transport or decoding errors
    async fn fetch(&self, day: NaiveDate) -> Result<FetchOutcome>;
}

/// Query parameters that stay fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub query: String,
    pub language: String,
    pub page_size: u32,
}

impl From<&Settings> for NewsQuery {
    fn from(settings: &Settings) -> Self {
        Self {
            query: settings.query.clone(),
            language: settings.language.clone(),
            page_size: settings.page_size,
        }
    }
}

pub struct NewsApiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    query: NewsQuery,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("query", &self.query)
            .finish()
    }
}

impl NewsApiClient {
    /// Build a client for one endpoint and key.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client
    /// * `endpoint` - Full URL of the `everything` endpoint
    /// * `api_key` - Sent as the `apiKey` query parameter
    /// * `query` - Search term, language and page size
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DigestError::Url`] if `endpoint` does not parse.
    pub fn new(http: Client, endpoint: &str, api_key: String, query: NewsQuery) -> Result<Self> {
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
            api_key,
            query,
        })
    }

    /// The full request URL for `day`, API key included.
    pub fn request_url(&self, day: NaiveDate) -> Result<Url> {
        let day = day.format("%Y-%m-%d").to_string();
        let page_size = self.query.page_size.to_string();
        let url = Url::parse_with_params(
            self.endpoint.as_str(),
            &[
                ("q", self.query.query.as_str()),
                ("from", day.as_str()),
                ("to", day.as_str()),
                ("language", self.query.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("sortBy", "popularity"),
                ("apiKey", self.api_key.as_str()),
            ],
        )?;
        Ok(url)
    }
}

/// Turn a decoded response body into the fetch outcome.
///
/// Split out from the HTTP call so the status handling can be tested
/// without a server.
///
/// # Arguments
///
/// * `body` - The response body, whatever its HTTP status
///
/// # Returns
///
/// [`FetchOutcome::Failed`] with `body` as `details` unless `status` is
/// `"ok"`; otherwise the decoded articles.
///
/// # Examples
///
/// ```ignore
/// let outcome = interpret_response(json!({"status": "error", "code": "apiKeyInvalid"}))?;
/// assert!(matches!(outcome, FetchOutcome::Failed(_)));
/// ```
pub fn interpret_response(body: serde_json::Value) -> Result<FetchOutcome> {
    let status = body.get("status").and_then(|s| s.as_str());
    if status != Some(STATUS_OK) {
        return Ok(FetchOutcome::Failed(FetchFailure {
            error: "Failed to fetch news".to_string(),
            details: body,
        }));
    }
    let parsed: NewsApiResponse = serde_json::from_value(body)?;
    debug!(status = %parsed.status, total_results = ?parsed.total_results, "Decoded news response");
    Ok(FetchOutcome::Articles(parsed.articles))
}

impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(%day))]
    async fn fetch(&self, day: NaiveDate) -> Result<FetchOutcome> {
        let t0 = Instant::now();
        let url = self.request_url(day)?;

        // NewsAPI reports errors as JSON with a non-2xx status, so the body
        // is decoded regardless of the HTTP status.
        let resp = self.http.get(url).send().await?;
        let http_status = resp.status();
        let text = resp.text().await?;
        let body: serde_json::Value = serde_json::from_str(&text)?;

        let outcome = interpret_response(body)?;
        let dt = t0.elapsed();
        match &outcome {
            FetchOutcome::Articles(articles) => info!(
                count = articles.len(),
                elapsed_ms = dt.as_millis(),
                "Fetched articles"
            ),
            FetchOutcome::Failed(failure) => warn!(
                %http_status,
                elapsed_ms = dt.as_millis(),
                details = %truncate_for_log(&failure.details.to_string(), 300),
                "News API reported failure"
            ),
        }
        Ok(outcome)
    }
}
