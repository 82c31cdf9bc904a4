//! Data models for fetched articles, AI summaries and digest entries.
//!
//! - [`Article`]: one record from the news search API, immutable once fetched
//! - [`NewsApiResponse`]: the `everything` endpoint's success body
//! - [`FetchOutcome`] / [`FetchFailure`]: what the fetcher hands the pipeline
//! - [`Summary`] and [`DigestEntry`]: per-article AI output and its rank
//!
//! Nothing here outlives a single pipeline run.

use serde::{Deserialize, Deserializer, Serialize};

/// Body text used when an article carries neither a description nor content.
pub const PLACEHOLDER_BODY: &str = "Article content is too short to summarize.";

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The publisher block of a NewsAPI article.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A news article as returned by the search API.
///
/// NewsAPI sends `null` for missing text fields, so every text field
/// defaults to empty rather than failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: ArticleSource,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Only present on some plans; absent means 0.
    #[serde(default)]
    pub popularity: Option<f64>,
}

impl Article {
    pub fn popularity_score(&self) -> f64 {
        self.popularity.unwrap_or(0.0)
    }

    /// The text handed to the summarizer: description, then content, then
    /// [`PLACEHOLDER_BODY`]. Blank strings count as absent.
    pub fn body(&self) -> &str {
        [self.description.as_deref(), self.content.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(PLACEHOLDER_BODY)
    }
}

/// Success body of `GET /v2/everything`.
#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default, rename = "totalResults")]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Reported when the news API answers with a non-`ok` status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub error: String,
    /// The raw response body, kept verbatim for the console.
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Articles(Vec<Article>),
    Failed(FetchFailure),
}

/// AI-generated text for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// URL of the article the text was generated for.
    pub article_url: String,
    pub ai_text: String,
}

/// One ranked, summarized block of the digest.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestEntry {
    /// 1-based.
    pub rank: usize,
    pub article: Article,
    pub summary: Summary,
}
