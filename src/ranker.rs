//! Popularity ranking.

use crate::models::Article;
use itertools::Itertools;

/// Sort by popularity score, highest first, and keep the first `top_n`.
///
/// The sort is stable: articles with equal scores keep the order the API
/// returned them in. Scores compare with `f64::total_cmp`, so a `NaN`
/// score sorts above every number instead of breaking the ordering.
///
/// # Arguments
///
/// * `articles` - Everything the fetcher returned, in API order
/// * `top_n` - Maximum number of articles to keep
///
/// # Returns
///
/// At most `top_n` articles, non-increasing in popularity. Empty input
/// gives an empty result.
pub fn rank(articles: Vec<Article>, top_n: usize) -> Vec<Article> {
    articles
        .into_iter()
        .sorted_by(|a, b| b.popularity_score().total_cmp(&a.popularity_score()))
        .take(top_n)
        .collect()
}
