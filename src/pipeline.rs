//! One digest run: fetch, rank, summarize, format.
//!
//! [`Pipeline::run`] produces a [`DigestOutcome`]; [`DigestJob`] wraps it
//! for the scheduler and writes the report to its output.
//!
//! A summarization failure aborts the whole run (no partial digest is
//! printed). The scheduler logs the error and keeps polling.

use crate::api::AskAsync;
use crate::error::{DigestError, Result};
use crate::models::{DigestEntry, FetchFailure, FetchOutcome};
use crate::news::NewsSource;
use crate::outputs::markdown::digest_to_markdown;
use crate::ranker::rank;
use crate::scheduler::Job;
use crate::summarizer::Summarizer;
use crate::utils::target_day;
use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::io::Write;
use std::time::Instant;
use tracing::{info, instrument, warn};

pub const NO_ARTICLES_NOTICE: &str = "No articles found for yesterday.";
pub const FETCHING_LINE: &str = "Fetching yesterday's top trending news...";

/// How a run ended, short of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum DigestOutcome {
    /// The rendered digest.
    Digest(String),
    /// The search returned zero articles; nothing was summarized.
    NoArticles,
    /// The news API answered with a non-`ok` status.
    FetchFailed(FetchFailure),
}

impl DigestOutcome {
    /// The text printed under the heading: the digest itself, the
    /// "no articles" notice, or `"<error>: <raw details>"`.
    pub fn render(&self) -> String {
        match self {
            DigestOutcome::Digest(text) => text.clone(),
            DigestOutcome::NoArticles => NO_ARTICLES_NOTICE.to_string(),
            DigestOutcome::FetchFailed(failure) => {
                format!("{}: {}", failure.error, failure.details)
            }
        }
    }
}

#[derive(Debug)]
pub struct Pipeline<N, A> {
    source: N,
    summarizer: Summarizer<A>,
    top_n: usize,
}

impl<N, A> Pipeline<N, A>
where
    N: NewsSource,
    A: AskAsync,
{
    pub fn new(source: N, summarizer: Summarizer<A>, top_n: usize) -> Self {
        Self {
            source,
            summarizer,
            top_n,
        }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Build the digest for `day`.
    ///
    /// Fetches once, ranks, then summarizes the selected articles one at a
    /// time in rank order.
    ///
    /// # Arguments
    ///
    /// * `day` - The day used as both `from` and `to` of the search
    ///
    /// # Returns
    ///
    /// - [`DigestOutcome::Digest`] with one block per selected article
    /// - [`DigestOutcome::NoArticles`] without calling the model
    /// - [`DigestOutcome::FetchFailed`] without ranking or summarizing
    ///
    /// # Errors
    ///
    /// Transport errors from the fetch, and the first summarization error;
    /// articles after a failed one are not attempted.
    #[instrument(level = "info", skip_all, fields(%day))]
    pub async fn run(&self, day: NaiveDate) -> Result<DigestOutcome> {
        let articles = match self.source.fetch(day).await? {
            FetchOutcome::Articles(articles) => articles,
            FetchOutcome::Failed(failure) => {
                warn!(error = %failure.error, "Fetch failed; ending run");
                return Ok(DigestOutcome::FetchFailed(failure));
            }
        };

        if articles.is_empty() {
            info!("No articles for target day");
            return Ok(DigestOutcome::NoArticles);
        }

        let fetched = articles.len();
        let top = rank(articles, self.top_n);
        info!(fetched, selected = top.len(), "Ranked articles");

        // One article at a time, stopping at the first failure.
        let summarizer = &self.summarizer;
        let entries: Vec<DigestEntry> = stream::iter(top.into_iter().enumerate())
            .then(|(i, article)| async move {
                let summary = summarizer.summarize(&article).await?;
                Ok::<_, DigestError>(DigestEntry {
                    rank: i + 1,
                    article,
                    summary,
                })
            })
            .try_collect()
            .await?;

        Ok(DigestOutcome::Digest(digest_to_markdown(&entries)))
    }
}

/// The scheduled unit of work: one pipeline run for yesterday (UTC),
/// written to `out`.
#[derive(Debug)]
pub struct DigestJob<N, A, W> {
    pipeline: Pipeline<N, A>,
    out: W,
}

impl<N, A, W> DigestJob<N, A, W>
where
    N: NewsSource,
    A: AskAsync,
    W: Write,
{
    pub fn new(pipeline: Pipeline<N, A>, out: W) -> Self {
        Self { pipeline, out }
    }

    /// Run for an explicit day. [`Job::run`] uses the target day.
    ///
    /// Writes the "fetching" line before the run, then the heading and the
    /// rendered outcome. Nothing after the first line is written when the
    /// run fails.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut job = DigestJob::new(pipeline, std::io::stdout());
    /// job.run_for(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).await?;
    /// ```
    pub async fn run_for(&mut self, day: NaiveDate) -> Result<DigestOutcome> {
        let t0 = Instant::now();
        writeln!(self.out, "{FETCHING_LINE}")?;
        let outcome = self.pipeline.run(day).await?;

        writeln!(
            self.out,
            "🔥 Yesterday's top {} trending news 🔥",
            self.pipeline.top_n()
        )?;
        writeln!(self.out, "{}", outcome.render())?;
        self.out.flush()?;

        info!(elapsed_ms = t0.elapsed().as_millis(), "Digest run complete");
        Ok(outcome)
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<N, A, W> Job for DigestJob<N, A, W>
where
    N: NewsSource,
    A: AskAsync,
    W: Write,
{
    async fn run(&mut self) -> Result<()> {
        let day = target_day(Utc::now());
        self.run_for(day).await.map(|_| ())
    }
}
