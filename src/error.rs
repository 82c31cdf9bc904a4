//! Error type shared by the fetcher, the completion client and the scheduler.
//!
//! A non-`ok` answer from the news API is *not* an error: it is reported as
//! [`crate::models::FetchOutcome::Failed`] so the run can print the details.
//! Everything here aborts the current pipeline run.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing required credential {0}; set it in the environment or a .env file")]
    MissingCredential(&'static str),

    #[error("completion API returned {status}: {body}")]
    Completion { status: StatusCode, body: String },

    #[error("completion API returned no choices")]
    EmptyCompletion,
}

impl From<serde_yaml::Error> for DigestError {
    fn from(e: serde_yaml::Error) -> Self {
        DigestError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
