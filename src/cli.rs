//! Command-line interface definitions.
//!
//! The process needs no arguments: both API keys come from the environment
//! (or a `.env` file loaded before parsing). The flags only exist to
//! override those values or point at a settings file.

use clap::Parser;
use std::path::PathBuf;

/// Print a daily AI digest of yesterday's most popular news.
///
/// # Examples
///
/// ```sh
/// # Long-running scheduler, keys from the environment
/// OPENAI_API_KEY=sk-... NEWS_API_KEY=... trending_digest
///
/// # One digest right now, with custom settings
/// trending_digest --run-once --config ./digest.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// API key for the chat completion API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// API key for the news search API
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run the digest a single time and exit instead of scheduling it
    #[arg(long)]
    pub run_once: bool,
}
