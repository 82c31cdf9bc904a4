//! # Trending Digest
//!
//! A long-running reporter that, once per trigger, fetches yesterday's most
//! popular news from NewsAPI, keeps the top five by popularity, asks an
//! OpenAI-compatible model for a short summary and impact inference of each,
//! and prints the resulting digest to standard output.
//!
//! ## Usage
//!
//! ```sh
//! export OPENAI_API_KEY=sk-...
//! export NEWS_API_KEY=...
//! trending_digest                 # schedule and poll forever
//! trending_digest --run-once      # print one digest and exit
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one search request scoped to yesterday (UTC)
//! 2. **Ranking**: sort by popularity, keep the top five
//! 3. **Summarizing**: one completion call per article, sequentially
//! 4. **Output**: Markdown-flavored digest on stdout
//!
//! The scheduler fires every minute on macOS (development) and daily at
//! 09:00 local time elsewhere, polling every 60 seconds.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod news;
mod outputs;
mod pipeline;
mod ranker;
mod scheduler;
mod summarizer;
mod utils;

use api::OpenAiChat;
use cli::Cli;
use config::{Credentials, Settings};
use news::{NewsApiClient, NewsQuery};
use pipeline::{DigestJob, Pipeline};
use scheduler::{IntervalTicker, Scheduler, SystemClock};
use summarizer::Summarizer;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    // A missing .env file is fine; the variables may already be exported.
    match dotenv::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => debug!(error = %e, "No .env file loaded"),
    }

    let args = Cli::parse();
    debug!(config = ?args.config, run_once = args.run_once, "Parsed CLI arguments");

    // --- Startup configuration: any failure here is fatal ---
    let credentials = Credentials::new(args.openai_api_key, args.news_api_key).inspect_err(|e| {
        error!(error = %e, "Missing credentials; refusing to start");
    })?;
    let settings = Settings::load(args.config.as_deref())?;
    let cadence = settings.cadence_for(std::env::consts::OS)?;
    info!(
        os = std::env::consts::OS,
        %cadence,
        language = %settings.language,
        page_size = settings.page_size,
        top_n = settings.top_n,
        "Configuration resolved"
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(settings.request_timeout())
        .build()?;

    let news = NewsApiClient::new(
        http.clone(),
        &settings.news_api_url,
        credentials.news_api_key.clone(),
        NewsQuery::from(&settings),
    )?;
    let chat = OpenAiChat::new(
        http,
        &settings.completion_api_base,
        credentials.openai_api_key.clone(),
        settings.model.clone(),
    );
    info!(model = %chat.model(), endpoint = %chat.endpoint(), "Completion client ready");

    let pipeline = Pipeline::new(news, Summarizer::new(chat), settings.top_n);
    let mut job = DigestJob::new(pipeline, std::io::stdout());

    if args.run_once {
        let day = utils::target_day(chrono::Utc::now());
        job.run_for(day).await?;
        return Ok(());
    }

    // --- Scheduling loop ---
    println!("News scheduler is running...");
    let mut scheduler = Scheduler::new(SystemClock, cadence, job);
    let mut ticker = IntervalTicker::new(settings.poll_interval());
    info!(
        poll_interval_secs = settings.poll_interval_secs,
        next_run = %scheduler.next_run(),
        "Entering scheduler loop"
    );

    scheduler
        .run(&mut ticker, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C; running until killed");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!(runs = scheduler.runs(), "Scheduler stopped");
    Ok(())
}
