//! `nw` - daily news watchlist pipeline.
//!
//! For each configured topic: discover candidate articles, deduplicate and
//! rank them, enrich pending records with full text and a structured
//! summary, then roll the day's summaries into one watchlist digest.
//! Scheduling cadence (typically a daily cron entry) lives outside this
//! binary.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Parser;
use nw_core::{ApiConfig, Result, Topic, TopicSet};
use nw_inference::{CohereClient, OpenAiClient};
use nw_pipeline::Pipeline;
use nw_sources::{GdeltClient, PageExtractor};
use nw_storage::SqliteStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily news watchlist pipeline", long_about = None)]
struct Cli {
    /// Topic names to run. Runs every configured topic when omitted.
    topics: Vec<String>,

    /// Topic configuration file.
    #[arg(long, default_value = "topics.json")]
    topics_file: PathBuf,

    /// SQLite database path.
    #[arg(long, default_value = "newswatch.db")]
    database: PathBuf,

    /// Target day (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let api = ApiConfig::from_env()?;
    let topic_set = TopicSet::load(&cli.topics_file)?;

    // An unknown topic name is a configuration mistake and aborts the run
    // before anything external is touched.
    let topics: Vec<Topic> = if cli.topics.is_empty() {
        topic_set.topics.clone()
    } else {
        cli.topics
            .iter()
            .map(|name| topic_set.get(name).cloned())
            .collect::<Result<_>>()?
    };

    let day = cli.date.unwrap_or_else(|| Local::now().date_naive());

    let store = SqliteStore::open(&cli.database).await?;
    let openai = Arc::new(OpenAiClient::new(&api.openai_api_key)?);
    let pipeline = Pipeline::new(
        Arc::new(GdeltClient::new()?),
        Arc::new(CohereClient::new(&api.cohere_api_key)?),
        Arc::new(PageExtractor::new()?),
        openai.clone(),
        openai,
        Arc::new(store),
    );

    info!(topics = topics.len(), %day, "Starting watchlist run");
    let reports = pipeline.run(&topics, day).await;
    for report in &reports {
        info!(
            topic = %report.topic,
            discovered = report.discovered,
            enriched = report.enriched,
            digest = report.digest_written,
            "Topic finished"
        );
    }
    info!("Watchlist run complete");
    Ok(())
}
