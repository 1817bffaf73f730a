//! Fetch documents published in the last `LOOKBACK_DAYS` days (default 1) and
//! e-mail a digest. Meant to run once a day from a scheduler. Exits non-zero
//! when every source is down.

use anyhow::{Context, Result};
use osha_monitor::ingest::config::load_config_default;
use osha_monitor::ingest::Aggregator;
use osha_monitor::notify::{build_digest, collect_recent, EmailSender};

const DEFAULT_SITE_URL: &str = "http://localhost:8000";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    osha_monitor::init_tracing();

    let days: u32 = std::env::var("LOOKBACK_DAYS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1);
    let site_url = std::env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());

    let mut cfg = load_config_default()?;
    // Each run is a fresh process; nothing to reuse.
    cfg.cache.ttl_secs = 0;
    let aggregator = Aggregator::from_config(&cfg)?;

    let today = chrono::Local::now().date_naive();
    let docs = collect_recent(&aggregator, days, today)
        .await
        .context("collecting documents for the digest")?;

    let Some(digest) = build_digest(&docs, today, &site_url) else {
        tracing::info!(target: "digest", days, "no new documents to report");
        return Ok(());
    };

    EmailSender::from_env()?.send_digest(&digest).await
}
