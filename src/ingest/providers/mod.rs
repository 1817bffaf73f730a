// src/ingest/providers/mod.rs
pub mod federal_register;
pub mod osha_rss;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::error::{status_cause, SourceUnavailable};
use crate::ingest::config::HttpConfig;

/// Build the shared HTTP client with per-source timeouts.
pub fn build_http_client(cfg: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("building http client")
}

/// GET `url` and return the body, mapping every failure to `SourceUnavailable`.
pub(crate) async fn get_body(
    client: &reqwest::Client,
    url: reqwest::Url,
    source_name: &str,
) -> Result<String, SourceUnavailable> {
    let resp = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => return Err(SourceUnavailable::from_reqwest(source_name, &e)),
    };

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SourceUnavailable::new(
            source_name,
            status_cause(status.as_u16()),
            format!("HTTP {status}: {}", truncate(&body, 200)),
        ));
    }

    resp.text()
        .await
        .map_err(|e| SourceUnavailable::from_reqwest(source_name, &e))
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Parse `YYYY-MM-DD`, the date format the Federal Register uses.
pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Publication date of a feed item, in the publisher's own offset.
pub(crate) fn parse_feed_date(s: &str) -> Option<NaiveDate> {
    use time::format_description::well_known::Rfc2822;
    use time::OffsetDateTime;

    let s = s.trim();
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        let d = dt.date();
        return NaiveDate::from_ymd_opt(d.year(), u8::from(d.month()) as u32, d.day() as u32);
    }
    // Named US zones ("EST", "EDT") are only accepted by chrono's parser.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    parse_iso_date(s)
}
