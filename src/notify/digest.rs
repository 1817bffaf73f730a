// src/notify/digest.rs
//! Daily digest of newly published documents.

use std::fmt::Write as _;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::document::{ContentType, Document, QueryWindow};
use crate::ingest::Aggregator;
use crate::present::long_date;

const SUMMARY_MAX_CHARS: usize = 300;

/// Section order in the e-mail. Notices go last; they are the least actionable.
const DIGEST_ORDER: [(ContentType, &str); 5] = [
    (ContentType::Rule, "#c53030"),
    (ContentType::ProposedRule, "#dd6b20"),
    (ContentType::LetterOfInterpretation, "#2c7a7b"),
    (ContentType::Directive, "#5a67d8"),
    (ContentType::Notice, "#718096"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub text: String,
    pub html: String,
    pub count: usize,
}

/// Window covering the last `days` calendar days, today included. Consecutive
/// daily runs with `days = 1` never share a publication date.
pub fn lookback_window(days: u32, today: NaiveDate) -> QueryWindow {
    QueryWindow::since_days_before(today, days.max(1) - 1)
}

/// Documents published in the lookback window, newest first.
///
/// Fails when every source failed, so an outage is not mistaken for a quiet
/// day. Partial failures are logged by the aggregator and contribute nothing.
pub async fn collect_recent(
    aggregator: &Aggregator,
    days: u32,
    today: NaiveDate,
) -> Result<Vec<Document>> {
    let agg = aggregator.aggregate(&lookback_window(days, today)).await;
    if agg.all_sources_failed() {
        bail!(
            "every source failed: {}",
            agg.failed_sources().join(", ")
        );
    }
    Ok(agg.documents)
}

fn plural_s(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn truncate_summary(s: &str) -> String {
    if s.chars().count() > SUMMARY_MAX_CHARS {
        let head: String = s.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// Build the digest, or `None` when there is nothing to report.
pub fn build_digest(docs: &[Document], today: NaiveDate, site_url: &str) -> Option<Digest> {
    if docs.is_empty() {
        return None;
    }
    let n = docs.len();
    Some(Digest {
        subject: format!("OSHA Monitor: {n} new update{}", plural_s(n)),
        text: build_text(docs, today, site_url),
        html: build_html(docs, today, site_url),
        count: n,
    })
}

pub fn build_text(docs: &[Document], today: NaiveDate, site_url: &str) -> String {
    let n = docs.len();
    let mut text = format!("OSHA Monitor - {}\n", today.format("%A, %B %d, %Y"));
    text.push_str(&"=".repeat(40));
    text.push_str("\n\n");
    let _ = writeln!(text, "{n} new item{} published\n", plural_s(n));

    for d in docs {
        let _ = writeln!(text, "[{}] {}", d.content_type.label(), d.title);
        let _ = writeln!(text, "Published: {}", long_date(d.publication_date));
        let _ = writeln!(text, "Link: {}\n", d.url);
    }

    text.push_str(&"-".repeat(40));
    let _ = writeln!(text, "\nView all: {site_url}");
    text
}

pub fn build_html(docs: &[Document], today: NaiveDate, site_url: &str) -> String {
    let n = docs.len();
    let mut html = String::with_capacity(4 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n");
    html.push_str("<body style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto;\">\n");
    let _ = writeln!(
        html,
        "<h1>OSHA Monitor</h1>\n<p>{}</p>\n<p><strong>{n} new item{}</strong> published</p>",
        today.format("%A, %B %d, %Y"),
        plural_s(n)
    );

    for (ct, color) in DIGEST_ORDER {
        let items: Vec<&Document> = docs.iter().filter(|d| d.content_type == ct).collect();
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(
            html,
            "<h2 style=\"color: {color}; border-bottom: 2px solid {color};\">{} ({})</h2>",
            ct.heading(),
            items.len()
        );
        for d in items {
            let _ = writeln!(
                html,
                "<div>\n<a href=\"{}\">{}</a>",
                encode_double_quoted_attribute(&d.url),
                encode_text(&d.title)
            );
            if let Some(summary) = &d.summary {
                let _ = writeln!(html, "<p>{}</p>", encode_text(&truncate_summary(summary)));
            }
            let _ = write!(html, "<p>Published {}", long_date(d.publication_date));
            if let Some(eff) = d.effective_date {
                let _ = write!(html, " &middot; Effective {}", long_date(eff));
            }
            html.push_str("</p>\n</div>\n");
        }
    }

    let _ = writeln!(
        html,
        "<hr>\n<p><a href=\"{}\">View all updates</a> &middot; Sent by OSHA Monitor</p>\n</body>\n</html>",
        encode_double_quoted_attribute(site_url)
    );
    html
}
