// src/present.rs
//! Display-ready views of a `DocumentFeed`: formatted dates, grouped sections,
//! and a minimal HTML page.

use std::fmt::Write as _;

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::document::{ContentType, Document};
use crate::filter::FilterCriteria;
use crate::monitor::{DocumentFeed, FeedStatus};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentView {
    pub content_type: ContentType,
    pub label: &'static str,
    pub title: String,
    pub summary: Option<String>,
    pub url: String,
    pub pdf_url: Option<String>,
    pub source: String,
    pub agency: String,
    pub identifier: String,
    pub publication_date: NaiveDate,
    pub published: String,
    pub time_ago: String,
    pub effective_status: String,
}

impl DocumentView {
    pub fn new(doc: &Document, today: NaiveDate) -> Self {
        Self {
            content_type: doc.content_type,
            label: doc.content_type.label(),
            title: doc.title.clone(),
            summary: doc.summary.clone(),
            url: doc.url.clone(),
            pdf_url: doc.pdf_url.clone(),
            source: doc.source.clone(),
            agency: doc.agency.display_name().to_string(),
            identifier: doc.identifier.clone(),
            publication_date: doc.publication_date,
            published: long_date(doc.publication_date),
            time_ago: time_ago(doc.publication_date, today),
            effective_status: doc
                .effective_date
                .map(|d| effective_status(d, today))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub content_type: ContentType,
    pub heading: &'static str,
    pub documents: Vec<DocumentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub today: String,
    pub status: FeedStatus,
    pub total: usize,
    pub failed_sources: Vec<String>,
    pub criteria: FilterCriteria,
    pub sections: Vec<Section>,
}

impl Page {
    /// Group the feed into sections in `ContentType` order, skipping empty ones.
    /// Documents keep their feed order inside a section.
    pub fn build(feed: &DocumentFeed, criteria: &FilterCriteria, today: NaiveDate) -> Self {
        let sections = ContentType::ALL
            .into_iter()
            .filter_map(|ct| {
                let documents: Vec<DocumentView> = feed
                    .documents
                    .iter()
                    .filter(|d| d.content_type == ct)
                    .map(|d| DocumentView::new(d, today))
                    .collect();
                (!documents.is_empty()).then(|| Section {
                    content_type: ct,
                    heading: ct.heading(),
                    documents,
                })
            })
            .collect();

        Self {
            today: today.format("%A, %B %d, %Y").to_string(),
            status: feed.status,
            total: feed.documents.len(),
            failed_sources: feed.failed_sources.clone(),
            criteria: criteria.clone(),
            sections,
        }
    }
}

/// "January 10, 2024"
pub fn long_date(d: NaiveDate) -> String {
    d.format("%B %d, %Y").to_string()
}

/// "Jan 10, 2024"
pub fn short_date(d: NaiveDate) -> String {
    d.format("%b %d, %Y").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Relative age of a publication date.
pub fn time_ago(published: NaiveDate, today: NaiveDate) -> String {
    let days = (today - published).num_days();
    match days {
        d if d < 0 => "Upcoming".to_string(),
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        d if d < 30 => plural(d / 7, "week"),
        d if d < 365 => plural(d / 30, "month"),
        _ => published.format("%b %Y").to_string(),
    }
}

pub fn effective_status(effective: NaiveDate, today: NaiveDate) -> String {
    let days = (effective - today).num_days();
    match days {
        d if d < 0 => format!("Effective since {}", short_date(effective)),
        0 => "Effective today".to_string(),
        1 => "Effective tomorrow".to_string(),
        d if d < 30 => format!("Effective in {d} days"),
        _ => format!("Effective {}", short_date(effective)),
    }
}

/// Self-contained HTML page. All text is escaped.
pub fn render_html(page: &Page) -> String {
    let mut out = String::with_capacity(8 * 1024);
    out.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>OSHA Monitor</title>\n</head>\n<body>\n<h1>OSHA Monitor</h1>\n",
    );
    let _ = writeln!(out, "<p class=\"today\">{}</p>", encode_text(&page.today));

    match page.status {
        FeedStatus::Unavailable => {
            out.push_str(
                "<p class=\"unavailable\">We can't check for updates right now. \
                 Please try again in a few minutes.</p>\n",
            );
        }
        FeedStatus::NoResults => {
            out.push_str("<p class=\"empty\">No documents match these filters.</p>\n");
        }
        FeedStatus::Ok => {
            let _ = writeln!(
                out,
                "<p class=\"count\">{} document{}</p>",
                page.total,
                if page.total == 1 { "" } else { "s" }
            );
        }
    }

    if page.status != FeedStatus::Unavailable && !page.failed_sources.is_empty() {
        let _ = writeln!(
            out,
            "<p class=\"partial\">Some sources could not be reached: {}</p>",
            encode_text(&page.failed_sources.join(", "))
        );
    }

    for section in &page.sections {
        let _ = writeln!(
            out,
            "<section>\n<h2>{} ({})</h2>",
            encode_text(section.heading),
            section.documents.len()
        );
        for d in &section.documents {
            render_item(&mut out, d);
        }
        out.push_str("</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_item(out: &mut String, d: &DocumentView) {
    let _ = writeln!(
        out,
        "<article>\n<a href=\"{}\">{}</a>",
        encode_double_quoted_attribute(&d.url),
        encode_text(&d.title)
    );
    if let Some(summary) = &d.summary {
        let _ = writeln!(out, "<p>{}</p>", encode_text(summary));
    }
    let _ = write!(
        out,
        "<p class=\"meta\">{} &middot; {} &middot; {}",
        encode_text(d.label),
        encode_text(&d.published),
        encode_text(&d.time_ago)
    );
    if !d.effective_status.is_empty() {
        let _ = write!(out, " &middot; {}", encode_text(&d.effective_status));
    }
    if let Some(pdf) = &d.pdf_url {
        let _ = write!(
            out,
            " &middot; <a href=\"{}\">PDF</a>",
            encode_double_quoted_attribute(pdf)
        );
    }
    out.push_str("</p>\n</article>\n");
}
