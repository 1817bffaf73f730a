// src/ingest/providers/osha_rss.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::document::{Agency, ContentType, Document, QueryWindow};
use crate::error::SourceUnavailable;
use crate::ingest::normalize_text;
use crate::ingest::providers::{get_body, parse_feed_date};
use crate::ingest::types::SourceAdapter;

pub const INTERPRETATIONS_NAME: &str = "OSHA Interpretations";
pub const DIRECTIVES_NAME: &str = "OSHA Directives";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// One of OSHA's RSS feeds. The feeds take no query, so the window is applied
/// after parsing.
pub struct OshaFeedAdapter {
    name: &'static str,
    content_type: ContentType,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

impl OshaFeedAdapter {
    pub fn interpretations(url: &str, client: reqwest::Client) -> Self {
        Self::from_url(INTERPRETATIONS_NAME, ContentType::LetterOfInterpretation, url, client)
    }

    pub fn directives(url: &str, client: reqwest::Client) -> Self {
        Self::from_url(DIRECTIVES_NAME, ContentType::Directive, url, client)
    }

    fn from_url(
        name: &'static str,
        content_type: ContentType,
        url: &str,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name,
            content_type,
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    pub fn interpretations_from_fixture_str(xml: &str) -> Self {
        Self {
            name: INTERPRETATIONS_NAME,
            content_type: ContentType::LetterOfInterpretation,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn directives_from_fixture_str(xml: &str) -> Self {
        Self {
            name: DIRECTIVES_NAME,
            content_type: ContentType::Directive,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_items_from_str(
        &self,
        s: &str,
        window: &QueryWindow,
    ) -> Result<Vec<Document>, SourceUnavailable> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .map_err(|e| SourceUnavailable::malformed(self.name, format!("rss xml: {e}")))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        let mut skipped = 0u64;
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let link = it.link.as_deref().unwrap_or_default().trim().to_string();
            let published = it.pub_date.as_deref().and_then(parse_feed_date);

            let Some(publication_date) = published.filter(|_| !title.is_empty() && !link.is_empty())
            else {
                tracing::debug!(target: "ingest", provider = self.name, %link, "feed item missing title, link or date");
                skipped += 1;
                continue;
            };
            if !window.contains(publication_date) {
                continue;
            }

            out.push(Document {
                content_type: self.content_type,
                title,
                summary: it
                    .description
                    .as_deref()
                    .map(normalize_text)
                    .filter(|s| !s.is_empty()),
                publication_date,
                effective_date: None,
                // Feed items carry no id of their own; the link is stable per item.
                identifier: link.clone(),
                url: link,
                pdf_url: None,
                agency: Agency::Osha,
                source: self.name.to_string(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_documents_total").increment(out.len() as u64);
        counter!("ingest_skipped_total").increment(skipped);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for OshaFeedAdapter {
    async fn fetch(&self, window: &QueryWindow) -> Result<Vec<Document>, SourceUnavailable> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s, window),
            Mode::Http { url, client } => {
                let url = reqwest::Url::parse(url).map_err(|e| {
                    SourceUnavailable::malformed(self.name, format!("feed url: {e}"))
                })?;
                let body = get_body(client, url, self.name).await?;
                self.parse_items_from_str(&body, window)
            }
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// XML only predefines five entities; feeds authored as HTML use more.
/// Common punctuation maps to ASCII, any other HTML entity is decoded, and a
/// name HTML does not know is kept as literal text.
fn scrub_html_entities_for_xml(s: &str) -> String {
    let s = s
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'");

    static RE_ENTITY: OnceCell<Regex> = OnceCell::new();
    let re = RE_ENTITY.get_or_init(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").unwrap());
    re.replace_all(&s, |caps: &Captures| {
        let entity = &caps[0];
        if matches!(&caps[1], "amp" | "lt" | "gt" | "quot" | "apos") {
            return entity.to_string();
        }
        let decoded = html_escape::decode_html_entities(entity);
        if decoded == entity {
            format!("&amp;{}", &entity[1..])
        } else {
            // &LT; and friends decode to markup characters.
            html_escape::encode_text(&decoded).into_owned()
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>t</title>
<item><title>Letter one</title><link>https://www.osha.gov/laws-regs/standardinterpretations/2024-01-10</link>
<description>Clarifies &sect;1910.134&nbsp;fit testing</description><pubDate>Wed, 10 Jan 2024 00:00:00 -0500</pubDate></item>
<item><title>No date</title><link>https://www.osha.gov/x</link></item>
</channel></rss>"#;

    #[tokio::test]
    async fn items_without_date_are_skipped() {
        let a = OshaFeedAdapter::interpretations_from_fixture_str(FEED);
        let docs = a.fetch(&QueryWindow::All).await.unwrap();
        assert_eq!(docs.len(), 1);
        let d = &docs[0];
        assert_eq!(d.content_type, ContentType::LetterOfInterpretation);
        assert_eq!(d.identifier, d.url);
        assert_eq!(
            d.summary.as_deref(),
            Some("Clarifies \u{00A7}1910.134 fit testing")
        );
        assert_eq!(d.source, INTERPRETATIONS_NAME);
    }

    #[tokio::test]
    async fn window_is_applied_locally() {
        let a = OshaFeedAdapter::directives_from_fixture_str(FEED);
        assert!(a.fetch(&QueryWindow::Year(2023)).await.unwrap().is_empty());
        assert_eq!(a.fetch(&QueryWindow::Year(2024)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_channel_is_not_an_error() {
        let a = OshaFeedAdapter::directives_from_fixture_str(
            r#"<rss version="2.0"><channel><title>t</title></channel></rss>"#,
        );
        assert!(a.fetch(&QueryWindow::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entities_outside_xml_do_not_reject_the_feed() {
        let feed = r#"<rss version="2.0"><channel><title>t</title>
<item><title>Caf&eacute; workers &amp; Acme&trade; &bogus;</title>
<link>https://www.osha.gov/laws-regs/standardinterpretations/2024-05-01</link>
<pubDate>Wed, 01 May 2024 00:00:00 -0400</pubDate></item>
</channel></rss>"#;
        let docs = OshaFeedAdapter::interpretations_from_fixture_str(feed)
            .fetch(&QueryWindow::All)
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].title,
            "Caf\u{e9} workers & Acme\u{2122} &bogus;"
        );
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let a = OshaFeedAdapter::directives_from_fixture_str("<html><body>maintenance");
        let err = a.fetch(&QueryWindow::All).await.unwrap_err();
        assert_eq!(err.source_name, DIRECTIVES_NAME);
    }
}
