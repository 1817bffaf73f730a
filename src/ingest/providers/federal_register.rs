// src/ingest/providers/federal_register.rs
//! Federal Register documents API (`/api/v1/documents.json`).

use std::collections::BTreeSet;

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::document::{Agency, ContentType, Document, QueryWindow};
use crate::error::SourceUnavailable;
use crate::ingest::config::FederalRegisterConfig;
use crate::ingest::normalize_text;
use crate::ingest::providers::{get_body, parse_iso_date};
use crate::ingest::types::SourceAdapter;

pub const SOURCE_NAME: &str = "Federal Register";

const FIELDS: [&str; 8] = [
    "title",
    "type",
    "abstract",
    "publication_date",
    "effective_on",
    "html_url",
    "pdf_url",
    "document_number",
];

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    results: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    title: Option<String>,
    #[serde(rename = "type")]
    doc_type: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    publication_date: Option<String>,
    effective_on: Option<String>,
    html_url: Option<String>,
    pdf_url: Option<String>,
    document_number: Option<String>,
}

pub struct FederalRegisterAdapter {
    agency: Agency,
    document_types: Vec<ContentType>,
    per_page: u32,
    endpoint: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http(reqwest::Client),
}

impl FederalRegisterAdapter {
    pub fn from_config(cfg: &FederalRegisterConfig, agency: Agency, client: reqwest::Client) -> Self {
        Self {
            agency,
            document_types: cfg.document_types.clone(),
            per_page: cfg.per_page,
            endpoint: cfg.endpoint.clone(),
            mode: Mode::Http(client),
        }
    }

    /// Serve a canned JSON body instead of calling the API.
    pub fn from_fixture_str(body: &str, agency: Agency) -> Self {
        let cfg = FederalRegisterConfig::default();
        Self {
            agency,
            document_types: cfg.document_types,
            per_page: cfg.per_page,
            endpoint: cfg.endpoint,
            mode: Mode::Fixture(body.to_string()),
        }
    }

    /// Configured document types narrowed to `requested` (empty means all).
    pub fn types_for(&self, requested: &BTreeSet<ContentType>) -> Vec<ContentType> {
        self.document_types
            .iter()
            .copied()
            .filter(|ct| requested.is_empty() || requested.contains(ct))
            .collect()
    }

    /// Query pairs in the order the API documents them; repeated keys are intended.
    pub fn query_pairs(&self, window: &QueryWindow, types: &[ContentType]) -> Vec<(String, String)> {
        let mut q = vec![(
            "conditions[agencies][]".to_string(),
            self.agency.federal_register_slug().to_string(),
        )];
        for ct in types {
            q.push(("conditions[type][]".to_string(), ct.code().to_string()));
        }
        match window {
            QueryWindow::All => {}
            QueryWindow::Year(y) => {
                q.push(("conditions[publication_date][year]".to_string(), y.to_string()));
            }
            QueryWindow::Since(d) => {
                q.push((
                    "conditions[publication_date][gte]".to_string(),
                    d.format("%Y-%m-%d").to_string(),
                ));
            }
        }
        for f in FIELDS {
            q.push(("fields[]".to_string(), f.to_string()));
        }
        q.push(("per_page".to_string(), self.per_page.to_string()));
        q.push(("order".to_string(), "newest".to_string()));
        q
    }

    pub fn request_url(
        &self,
        window: &QueryWindow,
        types: &[ContentType],
    ) -> Result<reqwest::Url, SourceUnavailable> {
        reqwest::Url::parse_with_params(&self.endpoint, self.query_pairs(window, types))
            .map_err(|e| SourceUnavailable::malformed(SOURCE_NAME, format!("endpoint url: {e}")))
    }

    fn parse_body(
        &self,
        body: &str,
        window: &QueryWindow,
        types: &[ContentType],
    ) -> Result<Vec<Document>, SourceUnavailable> {
        let t0 = std::time::Instant::now();
        let resp: Response = serde_json::from_str(body)
            .map_err(|e| SourceUnavailable::malformed(SOURCE_NAME, format!("json: {e}")))?;

        let mut out = Vec::with_capacity(resp.results.len());
        let mut skipped = 0u64;
        for rec in resp.results {
            match self.to_document(rec) {
                // The API already filters by window and type; fixtures do not.
                Some(doc)
                    if window.contains(doc.publication_date) && types.contains(&doc.content_type) =>
                {
                    out.push(doc)
                }
                Some(_) => {}
                None => skipped += 1,
            }
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_documents_total").increment(out.len() as u64);
        counter!("ingest_skipped_total").increment(skipped);
        tracing::debug!(
            target: "ingest",
            provider = SOURCE_NAME,
            reported = resp.count,
            kept = out.len(),
            skipped,
            "parsed federal register page"
        );
        Ok(out)
    }

    /// Map one record, or `None` when a required field is missing.
    fn to_document(&self, rec: Record) -> Option<Document> {
        let identifier = rec.document_number.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let Some(identifier) = identifier else {
            tracing::debug!(target: "ingest", provider = SOURCE_NAME, "record without document_number");
            return None;
        };

        let content_type = match rec.doc_type.as_deref().map(str::parse::<ContentType>) {
            Some(Ok(ct)) if ct.is_federal_register() => ct,
            other => {
                tracing::debug!(target: "ingest", %identifier, doc_type = ?other, "unrecognized type");
                return None;
            }
        };

        let title = normalize_text(rec.title.as_deref().unwrap_or_default());
        let url = rec.html_url.map(|s| s.trim().to_string()).unwrap_or_default();
        let publication_date = match rec.publication_date.as_deref().and_then(parse_iso_date) {
            Some(d) if !title.is_empty() && !url.is_empty() => d,
            _ => {
                tracing::debug!(target: "ingest", %identifier, "record missing title, url or publication date");
                return None;
            }
        };

        let summary = rec
            .abstract_text
            .as_deref()
            .map(normalize_text)
            .filter(|s| !s.is_empty());

        Some(Document {
            content_type,
            title,
            summary,
            publication_date,
            effective_date: rec.effective_on.as_deref().and_then(parse_iso_date),
            url,
            pdf_url: rec.pdf_url.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            identifier,
            agency: self.agency,
            source: SOURCE_NAME.to_string(),
        })
    }
}

#[async_trait]
impl SourceAdapter for FederalRegisterAdapter {
    async fn fetch(&self, window: &QueryWindow) -> Result<Vec<Document>, SourceUnavailable> {
        self.fetch_types(window, &BTreeSet::new()).await
    }

    async fn fetch_types(
        &self,
        window: &QueryWindow,
        requested: &BTreeSet<ContentType>,
    ) -> Result<Vec<Document>, SourceUnavailable> {
        let types = self.types_for(requested);
        if types.is_empty() {
            tracing::debug!(target: "ingest", provider = SOURCE_NAME, ?requested, "no requested type served here");
            return Ok(Vec::new());
        }
        match &self.mode {
            Mode::Fixture(body) => self.parse_body(body, window, &types),
            Mode::Http(client) => {
                let url = self.request_url(window, &types)?;
                let body = get_body(client, url, SOURCE_NAME).await?;
                self.parse_body(&body, window, &types)
            }
        }
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}
