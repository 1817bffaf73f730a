// src/ingest/mod.rs
pub mod cache;
pub mod config;
pub mod providers;
pub mod types;

use crate::document::{ContentType, Document, QueryWindow};
use crate::error::SourceUnavailable;
use crate::ingest::cache::{CachingAdapter, ResponseCache};
use crate::ingest::config::MonitorConfig;
use crate::ingest::providers::{
    build_http_client, federal_register::FederalRegisterAdapter, osha_rss::OshaFeedAdapter,
};
use crate::ingest::types::SourceAdapter;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

const MAX_TEXT_CHARS: usize = 1500;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_documents_total",
            "Documents parsed from sources."
        );
        describe_counter!(
            "ingest_skipped_total",
            "Source records dropped for missing required fields."
        );
        describe_counter!(
            "ingest_dedup_total",
            "Documents removed as duplicates of (type, identifier)."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Source fetch/parse failures."
        );
        describe_counter!("source_cache_hits_total", "Source responses served from cache.");
        describe_counter!("source_cache_misses_total", "Source responses fetched upstream.");
        describe_histogram!("ingest_parse_ms", "Source parse time in milliseconds.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when aggregation last ran."
        );
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 4) Length cap
    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }

    out
}

/// Drop repeated `(content_type, identifier)` keys (first wins), then order by
/// publication date descending with identifier ascending as tie-break.
/// Returns the kept documents and the number removed.
pub fn dedup_and_sort(docs: Vec<Document>) -> (Vec<Document>, usize) {
    let mut seen: HashSet<(ContentType, String)> = HashSet::with_capacity(docs.len());
    let mut keep = Vec::with_capacity(docs.len());
    let mut dedup_out = 0usize;

    for doc in docs {
        if !seen.insert((doc.content_type, doc.identifier.clone())) {
            dedup_out += 1;
            continue;
        }
        keep.push(doc);
    }

    keep.sort_by(|a, b| {
        b.publication_date
            .cmp(&a.publication_date)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    (keep, dedup_out)
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub documents: Vec<Document>,
    pub failures: Vec<SourceUnavailable>,
    pub sources_attempted: usize,
}

impl Aggregation {
    /// True when at least one source was configured and none answered.
    /// An empty `documents` with this false is a legitimate no-results state.
    pub fn all_sources_failed(&self) -> bool {
        self.sources_attempted > 0 && self.failures.len() == self.sources_attempted
    }

    pub fn failed_sources(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.source_name.clone()).collect()
    }
}

/// Runs every configured adapter and merges their documents.
pub struct Aggregator {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl Aggregator {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Build the live source set described by `cfg`.
    pub fn from_config(cfg: &MonitorConfig) -> anyhow::Result<Self> {
        let client = build_http_client(&cfg.http)?;
        let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();

        if cfg.federal_register.enabled {
            adapters.push(Box::new(FederalRegisterAdapter::from_config(
                &cfg.federal_register,
                cfg.agency,
                client.clone(),
            )));
        }
        if cfg.osha_feeds.interpretations_enabled {
            adapters.push(Box::new(OshaFeedAdapter::interpretations(
                &cfg.osha_feeds.interpretations_url,
                client.clone(),
            )));
        }
        if cfg.osha_feeds.directives_enabled {
            adapters.push(Box::new(OshaFeedAdapter::directives(
                &cfg.osha_feeds.directives_url,
                client,
            )));
        }

        if cfg.cache.ttl_secs > 0 {
            let cache = Arc::new(ResponseCache::new(std::time::Duration::from_secs(
                cfg.cache.ttl_secs,
            )));
            adapters = adapters
                .into_iter()
                .map(|a| Box::new(CachingAdapter::new(a, cache.clone())) as Box<dyn SourceAdapter>)
                .collect();
        }

        tracing::info!(
            target: "ingest",
            sources = adapters.len(),
            cache_ttl_secs = cfg.cache.ttl_secs,
            "aggregator configured"
        );
        Ok(Self::new(adapters))
    }

    pub fn source_names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    /// Fetch from every adapter, collecting all results before merging.
    /// A failing adapter is logged and skipped; this never fails as a whole.
    pub async fn aggregate(&self, window: &QueryWindow) -> Aggregation {
        self.aggregate_types(window, &BTreeSet::new()).await
    }

    /// Like `aggregate`, passing the selected content types (empty means all)
    /// to sources that can narrow their query.
    pub async fn aggregate_types(
        &self,
        window: &QueryWindow,
        types: &BTreeSet<ContentType>,
    ) -> Aggregation {
        ensure_metrics_described();

        let mut raw = Vec::new();
        let mut failures = Vec::new();
        for a in &self.adapters {
            match a.fetch_types(window, types).await {
                Ok(mut v) => raw.append(&mut v),
                Err(e) => {
                    tracing::warn!(
                        target: "ingest",
                        error = %e,
                        provider = a.name(),
                        cause = e.cause.as_str(),
                        "source unavailable"
                    );
                    counter!("ingest_source_errors_total").increment(1);
                    failures.push(e);
                }
            }
        }

        let (documents, dedup_cnt) = dedup_and_sort(raw);

        counter!("ingest_dedup_total").increment(dedup_cnt as u64);
        gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        tracing::info!(
            target: "ingest",
            %window,
            kept = documents.len(),
            dedup = dedup_cnt,
            failed = failures.len(),
            "aggregation finished"
        );

        Aggregation {
            documents,
            failures,
            sources_attempted: self.adapters.len(),
        }
    }
}
