// tests/metrics.rs
use std::sync::Arc;
use std::time::Duration;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use osha_monitor::error::UnavailableCause;
use osha_monitor::ingest::cache::{CachingAdapter, ResponseCache};
use osha_monitor::ingest::providers::federal_register::FederalRegisterAdapter;
use osha_monitor::ingest::types::SourceAdapter;
use osha_monitor::metrics::Metrics;
use osha_monitor::{Agency, Aggregator, Document, QueryWindow, SourceUnavailable};

struct Unreachable;

#[async_trait::async_trait]
impl SourceAdapter for Unreachable {
    async fn fetch(&self, _window: &QueryWindow) -> Result<Vec<Document>, SourceUnavailable> {
        Err(SourceUnavailable::new(
            "OSHA Directives",
            UnavailableCause::Timeout,
            "timed out",
        ))
    }
    fn name(&self) -> &str {
        "OSHA Directives"
    }
}

// The recorder is process-global, so everything lives in one test.
#[tokio::test]
async fn metrics_endpoint_exposes_ingest_and_cache_series() {
    let metrics = Metrics::init(300).expect("install recorder");

    let cache = Arc::new(ResponseCache::new(Duration::from_secs(300)));
    let fr = FederalRegisterAdapter::from_fixture_str(
        include_str!("fixtures/federal_register.json"),
        Agency::Osha,
    );
    let aggregator = Aggregator::new(vec![
        Box::new(CachingAdapter::new(Box::new(fr), cache)),
        Box::new(Unreachable),
    ]);

    // miss, then hit
    let first = aggregator.aggregate(&QueryWindow::All).await;
    let second = aggregator.aggregate(&QueryWindow::All).await;
    assert_eq!(first.documents, second.documents);
    assert_eq!(first.failed_sources(), vec!["OSHA Directives".to_string()]);

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "ingest_documents_total",
        "ingest_skipped_total",
        "ingest_source_errors_total",
        "ingest_dedup_total",
        "ingest_parse_ms",
        "ingest_last_run_ts",
        "source_cache_hits_total",
        "source_cache_misses_total",
        "source_cache_ttl_secs",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
