// tests/monitor_feed.rs
//
// The page-facing boundary: status reporting and window selection.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use osha_monitor::error::UnavailableCause;
use osha_monitor::ingest::types::SourceAdapter;
use osha_monitor::{
    Agency, Aggregator, ContentType, Document, FeedStatus, FilterCriteria, Monitor, QueryWindow,
    SourceUnavailable,
};

/// Returns fixed documents filtered by the window and records every window asked for.
struct RecordingAdapter {
    docs: Vec<Document>,
    seen: Arc<Mutex<Vec<QueryWindow>>>,
}

#[async_trait::async_trait]
impl SourceAdapter for RecordingAdapter {
    async fn fetch(&self, window: &QueryWindow) -> Result<Vec<Document>, SourceUnavailable> {
        self.seen.lock().unwrap().push(*window);
        Ok(self
            .docs
            .iter()
            .filter(|d| window.contains(d.publication_date))
            .cloned()
            .collect())
    }
    fn name(&self) -> &str {
        "recording"
    }
}

/// Serves nothing; records the content types each fetch asked for.
struct TypeRecordingAdapter {
    seen: Arc<Mutex<Vec<BTreeSet<ContentType>>>>,
}

#[async_trait::async_trait]
impl SourceAdapter for TypeRecordingAdapter {
    async fn fetch(&self, window: &QueryWindow) -> Result<Vec<Document>, SourceUnavailable> {
        self.fetch_types(window, &BTreeSet::new()).await
    }
    async fn fetch_types(
        &self,
        _window: &QueryWindow,
        types: &BTreeSet<ContentType>,
    ) -> Result<Vec<Document>, SourceUnavailable> {
        self.seen.lock().unwrap().push(types.clone());
        Ok(Vec::new())
    }
    fn name(&self) -> &str {
        "types"
    }
}

struct DownAdapter;

#[async_trait::async_trait]
impl SourceAdapter for DownAdapter {
    async fn fetch(&self, _window: &QueryWindow) -> Result<Vec<Document>, SourceUnavailable> {
        Err(SourceUnavailable::new(
            "down",
            UnavailableCause::Network,
            "connection refused",
        ))
    }
    fn name(&self) -> &str {
        "down"
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn doc(ct: ContentType, id: &str, date: NaiveDate) -> Document {
    Document {
        content_type: ct,
        title: format!("Document {id}"),
        summary: None,
        publication_date: date,
        effective_date: None,
        url: format!("https://example.test/{id}"),
        pdf_url: None,
        identifier: id.to_string(),
        agency: Agency::Osha,
        source: "recording".into(),
    }
}

fn recording_monitor(window_days: Option<u32>) -> (Monitor, Arc<Mutex<Vec<QueryWindow>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let adapter = RecordingAdapter {
        docs: vec![
            doc(ContentType::Rule, "2024-001", ymd(2024, 1, 10)),
            doc(ContentType::ProposedRule, "2024-002", ymd(2024, 2, 15)),
            doc(ContentType::Notice, "2023-001", ymd(2023, 5, 5)),
        ],
        seen: seen.clone(),
    };
    let monitor = Monitor::new(Aggregator::new(vec![Box::new(adapter)]), window_days);
    (monitor, seen)
}

#[tokio::test]
async fn matching_documents_are_ok() {
    let (monitor, _) = recording_monitor(None);
    let c = FilterCriteria::all().with_content_types([ContentType::Rule]);
    let feed = monitor.get_filtered_documents_on(&c, ymd(2024, 3, 1)).await;
    assert_eq!(feed.status, FeedStatus::Ok);
    assert_eq!(feed.documents.len(), 1);
    assert_eq!(feed.documents[0].identifier, "2024-001");
    assert!(feed.failed_sources.is_empty());
}

#[tokio::test]
async fn no_matches_is_distinct_from_unavailable() {
    let (monitor, _) = recording_monitor(None);
    let c = FilterCriteria::all().with_content_types([ContentType::Directive]);
    let feed = monitor.get_filtered_documents_on(&c, ymd(2024, 3, 1)).await;
    assert!(feed.documents.is_empty());
    assert_eq!(feed.status, FeedStatus::NoResults);

    let down = Monitor::new(
        Aggregator::new(vec![Box::new(DownAdapter), Box::new(DownAdapter)]),
        None,
    );
    let feed = down
        .get_filtered_documents_on(&FilterCriteria::all(), ymd(2024, 3, 1))
        .await;
    assert!(feed.documents.is_empty());
    assert_eq!(feed.status, FeedStatus::Unavailable);
    assert_eq!(feed.failed_sources.len(), 2);
}

#[tokio::test]
async fn selected_year_is_pushed_down() {
    let (monitor, seen) = recording_monitor(Some(30));
    let c = FilterCriteria::all().with_year(2023);
    let feed = monitor.get_filtered_documents_on(&c, ymd(2024, 3, 1)).await;
    assert_eq!(feed.documents.len(), 1);
    assert_eq!(seen.lock().unwrap().as_slice(), &[QueryWindow::Year(2023)]);
}

#[tokio::test]
async fn default_window_comes_from_config() {
    let (monitor, seen) = recording_monitor(Some(30));
    let feed = monitor
        .get_filtered_documents_on(&FilterCriteria::all(), ymd(2024, 3, 1))
        .await;
    // only the 2024-02-15 proposed rule is inside 30 days
    assert_eq!(feed.documents.len(), 1);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[QueryWindow::Since(ymd(2024, 1, 31))]
    );

    let (monitor, seen) = recording_monitor(None);
    monitor
        .get_filtered_documents_on(&FilterCriteria::all(), ymd(2024, 3, 1))
        .await;
    assert_eq!(seen.lock().unwrap().as_slice(), &[QueryWindow::All]);
}

#[tokio::test]
async fn oversized_default_window_means_all_time() {
    let (monitor, seen) = recording_monitor(Some(u32::MAX));
    let feed = monitor
        .get_filtered_documents_on(&FilterCriteria::all(), ymd(2024, 3, 1))
        .await;
    assert_eq!(feed.documents.len(), 3);
    assert_eq!(seen.lock().unwrap().as_slice(), &[QueryWindow::All]);
}

#[tokio::test]
async fn selected_types_are_pushed_down() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let adapter = TypeRecordingAdapter { seen: seen.clone() };
    let monitor = Monitor::new(Aggregator::new(vec![Box::new(adapter)]), None);

    let c = FilterCriteria::all().with_content_types([ContentType::Rule]);
    let feed = monitor.get_filtered_documents_on(&c, ymd(2024, 3, 1)).await;
    assert_eq!(feed.status, FeedStatus::NoResults);

    monitor
        .get_filtered_documents_on(&FilterCriteria::all(), ymd(2024, 3, 1))
        .await;
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], BTreeSet::from([ContentType::Rule]));
    assert!(seen[1].is_empty());
}
