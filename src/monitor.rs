// src/monitor.rs
//! The boundary the page consumes: aggregate, filter, report status.

use chrono::NaiveDate;
use serde::Serialize;

use crate::document::{Document, QueryWindow};
use crate::filter::FilterCriteria;
use crate::ingest::config::MonitorConfig;
use crate::ingest::Aggregator;

/// How the page should present a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Ok,
    /// Sources answered but nothing matched. Not an error.
    NoResults,
    /// Every configured source failed.
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentFeed {
    pub documents: Vec<Document>,
    pub status: FeedStatus,
    pub failed_sources: Vec<String>,
}

pub struct Monitor {
    aggregator: Aggregator,
    window_days: Option<u32>,
}

impl Monitor {
    pub fn new(aggregator: Aggregator, window_days: Option<u32>) -> Self {
        Self {
            aggregator,
            window_days,
        }
    }

    pub fn from_config(cfg: &MonitorConfig) -> anyhow::Result<Self> {
        Ok(Self::new(Aggregator::from_config(cfg)?, cfg.window_days))
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Window sent to the sources: a selected year is pushed down, otherwise
    /// the configured default. Selected content types are pushed down too.
    pub fn window_for(&self, criteria: &FilterCriteria, today: NaiveDate) -> QueryWindow {
        match (criteria.year, self.window_days) {
            (Some(y), _) => QueryWindow::Year(y),
            (None, Some(days)) => QueryWindow::since_days_before(today, days),
            (None, None) => QueryWindow::All,
        }
    }

    pub async fn get_filtered_documents(&self, criteria: &FilterCriteria) -> DocumentFeed {
        let today = chrono::Local::now().date_naive();
        self.get_filtered_documents_on(criteria, today).await
    }

    pub async fn get_filtered_documents_on(
        &self,
        criteria: &FilterCriteria,
        today: NaiveDate,
    ) -> DocumentFeed {
        let window = self.window_for(criteria, today);
        let agg = self
            .aggregator
            .aggregate_types(&window, &criteria.content_types)
            .await;

        let documents = criteria.apply(&agg.documents);
        let status = if agg.all_sources_failed() {
            FeedStatus::Unavailable
        } else if documents.is_empty() {
            FeedStatus::NoResults
        } else {
            FeedStatus::Ok
        };

        DocumentFeed {
            documents,
            status,
            failed_sources: agg.failed_sources(),
        }
    }
}
