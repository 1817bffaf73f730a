// src/ingest/types.rs
use std::collections::BTreeSet;

use crate::document::{ContentType, Document, QueryWindow};
use crate::error::SourceUnavailable;

/// Shared capability of every upstream source: fetch and normalize to `Document`.
///
/// A reachable source with nothing in the window returns `Ok(vec![])`.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, window: &QueryWindow) -> Result<Vec<Document>, SourceUnavailable>;

    /// Fetch only `types` (empty means every type). Sources that cannot narrow
    /// their query return everything and leave the rest to the filter.
    async fn fetch_types(
        &self,
        window: &QueryWindow,
        _types: &BTreeSet<ContentType>,
    ) -> Result<Vec<Document>, SourceUnavailable> {
        self.fetch(window).await
    }

    fn name(&self) -> &str;
}
