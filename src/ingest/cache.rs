// src/ingest/cache.rs
//! Best-effort in-memory response cache keyed by (source, window, requested types).
//!
//! Entries are immutable `Arc` lists; a refresh replaces the entry whole.
//! Failures are never cached, so a down source is retried on the next request.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use metrics::counter;

use crate::document::{ContentType, Document, QueryWindow};
use crate::error::SourceUnavailable;
use crate::ingest::types::SourceAdapter;

type Key = (String, QueryWindow, BTreeSet<ContentType>);

fn key(source: &str, window: &QueryWindow, types: &BTreeSet<ContentType>) -> Key {
    (source.to_string(), *window, types.clone())
}

struct Entry {
    stored_at: Instant,
    documents: Arc<Vec<Document>>,
}

pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<Key, Entry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for the key, if any. Expiry is absolute from the write.
    pub fn get(&self, source: &str, window: &QueryWindow) -> Option<Arc<Vec<Document>>> {
        self.get_types(source, window, &BTreeSet::new())
    }

    pub fn get_types(
        &self,
        source: &str,
        window: &QueryWindow,
        types: &BTreeSet<ContentType>,
    ) -> Option<Arc<Vec<Document>>> {
        self.get_at(key(source, window, types), Instant::now())
    }

    fn get_at(&self, key: Key, now: Instant) -> Option<Arc<Vec<Document>>> {
        let g = self.entries.read().unwrap_or_else(|p| p.into_inner());
        let e = g.get(&key)?;
        (now.duration_since(e.stored_at) < self.ttl).then(|| e.documents.clone())
    }

    pub fn put(&self, source: &str, window: &QueryWindow, documents: Arc<Vec<Document>>) {
        self.put_types(source, window, &BTreeSet::new(), documents);
    }

    pub fn put_types(
        &self,
        source: &str,
        window: &QueryWindow,
        types: &BTreeSet<ContentType>,
        documents: Arc<Vec<Document>>,
    ) {
        self.put_at(key(source, window, types), documents, Instant::now());
    }

    fn put_at(&self, key: Key, documents: Arc<Vec<Document>>, now: Instant) {
        let mut g = self.entries.write().unwrap_or_else(|p| p.into_inner());
        // Drop stale entries on write so the map stays bounded by live keys.
        g.retain(|_, e| now.duration_since(e.stored_at) < self.ttl);
        g.insert(
            key,
            Entry {
                stored_at: now,
                documents,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wraps an adapter with a shared `ResponseCache`.
pub struct CachingAdapter {
    inner: Box<dyn SourceAdapter>,
    cache: Arc<ResponseCache>,
}

impl CachingAdapter {
    pub fn new(inner: Box<dyn SourceAdapter>, cache: Arc<ResponseCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CachingAdapter {
    async fn fetch(&self, window: &QueryWindow) -> Result<Vec<Document>, SourceUnavailable> {
        self.fetch_types(window, &BTreeSet::new()).await
    }

    async fn fetch_types(
        &self,
        window: &QueryWindow,
        types: &BTreeSet<ContentType>,
    ) -> Result<Vec<Document>, SourceUnavailable> {
        let name = self.inner.name();
        if let Some(hit) = self.cache.get_types(name, window, types) {
            counter!("source_cache_hits_total").increment(1);
            tracing::debug!(target: "ingest", provider = name, %window, "cache hit");
            return Ok(hit.as_ref().clone());
        }

        counter!("source_cache_misses_total").increment(1);
        let fresh = self.inner.fetch_types(window, types).await?;
        self.cache.put_types(name, window, types, Arc::new(fresh.clone()));
        Ok(fresh)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_key(source: &str) -> Key {
        key(source, &QueryWindow::All, &BTreeSet::new())
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.put_at(all_key("Federal Register"), Arc::new(vec![]), t0);

        assert!(cache
            .get_at(all_key("Federal Register"), t0 + Duration::from_secs(59))
            .is_some());
        assert!(cache
            .get_at(all_key("Federal Register"), t0 + Duration::from_secs(60))
            .is_none());
    }

    #[test]
    fn key_includes_window() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("Federal Register", &QueryWindow::Year(2024), Arc::new(vec![]));
        assert!(cache.get("Federal Register", &QueryWindow::Year(2024)).is_some());
        assert!(cache.get("Federal Register", &QueryWindow::All).is_none());
        assert!(cache.get("OSHA Directives", &QueryWindow::Year(2024)).is_none());
    }

    #[test]
    fn key_includes_requested_types() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let rules: BTreeSet<_> = [ContentType::Rule].into();
        cache.put_types("Federal Register", &QueryWindow::All, &rules, Arc::new(vec![]));
        assert!(cache
            .get_types("Federal Register", &QueryWindow::All, &rules)
            .is_some());
        assert!(cache.get("Federal Register", &QueryWindow::All).is_none());
    }

    #[test]
    fn stale_entries_are_pruned_on_write() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.put_at(all_key("a"), Arc::new(vec![]), t0);
        cache.put_at(all_key("b"), Arc::new(vec![]), t0 + Duration::from_secs(11));
        assert_eq!(cache.len(), 1);
    }
}
