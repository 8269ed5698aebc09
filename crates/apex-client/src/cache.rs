//! Reference data cache using moka
//!
//! Spares repeat master-data fetches across sessions opened by the same
//! client. A single session still sees one immutable snapshot.

use apex_model::{ReferenceCollection, ReferenceKind};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Cache of reference collections keyed by kind
#[derive(Debug, Clone)]
pub struct ReferenceCache {
    inner: Cache<ReferenceKind, Arc<ReferenceCollection>>,
}

impl ReferenceCache {
    /// Create cache whose entries expire after `ttl`
    #[inline]
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(ReferenceKind::ALL.len() as u64)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Store a freshly fetched collection
    #[inline]
    pub async fn insert(&self, kind: ReferenceKind, collection: ReferenceCollection) {
        self.inner.insert(kind, Arc::new(collection)).await;
    }

    /// Cached collection, if present and not expired
    #[inline]
    pub async fn get(&self, kind: ReferenceKind) -> Option<Arc<ReferenceCollection>> {
        self.inner.get(&kind).await
    }

    /// Drop one collection
    #[inline]
    pub async fn invalidate(&self, kind: ReferenceKind) {
        self.inner.invalidate(&kind).await;
    }

    /// Drop everything
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_model::ReferenceRecord;

    fn sites() -> ReferenceCollection {
        [ReferenceRecord::new(1, "Head Office")].into_iter().collect()
    }

    #[tokio::test]
    async fn insert_then_get() {
        let cache = ReferenceCache::with_ttl(Duration::from_secs(60));
        assert!(cache.get(ReferenceKind::Sites).await.is_none());

        cache.insert(ReferenceKind::Sites, sites()).await;
        let cached = cache.get(ReferenceKind::Sites).await.unwrap();
        assert_eq!(cached.get(1).map(ReferenceRecord::display_name), Some("Head Office"));
        assert!(cache.get(ReferenceKind::Assets).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = ReferenceCache::with_ttl(Duration::from_secs(60));
        cache.insert(ReferenceKind::Sites, sites()).await;
        cache.invalidate(ReferenceKind::Sites).await;
        assert!(cache.get(ReferenceKind::Sites).await.is_none());
    }
}
