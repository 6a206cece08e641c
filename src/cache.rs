// Infra-type cache layer
// This file provides a bounded, time-limited cache in front of any
// infra-type source so hot functions skip the control-plane round trip
//
// Numan Thabit 2025 Nov

use crate::infra::InfraTypeSource;
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::trace;

/// TTL + LRU cache keyed by function name.
///
/// The lock is never held across the inner lookup, so two concurrent misses
/// for the same function may both reach the inner source.
pub struct CachedInfraTypes<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<LruCache<String, (String, Instant)>>,
}

impl<S: InfraTypeSource> CachedInfraTypes<S> {
    pub fn new(inner: S, ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn lookup(&self, service: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let cached = entries
            .get(service)
            .map(|(label, stored)| (label.clone(), stored.elapsed() < self.ttl));
        match cached {
            Some((label, true)) => Some(label),
            Some((_, false)) => {
                entries.pop(service);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl<S: InfraTypeSource> InfraTypeSource for CachedInfraTypes<S> {
    async fn infra_type(&self, service: &str) -> String {
        if let Some(label) = self.lookup(service) {
            trace!(service, "infra type cache hit");
            return label;
        }
        let label = self.inner.infra_type(service).await;
        self.entries
            .lock()
            .put(service.to_string(), (label.clone(), Instant::now()));
        label
    }
}
