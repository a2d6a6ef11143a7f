//! Caller-owned memoization keyed by content fingerprints.
//!
//! Every cached computation is a pure function of its key, so a hit is
//! always interchangeable with a recomputation. Safe to share across the
//! rayon workers of a parallel pipeline run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

use sentiquant_core::domain::{AnnotatedNews, ContentKey, PriceSeries};

/// Hit/miss counters of a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// One keyed memo table.
#[derive(Debug)]
pub struct Memo<V> {
    entries: Mutex<HashMap<ContentKey, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> Memo<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &ContentKey) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn insert(&self, key: ContentKey, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, value);
    }

    /// Cached value for `key`, computing and storing it on a miss. The lock
    /// is not held while `compute` runs; concurrent misses on one key may
    /// both compute, and the results are identical.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &ContentKey,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "cache hit");
            return Ok(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute()?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Memo tables for the pipeline's expensive per-input stages.
#[derive(Debug)]
pub struct AnalysisCache {
    /// Price series with indicator columns, keyed by series + indicator params.
    pub indicators: Memo<PriceSeries>,
    /// Annotated headlines, keyed by the news content.
    pub sentiment: Memo<Vec<AnnotatedNews>>,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self {
            indicators: Memo::new(),
            sentiment: Memo::new(),
        }
    }

    pub fn clear(&self) {
        self.indicators.clear();
        self.sentiment.clear();
    }

    /// Combined counters over every memo table.
    pub fn stats(&self) -> CacheStats {
        let (a, b) = (self.indicators.stats(), self.sentiment.stats());
        CacheStats {
            hits: a.hits + b.hits,
            misses: a.misses + b.misses,
        }
    }
}
