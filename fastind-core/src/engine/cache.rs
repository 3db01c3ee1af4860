//! Memoized indicator results for the current date window.

use crate::engine::args::CallKey;
use crate::engine::result::IndicatorResult;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache counters, cumulative over the engine's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub entries: usize,
    pub epoch: u64,
}

/// Results keyed by [`CallKey`], all computed over the same date window.
///
/// The whole cache is dropped whenever the window widens; each drop starts a
/// new epoch.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<CallKey, Arc<IndicatorResult>>,
    epoch: u64,
    hits: u64,
    misses: u64,
    invalidations: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, counting the hit or miss.
    pub fn get(&mut self, key: &CallKey) -> Option<Arc<IndicatorResult>> {
        match self.entries.get(key) {
            Some(result) => {
                self.hits += 1;
                Some(Arc::clone(result))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CallKey, result: Arc<IndicatorResult>) {
        self.entries.insert(key, result);
    }

    /// Drop every entry and start a new epoch.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.epoch += 1;
        self.invalidations += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn keys(&self) -> impl Iterator<Item = &CallKey> {
        self.entries.keys()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            invalidations: self.invalidations,
            entries: self.entries.len(),
            epoch: self.epoch,
        }
    }
}
