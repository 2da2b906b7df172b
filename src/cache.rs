//! Time-bounded cache for fetched bar series.
//!
//! Sits in front of the market data client so repeated runs inside the TTL
//! (watch-mode refreshes, back-to-back invocations in one process) reuse the
//! previous response instead of re-hitting the provider. The signal pipeline
//! never sees this; callers own it.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::bars::BarSeries;

/// Default time-to-live for a cached fetch
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// In-memory TTL cache keyed by symbol
pub struct FetchCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

struct CacheEntry {
    fetched_at: Instant,
    series: BarSeries,
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Cached series for `symbol`, if still fresh.
    pub fn get(&self, symbol: &str) -> Option<&BarSeries> {
        let entry = self.entries.get(symbol)?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        Some(&entry.series)
    }

    /// Store a freshly fetched series.
    pub fn insert(&mut self, symbol: &str, series: BarSeries) {
        self.entries.insert(
            symbol.to_string(),
            CacheEntry {
                fetched_at: Instant::now(),
                series,
            },
        );
    }

    /// Fetch through the cache: return the fresh entry, or run `fetch` and
    /// remember its result.
    pub async fn get_or_fetch<F, Fut>(&mut self, symbol: &str, fetch: F) -> Result<BarSeries>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BarSeries>>,
    {
        if let Some(series) = self.get(symbol) {
            debug!("Cache hit for {} ({} bars)", symbol, series.len());
            return Ok(series.clone());
        }
        let series = fetch().await?;
        self.insert(symbol, series.clone());
        Ok(series)
    }
}
