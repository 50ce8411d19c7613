//! In-memory TTL cache of normalized close histories.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::data_source::DailyClosesRequest;
use crate::PriceSeries;

#[derive(Debug, Clone)]
struct CachedSeries {
    series: PriceSeries,
    expires_at: Instant,
}

/// Shared cache keyed by symbol and date range.
///
/// A TTL of zero disables the cache: lookups always miss and inserts are
/// dropped.
#[derive(Debug, Clone)]
pub struct SeriesCache {
    entries: Arc<RwLock<HashMap<String, CachedSeries>>>,
    ttl: Duration,
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key(request: &DailyClosesRequest) -> String {
        format!("{}|{}", request.symbol, request.range)
    }

    pub async fn get(&self, request: &DailyClosesRequest) -> Option<PriceSeries> {
        if self.ttl.is_zero() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(&Self::key(request))
            .filter(|entry| Instant::now() <= entry.expires_at)
            .map(|entry| entry.series.clone())
    }

    pub async fn put(&self, request: &DailyClosesRequest, series: PriceSeries) {
        if self.ttl.is_zero() {
            return;
        }
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > Instant::now());
        entries.insert(Self::key(request), CachedSeries { series, expires_at });
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
