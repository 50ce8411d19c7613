use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use crate::data_source::{DailyClosesRequest, HealthStatus, PriceSource, SourceError};
use crate::{PriceSeries, ProviderId, Symbol};

/// Fixture-backed source for tests and offline runs.
///
/// Unknown symbols yield an empty series. Every request is counted per
/// symbol so callers can assert how often the source was consulted.
#[derive(Debug, Default)]
pub struct InMemorySource {
    series: HashMap<Symbol, PriceSeries>,
    failures: HashMap<Symbol, SourceError>,
    calls: Mutex<HashMap<Symbol, usize>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    /// Makes every request for `symbol` fail with `error`.
    pub fn with_failure(mut self, symbol: Symbol, error: SourceError) -> Self {
        self.failures.insert(symbol, error);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().clone(), series);
    }

    pub fn call_count(&self, symbol: &Symbol) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    fn lookup(&self, req: &DailyClosesRequest) -> Result<PriceSeries, SourceError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(req.symbol.clone())
            .or_default() += 1;

        if let Some(error) = self.failures.get(&req.symbol) {
            return Err(error.clone());
        }

        Ok(self
            .series
            .get(&req.symbol)
            .map(|series| series.within(&req.range))
            .unwrap_or_else(|| PriceSeries::empty(req.symbol.clone())))
    }
}

impl PriceSource for InMemorySource {
    fn id(&self) -> ProviderId {
        ProviderId::Memory
    }

    fn daily_closes<'a>(
        &'a self,
        req: DailyClosesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.lookup(&req) })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async { HealthStatus::healthy() })
    }
}
