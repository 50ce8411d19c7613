//! End-to-end analysis: resolve the window, fetch both histories
//! concurrently, then hand them to the calculator.

use std::sync::Arc;

use serde::Serialize;
use time::Date;

use crate::calculator::{aligned_log_returns, compute_aligned, RiskParams, RiskResult};
use crate::config::RiskConfig;
use crate::data_source::{DailyClosesRequest, PriceSource};
use crate::{AnalysisError, DateRange, LookbackWindow, PriceSeries, ProviderId, RiskError, Symbol};

/// Outcome of one analysis, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub instrument: Symbol,
    pub benchmark: Symbol,
    pub range: DateRange,
    /// Shared return dates the statistics were computed over.
    pub observations: usize,
    pub params: RiskParams,
    pub source: ProviderId,
    pub result: RiskResult,
}

/// Runs risk analyses against one price source.
#[derive(Clone)]
pub struct RiskAnalyzer {
    source: Arc<dyn PriceSource>,
    params: RiskParams,
    lookback: LookbackWindow,
}

impl std::fmt::Debug for RiskAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskAnalyzer")
            .field("source", &self.source.id())
            .field("params", &self.params)
            .field("lookback", &self.lookback)
            .finish()
    }
}

impl RiskAnalyzer {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            params: RiskParams::default(),
            lookback: LookbackWindow::default(),
        }
    }

    pub fn from_config(source: Arc<dyn PriceSource>, config: &RiskConfig) -> Self {
        Self::new(source)
            .with_params(config.params)
            .with_lookback(config.lookback)
    }

    pub fn with_params(mut self, params: RiskParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_lookback(mut self, lookback: LookbackWindow) -> Self {
        self.lookback = lookback;
        self
    }

    pub const fn params(&self) -> &RiskParams {
        &self.params
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }

    /// Window ending at `end` under the configured lookback.
    pub fn window(&self, end: Date) -> Result<DateRange, AnalysisError> {
        Ok(DateRange::lookback(end, self.lookback)?)
    }

    /// Beta, CAPM return and Sharpe ratio of `instrument` against `benchmark`
    /// over the lookback window ending at `end`.
    ///
    /// Each symbol is requested exactly once; both requests run concurrently
    /// and the first failure aborts the analysis.
    pub async fn analyze(
        &self,
        instrument: &Symbol,
        benchmark: &Symbol,
        end: Date,
    ) -> Result<RiskReport, AnalysisError> {
        let range = self.window(end)?;
        tracing::debug!(
            %instrument,
            %benchmark,
            %range,
            source = %self.source.id(),
            "starting analysis"
        );

        let (instrument_closes, benchmark_closes) =
            tokio::try_join!(self.fetch(instrument, range), self.fetch(benchmark, range))?;

        let aligned = aligned_log_returns(&instrument_closes, &benchmark_closes)?;
        let result = compute_aligned(&aligned, &self.params)?;

        tracing::info!(
            %instrument,
            %benchmark,
            observations = aligned.len(),
            beta = result.beta,
            capm_return = result.capm_return,
            sharpe_ratio = result.sharpe_ratio,
            "analysis complete"
        );

        Ok(RiskReport {
            instrument: instrument.clone(),
            benchmark: benchmark.clone(),
            range,
            observations: aligned.len(),
            params: self.params,
            source: self.source.id(),
            result,
        })
    }

    /// Daily closes of `symbol` over the lookback window ending at `end`.
    ///
    /// An empty history is reported as [`RiskError::NoData`].
    pub async fn closes(&self, symbol: &Symbol, end: Date) -> Result<PriceSeries, AnalysisError> {
        let range = self.window(end)?;
        let series = self.fetch(symbol, range).await?;
        if series.is_empty() {
            return Err(RiskError::NoData {
                symbol: symbol.clone(),
            }
            .into());
        }
        Ok(series)
    }

    async fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<PriceSeries, AnalysisError> {
        let series = self
            .source
            .daily_closes(DailyClosesRequest::new(symbol.clone(), range))
            .await
            .map_err(|source| {
                tracing::warn!(%symbol, error = %source, "price source request failed");
                AnalysisError::Source {
                    symbol: symbol.clone(),
                    source,
                }
            })?;
        tracing::debug!(%symbol, closes = series.len(), "closes received");
        Ok(series)
    }
}
