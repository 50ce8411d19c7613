//! Beta, CAPM expected return and Sharpe ratio from two daily close series.
//!
//! The calculator is a pure function: it borrows its inputs, performs no I/O
//! and never retries. Every failure is terminal for the invocation and
//! surfaces as a [`RiskError`].
//!
//! ```text
//! closes ──▶ log returns ──▶ align by date ──▶ cov / var / mean / stdev ──▶ RiskResult
//! ```

use serde::{Deserialize, Serialize};

use crate::returns::{align_returns, log_returns, AlignedReturns};
use crate::statistics::{mean, sample_covariance, sample_std_dev, sample_variance};
use crate::{PriceSeries, RiskError, SeriesRole, ValidationError};

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0137;
pub const DEFAULT_TRADING_DAYS_PER_YEAR: u32 = 252;

/// Variance at or below this fraction of the mean squared return is rounding
/// noise, not dispersion.
const RELATIVE_VARIANCE_TOLERANCE: f64 = f64::EPSILON;

/// Annualisation and discounting inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Annual risk-free rate as a fraction (`0.0137` = 1.37%).
    pub risk_free_rate: f64,
    pub trading_days_per_year: u32,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
        }
    }
}

impl RiskParams {
    pub fn new(risk_free_rate: f64, trading_days_per_year: u32) -> Result<Self, ValidationError> {
        if !risk_free_rate.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "risk_free_rate",
            });
        }
        if trading_days_per_year == 0 {
            return Err(ValidationError::NonPositiveValue {
                field: "trading_days_per_year",
            });
        }
        Ok(Self {
            risk_free_rate,
            trading_days_per_year,
        })
    }
}

/// Final output of one computation; all three values are always present together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub beta: f64,
    pub capm_return: f64,
    pub sharpe_ratio: f64,
}

/// Compute beta, CAPM return and Sharpe ratio for `instrument` against `benchmark`.
///
/// # Errors
///
/// - [`RiskError::NoData`] if either series is empty (instrument checked first)
/// - [`RiskError::InvalidPrice`] for a close that is not strictly positive
/// - [`RiskError::InsufficientOverlap`] with fewer than two shared return dates
/// - [`RiskError::DegenerateVariance`] if either aligned side has no dispersion
pub fn compute_risk(
    instrument: &PriceSeries,
    benchmark: &PriceSeries,
    params: &RiskParams,
) -> Result<RiskResult, RiskError> {
    compute_aligned(&aligned_log_returns(instrument, benchmark)?, params)
}

/// Log returns of both series joined on their shared dates.
///
/// Fails with [`RiskError::NoData`] or [`RiskError::InvalidPrice`] exactly
/// as [`compute_risk`] does; overlap is not checked here.
pub fn aligned_log_returns(
    instrument: &PriceSeries,
    benchmark: &PriceSeries,
) -> Result<AlignedReturns, RiskError> {
    for series in [instrument, benchmark] {
        if series.is_empty() {
            return Err(RiskError::NoData {
                symbol: series.symbol().clone(),
            });
        }
    }

    let instrument_returns = log_returns(instrument)?;
    let benchmark_returns = log_returns(benchmark)?;
    Ok(align_returns(&instrument_returns, &benchmark_returns))
}

/// Statistics step on already-aligned returns.
pub fn compute_aligned(
    aligned: &AlignedReturns,
    params: &RiskParams,
) -> Result<RiskResult, RiskError> {
    let overlap = aligned.len();
    let insufficient = || RiskError::InsufficientOverlap { overlap };
    if overlap < 2 {
        return Err(insufficient());
    }

    let stock = aligned.instrument();
    let market = aligned.benchmark();
    let rf = params.risk_free_rate;
    let days = f64::from(params.trading_days_per_year);

    let covariance = sample_covariance(stock, market).ok_or_else(insufficient)?;
    let market_variance = sample_variance(market).ok_or_else(insufficient)?;
    if is_flat(market, market_variance) {
        return Err(RiskError::DegenerateVariance {
            series: SeriesRole::Benchmark,
        });
    }
    let beta = covariance / market_variance;

    let market_return = mean(market).ok_or_else(insufficient)? * days;
    let capm_return = rf + beta * (market_return - rf);

    let stock_std_dev = sample_std_dev(stock).ok_or_else(insufficient)?;
    if is_flat(stock, stock_std_dev.powi(2)) {
        return Err(RiskError::DegenerateVariance {
            series: SeriesRole::Instrument,
        });
    }
    let stock_volatility = stock_std_dev * days.sqrt();
    let sharpe_ratio = (capm_return - rf) / stock_volatility;

    Ok(RiskResult {
        beta,
        capm_return,
        sharpe_ratio,
    })
}

/// True when `variance` is zero up to rounding relative to the scale of `returns`.
fn is_flat(returns: &[f64], variance: f64) -> bool {
    let mean_square = returns.iter().map(|r| r * r).sum::<f64>() / returns.len() as f64;
    variance <= RELATIVE_VARIANCE_TOLERANCE * mean_square
}
