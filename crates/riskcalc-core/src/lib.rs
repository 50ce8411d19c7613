//! # riskcalc core
//!
//! Beta, CAPM expected return and Sharpe ratio for a ticker measured against
//! a benchmark index, from daily closing prices.
//!
//! ## Overview
//!
//! - **Domain types** for tickers, daily closes and lookback windows
//! - **Calculator**: log returns, date alignment, sample statistics and the
//!   three risk figures, as a pure function
//! - **Price source trait** with Yahoo, synthetic and in-memory adapters
//! - **Resilience** for the live source: throttle, retry, circuit breaker, cache
//! - **Analyzer** that fetches both histories concurrently and computes
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Price source adapters (Yahoo, synthetic, in-memory) |
//! | [`analyzer`] | Fetch-then-compute orchestration |
//! | [`cache`] | TTL cache of fetched series |
//! | [`calculator`] | Beta / CAPM / Sharpe computation |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`config`] | Environment-derived defaults |
//! | [`data_source`] | Price source trait and request types |
//! | [`domain`] | Symbol, price series, date ranges |
//! | [`error`] | Validation, risk and analysis errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`returns`] | Log returns and date alignment |
//! | [`retry`] | Backoff and retry loop |
//! | [`source`] | Provider identifiers |
//! | [`statistics`] | Sample mean, variance, covariance |
//! | [`throttling`] | Client-side rate limiting |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use riskcalc_core::{today_utc, RiskAnalyzer, Symbol, SyntheticSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = RiskAnalyzer::new(Arc::new(SyntheticSource::new()));
//!     let report = analyzer
//!         .analyze(&Symbol::parse("AAPL")?, &Symbol::parse("^GSPC")?, today_utc())
//!         .await?;
//!
//!     println!("beta {:.2}", report.result.beta);
//!     println!("capm {:.2}%", report.result.capm_return * 100.0);
//!     println!("sharpe {:.2}", report.result.sharpe_ratio);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use riskcalc_core::{RiskError, SeriesRole};
//!
//! fn explain(error: &RiskError) -> String {
//!     match error {
//!         RiskError::NoData { symbol } => format!("nothing to analyse for {symbol}"),
//!         RiskError::DegenerateVariance { series: SeriesRole::Benchmark } => {
//!             "benchmark never moved".to_owned()
//!         }
//!         other => other.to_string(),
//!     }
//! }
//! ```

pub mod adapters;
pub mod analyzer;
pub mod cache;
pub mod calculator;
pub mod circuit_breaker;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod retry;
pub mod returns;
pub mod source;
pub mod statistics;
pub mod throttling;

// Adapter implementations
pub use adapters::{InMemorySource, SyntheticSource, YahooAuth, YahooSource};

// Analysis
pub use analyzer::{RiskAnalyzer, RiskReport};

// Caching
pub use cache::SeriesCache;

// Calculator
pub use calculator::{
    aligned_log_returns, compute_aligned, compute_risk, RiskParams, RiskResult,
    DEFAULT_RISK_FREE_RATE, DEFAULT_TRADING_DAYS_PER_YEAR,
};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Configuration
pub use config::{RiskConfig, DEFAULT_BENCHMARK};

// Price source trait and types
pub use data_source::{
    DailyClosesRequest, HealthState, HealthStatus, PriceSource, SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{
    iso_date, parse_date, today_utc, DateRange, LookbackWindow, PricePoint, PriceSeries, Symbol,
    DEFAULT_LOOKBACK_DAYS,
};

// Error types
pub use error::{AnalysisError, RiskError, SeriesRole, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Returns
pub use returns::{align_returns, log_returns, AlignedReturns, ReturnPoint, ReturnSeries};

// Retry logic
pub use retry::RetryPolicy;

// Source identifiers
pub use source::ProviderId;

// Throttling
pub use throttling::RequestThrottle;
