//! Price source trait and request/response types.
//!
//! This module defines the adapter contract (`PriceSource`) every provider
//! follows. A source answers one question: the daily closes of a symbol over
//! a date range. An empty [`PriceSeries`] is the "no data" signal; transport
//! and upstream problems are [`SourceError`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! use riskcalc_core::{DailyClosesRequest, DateRange, LookbackWindow, PriceSource, Symbol, today_utc};
//!
//! async fn fetch(source: &dyn PriceSource) -> Result<(), Box<dyn std::error::Error>> {
//!     let range = DateRange::lookback(today_utc(), LookbackWindow::default())?;
//!     let request = DailyClosesRequest::new(Symbol::parse("AAPL")?, range);
//!     let series = source.daily_closes(request).await?;
//!     println!("{} closes for {}", series.len(), series.symbol());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DateRange, PriceSeries, ProviderId, Symbol};

/// Health state reported by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub rate_available: bool,
}

impl HealthStatus {
    pub const fn new(state: HealthState, rate_available: bool) -> Self {
        Self {
            state,
            rate_available,
        }
    }

    pub const fn healthy() -> Self {
        Self::new(HealthState::Healthy, true)
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    /// Unavailable, but retrying within this request would not help.
    pub fn circuit_open(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for a daily close history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyClosesRequest {
    pub symbol: Symbol,
    pub range: DateRange,
}

impl DailyClosesRequest {
    pub fn new(symbol: Symbol, range: DateRange) -> Self {
        Self { symbol, range }
    }
}

/// Price source contract.
///
/// Implementations must return closes strictly ordered by date and limited
/// to the requested range. Sources must be `Send + Sync`: the analyzer
/// issues the instrument and benchmark requests concurrently.
pub trait PriceSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches daily closes for `req.symbol` within `req.range`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the provider is unavailable, rate limited,
    /// or returned a payload that could not be normalized. An unknown
    /// symbol is not an error: it yields an empty series.
    fn daily_closes<'a>(
        &'a self,
        req: DailyClosesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;

    /// Returns the current health status of this source.
    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability_follows_kind() {
        assert!(SourceError::unavailable("down").retryable());
        assert!(SourceError::rate_limited("slow down").retryable());
        assert!(!SourceError::invalid_request("bad").retryable());
        assert!(!SourceError::internal("parse").retryable());
    }

    #[test]
    fn display_includes_code() {
        let error = SourceError::rate_limited("yahoo returned 429");
        assert_eq!(error.to_string(), "yahoo returned 429 (source.rate_limited)");
    }
}
