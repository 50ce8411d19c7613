//! # Domain Models
//!
//! Canonical domain types for daily price history.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker, index tickers (`^GSPC`) included |
//! | [`PricePoint`] | One trading day's close |
//! | [`PriceSeries`] | Date-ordered closes for one symbol |
//! | [`DateRange`] | Inclusive request window |
//! | [`LookbackWindow`] | Fixed day-count or calendar-year lookback |
//!
//! Ordering is enforced at construction; positivity of closes is enforced
//! by the return derivation so the failure can carry the offending date.

mod calendar;
mod price;
mod symbol;

pub use calendar::{
    iso_date, parse_date, today_utc, DateRange, LookbackWindow, DEFAULT_LOOKBACK_DAYS,
};
pub use price::{PricePoint, PriceSeries};
pub use symbol::Symbol;
