use std::future::Future;
use std::pin::Pin;

use time::{Date, Weekday};

use crate::data_source::{DailyClosesRequest, HealthStatus, PriceSource, SourceError};
use crate::{PricePoint, PriceSeries, ProviderId, Symbol};

const MARKET_SALT: u64 = 0x5eed_6a11_0000_0001;
const MARKET_DAILY_SCALE: f64 = 0.012;
const IDIOSYNCRATIC_SCALE: f64 = 0.015;

/// Deterministic offline source.
///
/// Every weekday in the requested range gets a close. Returns are driven by
/// a market factor shared across symbols (keyed by date) plus per-symbol
/// noise, with a per-symbol exposure in `[0.5, 1.8)`. Index tickers track
/// the market factor alone, so a stock measured against an index shows a
/// plausible beta. Identical requests always return identical series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSource;

impl SyntheticSource {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, req: &DailyClosesRequest) -> PriceSeries {
        let seed = symbol_seed(&req.symbol);
        let exposure = if req.symbol.is_index() {
            1.0
        } else {
            0.5 + (seed % 1300) as f64 / 1000.0
        };
        let mut noise = fastrand::Rng::with_seed(seed ^ req.range.start().to_julian_day() as u64);
        let mut close = 50.0 + (seed % 200) as f64;

        let mut points = Vec::new();
        let mut day = Some(req.range.start());
        while let Some(date) = day.filter(|date| *date <= req.range.end()) {
            if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
                let mut log_return = exposure * market_shock(date);
                if !req.symbol.is_index() {
                    log_return += IDIOSYNCRATIC_SCALE * centered(&mut noise);
                }
                close *= log_return.exp();
                points.push(PricePoint::new(date, close));
            }
            day = date.next_day();
        }

        // Dates are generated in increasing order.
        PriceSeries::new(req.symbol.clone(), points)
            .unwrap_or_else(|_| PriceSeries::empty(req.symbol.clone()))
    }
}

impl PriceSource for SyntheticSource {
    fn id(&self) -> ProviderId {
        ProviderId::Synthetic
    }

    fn daily_closes<'a>(
        &'a self,
        req: DailyClosesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.generate(&req)) })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async { HealthStatus::healthy() })
    }
}

fn market_shock(date: Date) -> f64 {
    let mut rng = fastrand::Rng::with_seed(MARKET_SALT ^ date.to_julian_day() as u64);
    0.0003 + MARKET_DAILY_SCALE * centered(&mut rng)
}

// Sum of two uniforms: triangular on [-1, 1], mean zero.
fn centered(rng: &mut fastrand::Rng) -> f64 {
    rng.f64() + rng.f64() - 1.0
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol
        .as_str()
        .bytes()
        .fold(5381_u64, |acc, byte| acc.wrapping_mul(33).wrapping_add(u64::from(byte)))
}
