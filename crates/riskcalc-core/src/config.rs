use std::env;
use std::time::Duration;

use crate::calculator::{RiskParams, DEFAULT_RISK_FREE_RATE, DEFAULT_TRADING_DAYS_PER_YEAR};
use crate::{LookbackWindow, Symbol, DEFAULT_LOOKBACK_DAYS};

pub const DEFAULT_BENCHMARK: &str = "^GSPC";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Analysis defaults derived from environment variables.
///
/// Missing, blank or unparsable values fall back to the built-in defaults;
/// command-line flags override whatever is loaded here.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub params: RiskParams,
    pub lookback: LookbackWindow,
    pub benchmark: Symbol,
    pub timeout_ms: u64,
    pub cache_ttl: Duration,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl RiskConfig {
    /// Reads `RISKCALC_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = EnvVars { lookup };

        let risk_free_rate = Some(vars.f64("RISKCALC_RISK_FREE_RATE", DEFAULT_RISK_FREE_RATE))
            .filter(|rate| rate.is_finite())
            .unwrap_or(DEFAULT_RISK_FREE_RATE);
        let trading_days_per_year =
            Some(vars.u32("RISKCALC_TRADING_DAYS", DEFAULT_TRADING_DAYS_PER_YEAR))
                .filter(|days| *days > 0)
                .unwrap_or(DEFAULT_TRADING_DAYS_PER_YEAR);
        let params = RiskParams {
            risk_free_rate,
            trading_days_per_year,
        };

        let lookback_days = vars.u32("RISKCALC_LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS);
        let lookback = if lookback_days == 0 {
            LookbackWindow::default()
        } else {
            LookbackWindow::FixedDays(lookback_days)
        };

        let benchmark = vars
            .string("RISKCALC_BENCHMARK")
            .and_then(|value| Symbol::parse(&value).ok())
            .unwrap_or_else(default_benchmark);

        Self {
            params,
            lookback,
            benchmark,
            timeout_ms: vars.u64("RISKCALC_TIMEOUT_MS", DEFAULT_TIMEOUT_MS),
            cache_ttl: Duration::from_secs(
                vars.u64("RISKCALC_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            ),
        }
    }
}

fn default_benchmark() -> Symbol {
    Symbol::parse(DEFAULT_BENCHMARK).expect("default benchmark is a valid symbol")
}

struct EnvVars<F> {
    lookup: F,
}

impl<F> EnvVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn f64(&self, name: &str, default: f64) -> f64 {
        self.string(name)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    fn u32(&self, name: &str, default: u32) -> u32 {
        self.string(name)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    fn u64(&self, name: &str, default: u64) -> u64 {
        self.string(name)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }
}
