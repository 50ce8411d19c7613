//! Behavior-driven tests for the risk calculation pipeline
//!
//! These tests verify WHAT the calculator reports for known inputs and HOW it
//! rejects inputs that cannot produce a meaningful beta or Sharpe ratio.

use approx::assert_relative_eq;
use riskcalc_core::{
    align_returns, compute_risk, log_returns, RiskError, RiskParams, SeriesRole,
};
use riskcalc_tests::{dated, series, weekdays};
use time::macros::date;

fn scenario() -> (riskcalc_core::PriceSeries, riskcalc_core::PriceSeries) {
    let dates = weekdays(date!(2024 - 01 - 02), 4);
    (
        series("ACME", &dated(&dates, &[100.0, 102.0, 101.0, 105.0])),
        series("^GSPC", &dated(&dates, &[1000.0, 1010.0, 1005.0, 1020.0])),
    )
}

// =============================================================================
// Risk Calculation: Reference Values
// =============================================================================

#[test]
fn when_closes_share_every_date_system_reports_reference_values() {
    // Given: Four aligned closes for an instrument and its benchmark
    let (instrument, benchmark) = scenario();

    // When: Risk is computed with the default 1.37% rate and 252 trading days
    let result = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect("scenario computes");

    // Then: All three figures match the hand-derived values
    assert_relative_eq!(result.beta, 2.350615160041499, epsilon = 1e-9);
    assert_relative_eq!(result.capm_return, 3.891558470515778, epsilon = 1e-9);
    assert_relative_eq!(result.sharpe_ratio, 9.95515809543802, epsilon = 1e-9);
}

#[test]
fn when_risk_free_rate_changes_system_moves_capm_along_the_security_market_line() {
    // Given: The same scenario priced with a zero risk-free rate
    let (instrument, benchmark) = scenario();
    let params = RiskParams::new(0.0, 252).expect("valid params");

    // When: Risk is computed
    let result = compute_risk(&instrument, &benchmark, &params).expect("scenario computes");

    // Then: CAPM collapses to beta times the annualised market return
    let market_return = 1.6634206928791;
    assert_relative_eq!(result.beta, 2.350615160041499, epsilon = 1e-9);
    assert_relative_eq!(result.capm_return, result.beta * market_return, epsilon = 1e-9);
}

#[test]
fn when_instrument_tracks_benchmark_system_reports_unit_beta() {
    // Given: An instrument whose closes are the benchmark scaled by a constant
    let dates = weekdays(date!(2024 - 03 - 04), 6);
    let closes = [50.0, 51.0, 49.5, 52.25, 53.0, 52.0];
    let scaled: Vec<f64> = closes.iter().map(|close| close * 3.0).collect();
    let instrument = series("MIRR", &dated(&dates, &scaled));
    let benchmark = series("^NDX", &dated(&dates, &closes));

    // When: Risk is computed
    let result = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect("tracking series computes");

    // Then: Price level does not matter, only relative moves
    assert_relative_eq!(result.beta, 1.0, epsilon = 1e-9);
}

#[test]
fn when_instrument_moves_twice_as_far_system_reports_beta_of_two() {
    // Given: Instrument closes equal to the square of the benchmark closes,
    // so every log return is exactly doubled
    let dates = weekdays(date!(2024 - 03 - 04), 5);
    let closes = [10.0, 10.5, 10.2, 10.9, 11.1];
    let squared: Vec<f64> = closes.iter().map(|close| close * close).collect();
    let instrument = series("LEVR", &dated(&dates, &squared));
    let benchmark = series("^GSPC", &dated(&dates, &closes));

    // When: Risk is computed
    let result = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect("leveraged series computes");

    // Then: Beta is two
    assert_relative_eq!(result.beta, 2.0, epsilon = 1e-9);
}

// =============================================================================
// Risk Calculation: Determinism
// =============================================================================

#[test]
fn when_computed_twice_system_returns_identical_results() {
    // Given: The reference scenario
    let (instrument, benchmark) = scenario();
    let before = (instrument.clone(), benchmark.clone());

    // When: Risk is computed twice
    let first = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect("first run");
    let second = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect("second run");

    // Then: Results are bit-identical and the inputs are untouched
    assert_eq!(first.beta.to_bits(), second.beta.to_bits());
    assert_eq!(first.capm_return.to_bits(), second.capm_return.to_bits());
    assert_eq!(first.sharpe_ratio.to_bits(), second.sharpe_ratio.to_bits());
    assert_eq!((instrument, benchmark), before);
}

// =============================================================================
// Returns and Alignment
// =============================================================================

#[test]
fn when_series_has_n_closes_system_derives_n_minus_one_returns() {
    // Given: Five valid closes
    let dates = weekdays(date!(2024 - 05 - 06), 5);
    let closes = series("ACME", &dated(&dates, &[10.0, 11.0, 10.5, 10.5, 12.0]));

    // When: Log returns are derived
    let returns = log_returns(&closes).expect("valid closes");

    // Then: Each return is finite and keyed by the later date
    assert_eq!(returns.len(), 4);
    assert!(returns.points().iter().all(|point| point.log_return.is_finite()));
    assert_eq!(returns.points()[0].date, dates[1]);
    assert_relative_eq!(returns.points()[0].log_return, (11.0_f64 / 10.0).ln());
    assert_eq!(returns.points()[2].log_return, 0.0);
}

#[test]
fn when_dates_partially_overlap_system_keeps_only_shared_dates_in_order() {
    // Given: Series with a one-day gap on each side
    let days = weekdays(date!(2024 - 02 - 05), 7);
    let instrument_days = [days[0], days[1], days[2], days[4], days[5], days[6]];
    let benchmark_days = [days[0], days[1], days[3], days[4], days[5], days[6]];
    let instrument = log_returns(&series(
        "ACME",
        &dated(&instrument_days, &[10.0, 10.2, 10.1, 10.4, 10.3, 10.6]),
    ))
    .expect("instrument returns");
    let benchmark = log_returns(&series(
        "^GSPC",
        &dated(&benchmark_days, &[100.0, 100.5, 101.0, 100.8, 101.5, 102.0]),
    ))
    .expect("benchmark returns");

    // When: The returns are aligned in both directions
    let forward = align_returns(&instrument, &benchmark);
    let backward = align_returns(&benchmark, &instrument);

    // Then: Only shared return dates survive, ascending, and swapping the
    // arguments swaps the columns without changing the dates
    assert_eq!(forward.dates(), &[days[1], days[4], days[5], days[6]]);
    assert!(forward.dates().windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(forward.dates(), backward.dates());
    assert_eq!(forward.instrument(), backward.benchmark());
    assert_eq!(forward.benchmark(), backward.instrument());
}

// =============================================================================
// Risk Calculation: Rejected Inputs
// =============================================================================

#[test]
fn when_series_share_no_dates_system_reports_insufficient_overlap() {
    // Given: Two-point series on disjoint dates
    let days = weekdays(date!(2024 - 01 - 08), 4);
    let instrument = series("ACME", &dated(&days[..2], &[10.0, 11.0]));
    let benchmark = series("^GSPC", &dated(&days[2..], &[100.0, 101.0]));

    // When: Risk is computed
    let error = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect_err("no shared returns");

    // Then: The overlap count is reported
    assert_eq!(error, RiskError::InsufficientOverlap { overlap: 0 });
    assert_eq!(error.code(), "risk.insufficient_overlap");
}

#[test]
fn when_only_one_return_is_shared_system_reports_insufficient_overlap() {
    // Given: Series that share a single return date
    let days = weekdays(date!(2024 - 01 - 08), 3);
    let instrument = series("ACME", &dated(&days[..2], &[10.0, 11.0]));
    let benchmark = series("^GSPC", &dated(&days, &[100.0, 101.0, 99.0]));

    // When: Risk is computed
    let error = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect_err("one shared return");

    // Then: A single observation is not enough for a sample statistic
    assert_eq!(error, RiskError::InsufficientOverlap { overlap: 1 });
}

#[test]
fn when_benchmark_is_flat_system_reports_degenerate_benchmark_variance() {
    // Given: A benchmark that never moves
    let days = weekdays(date!(2024 - 04 - 01), 5);
    let instrument = series("ACME", &dated(&days, &[10.0, 10.3, 10.1, 10.6, 10.4]));
    let benchmark = series("^GSPC", &dated(&days, &[100.0; 5]));

    // When: Risk is computed
    let error = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect_err("flat benchmark");

    // Then: Beta is undefined and the benchmark side is blamed
    assert_eq!(
        error,
        RiskError::DegenerateVariance {
            series: SeriesRole::Benchmark
        }
    );
}

#[test]
fn when_instrument_is_flat_system_reports_degenerate_instrument_variance() {
    // Given: An instrument that never moves against a moving benchmark
    let days = weekdays(date!(2024 - 04 - 01), 5);
    let instrument = series("ACME", &dated(&days, &[10.0; 5]));
    let benchmark = series("^GSPC", &dated(&days, &[100.0, 101.0, 99.5, 102.0, 103.0]));

    // When: Risk is computed
    let error = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect_err("flat instrument");

    // Then: The Sharpe ratio is undefined and the instrument side is blamed
    assert_eq!(
        error,
        RiskError::DegenerateVariance {
            series: SeriesRole::Instrument
        }
    );
}

#[test]
fn when_a_close_is_not_positive_system_reports_invalid_price() {
    // Given: An instrument with a zero close
    let days = weekdays(date!(2024 - 04 - 01), 4);
    let instrument = series("ACME", &dated(&days, &[10.0, 0.0, 10.1, 10.6]));
    let benchmark = series("^GSPC", &dated(&days, &[100.0, 101.0, 99.5, 102.0]));

    // When: Risk is computed
    let error = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect_err("zero close");

    // Then: The offending symbol and date are named
    match error {
        RiskError::InvalidPrice { symbol, date, .. } => {
            assert_eq!(symbol.as_str(), "ACME");
            assert_eq!(date, days[1]);
        }
        other => panic!("expected invalid price, got {other:?}"),
    }
}

#[test]
fn when_instrument_is_empty_system_reports_no_data_for_the_instrument() {
    // Given: An empty instrument and an empty benchmark
    let instrument = series("ACME", &[]);
    let benchmark = series("^GSPC", &[]);

    // When: Risk is computed
    let error = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect_err("no data");

    // Then: The instrument is checked first
    assert_eq!(error.to_string(), "no price data for ACME");
}
