//! Behavior-driven tests for the risk analyzer
//!
//! These tests verify HOW the analyzer consults its price source, windows the
//! returned closes and reports failures against the symbol that caused them.

use std::sync::Arc;

use approx::assert_relative_eq;
use riskcalc_core::{
    compute_risk, AnalysisError, InMemorySource, LookbackWindow, PriceSeries, ProviderId,
    RiskAnalyzer, RiskError, RiskParams, SourceError,
};
use riskcalc_tests::{dated, series, symbol, weekdays};
use time::macros::date;

fn reference_series() -> (PriceSeries, PriceSeries) {
    let dates = weekdays(date!(2024 - 01 - 02), 4);
    (
        series("ACME", &dated(&dates, &[100.0, 102.0, 101.0, 105.0])),
        series("^GSPC", &dated(&dates, &[1000.0, 1010.0, 1005.0, 1020.0])),
    )
}

fn reference_source() -> InMemorySource {
    let (instrument, benchmark) = reference_series();
    InMemorySource::new()
        .with_series(instrument)
        .with_series(benchmark)
}

// =============================================================================
// Analyzer: Successful Analysis
// =============================================================================

#[tokio::test]
async fn when_source_has_both_series_analyzer_matches_the_pure_calculator() {
    // Given: An in-memory source holding the reference closes
    let source = Arc::new(reference_source());
    let analyzer = RiskAnalyzer::new(source.clone());

    // When: The instrument is analysed against the benchmark
    let report = analyzer
        .analyze(&symbol("ACME"), &symbol("^GSPC"), date!(2024 - 01 - 31))
        .await
        .expect("analysis succeeds");

    // Then: The report carries the same figures as a direct computation
    let (instrument, benchmark) = reference_series();
    let expected = compute_risk(&instrument, &benchmark, &RiskParams::default())
        .expect("direct computation");
    assert_relative_eq!(report.result.beta, expected.beta, epsilon = 1e-12);
    assert_relative_eq!(report.result.capm_return, expected.capm_return, epsilon = 1e-12);
    assert_relative_eq!(report.result.sharpe_ratio, expected.sharpe_ratio, epsilon = 1e-12);
    assert_eq!(report.observations, 3);
    assert_eq!(report.source, ProviderId::Memory);
    assert_eq!(report.range.end(), date!(2024 - 01 - 31));
}

#[tokio::test]
async fn when_analysing_analyzer_requests_each_symbol_exactly_once() {
    // Given: An in-memory source that counts requests
    let source = Arc::new(reference_source());
    let analyzer = RiskAnalyzer::new(source.clone());

    // When: One analysis runs
    analyzer
        .analyze(&symbol("ACME"), &symbol("^GSPC"), date!(2024 - 01 - 31))
        .await
        .expect("analysis succeeds");

    // Then: Each series was fetched once and nothing else was requested
    assert_eq!(source.call_count(&symbol("ACME")), 1);
    assert_eq!(source.call_count(&symbol("^GSPC")), 1);
    assert_eq!(source.total_calls(), 2);
}

#[tokio::test]
async fn when_history_predates_the_window_analyzer_ignores_it() {
    // Given: Reference closes preceded by December closes outside a short window
    let december = weekdays(date!(2023 - 12 - 18), 5);
    let january = weekdays(date!(2024 - 01 - 02), 4);
    let mut instrument = dated(&december, &[80.0, 90.0, 70.0, 95.0, 60.0]);
    instrument.extend(dated(&january, &[100.0, 102.0, 101.0, 105.0]));
    let mut benchmark = dated(&december, &[900.0, 950.0, 990.0, 940.0, 980.0]);
    benchmark.extend(dated(&january, &[1000.0, 1010.0, 1005.0, 1020.0]));
    let source = InMemorySource::new()
        .with_series(series("ACME", &instrument))
        .with_series(series("^GSPC", &benchmark));
    let analyzer =
        RiskAnalyzer::new(Arc::new(source)).with_lookback(LookbackWindow::FixedDays(3));

    // When: The window ending 2024-01-05 is analysed
    let report = analyzer
        .analyze(&symbol("ACME"), &symbol("^GSPC"), date!(2024 - 01 - 05))
        .await
        .expect("analysis succeeds");

    // Then: Only the January closes contribute
    assert_eq!(report.range.start(), date!(2024 - 01 - 02));
    assert_eq!(report.observations, 3);
    assert_relative_eq!(report.result.beta, 2.350615160041499, epsilon = 1e-9);
}

// =============================================================================
// Analyzer: Failures
// =============================================================================

#[tokio::test]
async fn when_instrument_has_no_history_analyzer_reports_no_data_for_it() {
    // Given: A source that knows only the benchmark
    let dates = weekdays(date!(2024 - 01 - 02), 4);
    let source = Arc::new(InMemorySource::new().with_series(series(
        "^GSPC",
        &dated(&dates, &[1000.0, 1010.0, 1005.0, 1020.0]),
    )));
    let analyzer = RiskAnalyzer::new(source.clone());

    // When: An unknown ticker is analysed
    let error = analyzer
        .analyze(&symbol("ZZZZ"), &symbol("^GSPC"), date!(2024 - 01 - 31))
        .await
        .expect_err("instrument has no data");

    // Then: The failure names the ticker and each symbol was still fetched once
    assert_eq!(
        error,
        AnalysisError::Risk(RiskError::NoData {
            symbol: symbol("ZZZZ")
        })
    );
    assert_eq!(error.code(), "risk.no_data");
    assert!(error.to_string().contains("ZZZZ"));
    assert_eq!(source.call_count(&symbol("ZZZZ")), 1);
    assert_eq!(source.call_count(&symbol("^GSPC")), 1);
}

#[tokio::test]
async fn when_benchmark_fetch_fails_analyzer_names_the_benchmark() {
    // Given: A source whose benchmark requests fail
    let source = reference_source().with_failure(
        symbol("^GSPC"),
        SourceError::unavailable("upstream returned 503"),
    );
    let analyzer = RiskAnalyzer::new(Arc::new(source));

    // When: The analysis runs
    let error = analyzer
        .analyze(&symbol("ACME"), &symbol("^GSPC"), date!(2024 - 01 - 31))
        .await
        .expect_err("benchmark unavailable");

    // Then: The error is attributed to the benchmark and keeps the source code
    match &error {
        AnalysisError::Source { symbol: failed, source } => {
            assert_eq!(failed.as_str(), "^GSPC");
            assert!(source.retryable());
        }
        other => panic!("expected source error, got {other:?}"),
    }
    assert_eq!(error.code(), "source.unavailable");
}

#[tokio::test]
async fn when_series_do_not_overlap_analyzer_reports_insufficient_overlap() {
    // Given: Instrument and benchmark closes in different weeks
    let first_week = weekdays(date!(2024 - 01 - 08), 2);
    let second_week = weekdays(date!(2024 - 01 - 15), 2);
    let source = InMemorySource::new()
        .with_series(series("ACME", &dated(&first_week, &[10.0, 11.0])))
        .with_series(series("^GSPC", &dated(&second_week, &[100.0, 101.0])));
    let analyzer = RiskAnalyzer::new(Arc::new(source));

    // When: The analysis runs
    let error = analyzer
        .analyze(&symbol("ACME"), &symbol("^GSPC"), date!(2024 - 01 - 31))
        .await
        .expect_err("no overlap");

    // Then: The calculator failure is passed through unchanged
    assert_eq!(
        error,
        AnalysisError::Risk(RiskError::InsufficientOverlap { overlap: 0 })
    );
}

#[tokio::test]
async fn when_closes_are_requested_for_unknown_symbol_analyzer_reports_no_data() {
    // Given: An empty in-memory source
    let analyzer = RiskAnalyzer::new(Arc::new(InMemorySource::new()));

    // When: Closes are requested
    let error = analyzer
        .closes(&symbol("NOPE"), date!(2024 - 01 - 31))
        .await
        .expect_err("no closes");

    // Then: The empty history is surfaced as no data
    assert_eq!(error.code(), "risk.no_data");
}
