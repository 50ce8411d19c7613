use std::sync::Arc;

use riskcalc_core::{PriceSource, RiskAnalyzer, RiskConfig, RiskParams, Symbol};

use crate::cli::ComputeArgs;
use crate::error::CliError;

use super::{resolve_window, CommandData, CommandResult};

/// Fewer shared returns than this still compute, but with a warning.
const THIN_SAMPLE_OBSERVATIONS: usize = 30;

pub async fn run(
    args: &ComputeArgs,
    source: Arc<dyn PriceSource>,
    config: &RiskConfig,
) -> Result<CommandResult, CliError> {
    let instrument = Symbol::parse(&args.ticker)?;
    let benchmark = match args.benchmark.as_deref() {
        Some(raw) => Symbol::parse(raw)?,
        None => config.benchmark.clone(),
    };
    let params = RiskParams::new(
        args.risk_free_rate.unwrap_or(config.params.risk_free_rate),
        args.trading_days.unwrap_or(config.params.trading_days_per_year),
    )?;
    let (lookback, end) = resolve_window(&args.window, config)?;

    let analyzer = RiskAnalyzer::new(source)
        .with_params(params)
        .with_lookback(lookback);
    let report = analyzer.analyze(&instrument, &benchmark, end).await?;

    let mut result = CommandResult::ok(CommandData::Report(report.clone()));
    if instrument == benchmark {
        result = result.with_warning(format!(
            "{instrument} is its own benchmark; beta is 1 by construction"
        ));
    }
    if report.observations < THIN_SAMPLE_OBSERVATIONS {
        result = result.with_warning(format!(
            "only {} overlapping daily returns; estimates are unreliable",
            report.observations
        ));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::WindowArgs;
    use riskcalc_core::SyntheticSource;

    fn args(ticker: &str, benchmark: Option<&str>, lookback_days: u32) -> ComputeArgs {
        ComputeArgs {
            ticker: ticker.to_owned(),
            benchmark: benchmark.map(str::to_owned),
            risk_free_rate: None,
            trading_days: None,
            window: WindowArgs {
                lookback_days: Some(lookback_days),
                calendar_years: None,
                end: Some("2024-06-28".to_owned()),
            },
        }
    }

    #[tokio::test]
    async fn uses_configured_benchmark_by_default() {
        let result = run(
            &args("AAPL", None, 365),
            Arc::new(SyntheticSource::new()),
            &RiskConfig::default(),
        )
        .await
        .expect("synthetic compute");

        let CommandData::Report(report) = result.data else {
            panic!("expected report");
        };
        assert_eq!(report.benchmark.as_str(), "^GSPC");
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn short_window_warns() {
        let result = run(
            &args("AAPL", Some("^NDX"), 14),
            Arc::new(SyntheticSource::new()),
            &RiskConfig::default(),
        )
        .await
        .expect("synthetic compute");

        assert!(result.warnings.iter().any(|w| w.contains("overlapping daily returns")));
    }

    #[tokio::test]
    async fn invalid_ticker_is_rejected_before_fetch() {
        let error = run(
            &args("1ABC", None, 365),
            Arc::new(SyntheticSource::new()),
            &RiskConfig::default(),
        )
        .await
        .expect_err("invalid ticker");

        assert_eq!(error.exit_code(), 2);
    }
}
