use std::sync::Arc;

use riskcalc_core::{PriceSource, RiskAnalyzer, RiskConfig, Symbol};

use crate::cli::ClosesArgs;
use crate::error::CliError;

use super::{resolve_window, CommandData, CommandResult};

pub async fn run(
    args: &ClosesArgs,
    source: Arc<dyn PriceSource>,
    config: &RiskConfig,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.ticker)?;
    let (lookback, end) = resolve_window(&args.window, config)?;

    let series = RiskAnalyzer::new(source)
        .with_lookback(lookback)
        .closes(&symbol, end)
        .await?;

    let mut result = CommandResult::ok(CommandData::Closes(series.clone()));
    let unusable = series
        .points()
        .iter()
        .find(|point| !point.close.is_finite() || point.close <= 0.0);
    if let Some(bad) = unusable {
        result = result.with_warning(format!(
            "close {} on {} cannot be used to compute returns",
            bad.close, bad.date
        ));
    }
    Ok(result)
}
