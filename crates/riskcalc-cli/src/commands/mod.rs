mod closes;
mod compute;

use std::sync::Arc;

use riskcalc_core::{
    parse_date, today_utc, LookbackWindow, PriceSeries, PriceSource, ReqwestHttpClient,
    RiskConfig, RiskReport, SeriesCache, SyntheticSource, YahooSource,
};
use serde::Serialize;
use time::Date;

use crate::cli::{Cli, Command, SourceSelector, WindowArgs};
use crate::error::CliError;

/// Payload produced by a command, rendered by `output`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandData {
    Report(RiskReport),
    Closes(PriceSeries),
}

#[derive(Debug)]
pub struct CommandResult {
    pub data: CommandData,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: CommandData) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

pub async fn run(cli: &Cli, config: &RiskConfig) -> Result<CommandResult, CliError> {
    let source = build_source(cli, config)?;

    match &cli.command {
        Command::Compute(args) => compute::run(args, source, config).await,
        Command::Closes(args) => closes::run(args, source, config).await,
    }
}

fn build_source(cli: &Cli, config: &RiskConfig) -> Result<Arc<dyn PriceSource>, CliError> {
    if cli.mock || cli.source == SourceSelector::Synthetic {
        return Ok(Arc::new(SyntheticSource::new()));
    }

    let http_client = ReqwestHttpClient::new()?;
    let source = YahooSource::new(Arc::new(http_client))
        .with_timeout_ms(cli.timeout_ms.unwrap_or(config.timeout_ms))
        .with_cache(SeriesCache::new(config.cache_ttl));
    Ok(Arc::new(source))
}

/// Flag values win over the environment-derived config.
fn resolve_window(
    args: &WindowArgs,
    config: &RiskConfig,
) -> Result<(LookbackWindow, Date), CliError> {
    let lookback = args
        .calendar_years
        .map(LookbackWindow::CalendarYears)
        .or(args.lookback_days.map(LookbackWindow::FixedDays))
        .unwrap_or(config.lookback);

    let end = args
        .end
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(today_utc);

    Ok((lookback, end))
}
