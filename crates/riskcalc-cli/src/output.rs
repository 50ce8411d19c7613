use std::fmt::{self, Write as _};
use std::io::Write as _;

use riskcalc_core::{AnalysisError, PriceSeries, RiskReport};

use crate::cli::OutputFormat;
use crate::commands::{CommandData, CommandResult};
use crate::error::CliError;
use crate::metadata::{Envelope, Metadata};

pub fn render(
    result: CommandResult,
    mut meta: Metadata,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            for warning in result.warnings {
                meta.push_warning(warning);
            }
            let envelope = Envelope::success(meta, result.data);
            writeln!(std::io::stdout().lock(), "{}", to_json(&envelope, pretty)?)?;
        }
        OutputFormat::Table => {
            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
            let table = match &result.data {
                CommandData::Report(report) => report_table(report)?,
                CommandData::Closes(series) => closes_table(series)?,
            };
            std::io::stdout().lock().write_all(table.as_bytes())?;
        }
    }
    Ok(())
}

pub fn render_failure(meta: Metadata, error: &AnalysisError, pretty: bool) -> Result<(), CliError> {
    let envelope = Envelope::failure(meta, error);
    writeln!(std::io::stdout().lock(), "{}", to_json(&envelope, pretty)?)?;
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(payload)
}

/// Beta and Sharpe to two decimals, CAPM return as a percentage to two decimals.
pub fn report_table(report: &RiskReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{} vs {}  {}  ({} observations, {})",
        report.instrument, report.benchmark, report.range, report.observations, report.source
    )?;
    writeln!(out, "Beta                 : {:.2}", report.result.beta)?;
    writeln!(
        out,
        "CAPM expected return : {:.2}%",
        report.result.capm_return * 100.0
    )?;
    writeln!(out, "Sharpe ratio         : {:.2}", report.result.sharpe_ratio)?;
    Ok(out)
}

pub fn closes_table(series: &PriceSeries) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}  {} closes", series.symbol(), series.len())?;
    writeln!(out, "{:<10}  {:>12}", "date", "close")?;
    for point in series.points() {
        writeln!(out, "{:<10}  {:>12.4}", point.date.to_string(), point.close)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskcalc_core::{DateRange, ProviderId, RiskParams, RiskResult, Symbol};
    use time::macros::date;

    fn report() -> RiskReport {
        RiskReport {
            instrument: Symbol::parse("AAPL").expect("valid symbol"),
            benchmark: Symbol::parse("^GSPC").expect("valid symbol"),
            range: DateRange::new(date!(2019 - 07 - 02), date!(2024 - 06 - 30)).expect("range"),
            observations: 1256,
            params: RiskParams::default(),
            source: ProviderId::Yahoo,
            result: RiskResult {
                beta: 1.23456,
                capm_return: 0.123456,
                sharpe_ratio: 0.5678,
            },
        }
    }

    #[test]
    fn report_table_rounds_for_display() {
        let table = report_table(&report()).expect("renders");

        assert!(table.starts_with("AAPL vs ^GSPC  2019-07-02..=2024-06-30  (1256 observations, yahoo)"));
        assert!(table.contains("Beta                 : 1.23\n"));
        assert!(table.contains("CAPM expected return : 12.35%\n"));
        assert!(table.contains("Sharpe ratio         : 0.57\n"));
    }

    #[test]
    fn closes_table_lists_every_point() {
        let series = PriceSeries::from_closes(
            Symbol::parse("MSFT").expect("valid symbol"),
            [(date!(2024 - 01 - 02), 370.87), (date!(2024 - 01 - 03), 370.6)],
        )
        .expect("ordered");

        let table = closes_table(&series).expect("renders");
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("2024-01-02      370.8700"));
    }

    #[test]
    fn json_report_keeps_full_precision() {
        let envelope = Envelope::success(
            Metadata::new(ProviderId::Yahoo, 5),
            CommandData::Report(report()),
        );
        let value: serde_json::Value =
            serde_json::from_str(&to_json(&envelope, false).expect("serializes")).expect("json");

        assert_eq!(value["data"]["result"]["beta"], 1.23456);
        assert_eq!(value["data"]["range"]["start"], "2019-07-02");
        assert_eq!(value["data"]["instrument"], "AAPL");
    }
}
