//! Log-return derivation and date alignment.

use serde::Serialize;
use time::Date;

use crate::domain::iso_date;
use crate::{PriceSeries, RiskError, Symbol};

/// Log return realised on `date` relative to the previous close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub log_return: f64,
}

/// Date-ordered log returns for one symbol; one element shorter than its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    symbol: Symbol,
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Derive `ln(close[i] / close[i-1])` for each consecutive pair, keyed by the later date.
///
/// # Errors
///
/// [`RiskError::InvalidPrice`] if any close is zero, negative or non-finite,
/// or if a ratio is too extreme to produce a finite log.
pub fn log_returns(series: &PriceSeries) -> Result<ReturnSeries, RiskError> {
    let invalid = |date: Date, close: f64| RiskError::InvalidPrice {
        symbol: series.symbol().clone(),
        date,
        close,
    };

    if let Some(point) = series
        .points()
        .iter()
        .find(|point| !(point.close.is_finite() && point.close > 0.0))
    {
        return Err(invalid(point.date, point.close));
    }

    let points = series
        .points()
        .windows(2)
        .map(|pair| {
            let log_return = (pair[1].close / pair[0].close).ln();
            if log_return.is_finite() {
                Ok(ReturnPoint {
                    date: pair[1].date,
                    log_return,
                })
            } else {
                Err(invalid(pair[1].date, pair[1].close))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReturnSeries {
        symbol: series.symbol().clone(),
        points,
    })
}

/// Instrument and benchmark returns restricted to their shared dates.
///
/// All three vectors have the same length and index `i` of each refers to
/// `dates[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    dates: Vec<Date>,
    instrument: Vec<f64>,
    benchmark: Vec<f64>,
}

impl AlignedReturns {
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn instrument(&self) -> &[f64] {
        &self.instrument
    }

    pub fn benchmark(&self) -> &[f64] {
        &self.benchmark
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Intersect two return series by date, keeping chronological order.
///
/// Both inputs are date-ordered, so this is a single merge pass.
pub fn align_returns(instrument: &ReturnSeries, benchmark: &ReturnSeries) -> AlignedReturns {
    let left = instrument.points();
    let right = benchmark.points();
    let capacity = left.len().min(right.len());

    let mut aligned = AlignedReturns {
        dates: Vec::with_capacity(capacity),
        instrument: Vec::with_capacity(capacity),
        benchmark: Vec::with_capacity(capacity),
    };

    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].date.cmp(&right[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                aligned.dates.push(left[i].date);
                aligned.instrument.push(left[i].log_return);
                aligned.benchmark.push(right[j].log_return);
                i += 1;
                j += 1;
            }
        }
    }

    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn series(ticker: &str, closes: &[(Date, f64)]) -> PriceSeries {
        PriceSeries::from_closes(
            Symbol::parse(ticker).expect("valid symbol"),
            closes.iter().copied(),
        )
        .expect("ordered series")
    }

    #[test]
    fn derives_one_fewer_return_than_closes() {
        let prices = series(
            "AAPL",
            &[
                (date!(2024 - 01 - 02), 100.0),
                (date!(2024 - 01 - 03), 102.0),
                (date!(2024 - 01 - 04), 101.0),
                (date!(2024 - 01 - 05), 105.0),
            ],
        );

        let returns = log_returns(&prices).expect("positive closes");
        assert_eq!(returns.len(), 3);
        assert_eq!(returns.points()[0].date, date!(2024 - 01 - 03));
        assert!((returns.points()[0].log_return - (102.0_f64 / 100.0).ln()).abs() < 1e-15);
        assert!(returns.points().iter().all(|p| p.log_return.is_finite()));
    }

    #[test]
    fn single_close_yields_no_returns() {
        let prices = series("AAPL", &[(date!(2024 - 01 - 02), 100.0)]);
        assert!(log_returns(&prices).expect("valid").is_empty());
    }

    #[test]
    fn zero_close_is_rejected_with_its_date() {
        let prices = series(
            "AAPL",
            &[
                (date!(2024 - 01 - 02), 100.0),
                (date!(2024 - 01 - 03), 0.0),
                (date!(2024 - 01 - 04), 101.0),
            ],
        );

        let err = log_returns(&prices).expect_err("zero close");
        assert_eq!(
            err,
            RiskError::InvalidPrice {
                symbol: Symbol::parse("AAPL").expect("valid"),
                date: date!(2024 - 01 - 03),
                close: 0.0,
            }
        );
    }

    #[test]
    fn negative_first_close_is_rejected() {
        let prices = series("AAPL", &[(date!(2024 - 01 - 02), -1.0)]);
        assert!(matches!(
            log_returns(&prices),
            Err(RiskError::InvalidPrice { close, .. }) if close == -1.0
        ));
    }

    #[test]
    fn alignment_keeps_only_shared_dates_in_order() {
        let a = log_returns(&series(
            "AAPL",
            &[
                (date!(2024 - 01 - 02), 10.0),
                (date!(2024 - 01 - 03), 11.0),
                (date!(2024 - 01 - 04), 12.0),
                (date!(2024 - 01 - 08), 13.0),
            ],
        ))
        .expect("valid");
        let b = log_returns(&series(
            "^GSPC",
            &[
                (date!(2024 - 01 - 03), 20.0),
                (date!(2024 - 01 - 04), 21.0),
                (date!(2024 - 01 - 05), 22.0),
                (date!(2024 - 01 - 08), 23.0),
            ],
        ))
        .expect("valid");

        let aligned = align_returns(&a, &b);
        assert_eq!(aligned.dates(), &[date!(2024 - 01 - 04), date!(2024 - 01 - 08)]);
        assert_eq!(aligned.instrument().len(), 2);
        assert_eq!(aligned.benchmark().len(), 2);
        assert_eq!(aligned.instrument()[0], (12.0_f64 / 11.0).ln());
        assert_eq!(aligned.benchmark()[1], (23.0_f64 / 22.0).ln());
    }
}
