use serde::{Deserialize, Serialize};
use time::Date;

use super::calendar::iso_date;
use crate::{DateRange, Symbol, ValidationError};

/// One trading day's closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub close: f64,
}

impl PricePoint {
    pub const fn new(date: Date, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes for one symbol, strictly increasing by date.
///
/// Close values are carried as delivered by the source; positivity is
/// checked when returns are derived so that the failure can name the
/// offending date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: Symbol,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        if let Some(index) = points
            .windows(2)
            .position(|pair| pair[0].date >= pair[1].date)
        {
            return Err(ValidationError::UnorderedSeries {
                symbol,
                index: index + 1,
            });
        }

        Ok(Self { symbol, points })
    }

    /// The "no data" signal a source returns for an unknown ticker or empty window.
    pub const fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            points: Vec::new(),
        }
    }

    pub fn from_closes<I>(symbol: Symbol, closes: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (Date, f64)>,
    {
        let points = closes
            .into_iter()
            .map(|(date, close)| PricePoint::new(date, close))
            .collect();
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Copy of this series restricted to `range`.
    pub fn within(&self, range: &DateRange) -> Self {
        Self {
            symbol: self.symbol.clone(),
            points: self
                .points
                .iter()
                .filter(|point| range.contains(point.date))
                .copied()
                .collect(),
        }
    }
}
