use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Default lookback: five 365-day years, ignoring leap days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 5 * 365;

/// Serde adapter writing dates as `YYYY-MM-DD` strings.
pub mod iso_date {
    use serde::de::Error as DeError;
    use serde::ser::Error as SerError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::{parse_date, ISO_DATE};

    pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = value.format(ISO_DATE).map_err(S::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse_date(&value).map_err(D::Error::custom)
    }
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), ISO_DATE).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
    })
}

/// Today's date in UTC.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// How far back from the end date a request reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum LookbackWindow {
    /// A fixed day count (`5 * 365` by default).
    FixedDays(u32),
    /// Calendar years; Feb 29 clamps to Feb 28 in non-leap years.
    CalendarYears(u8),
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self::FixedDays(DEFAULT_LOOKBACK_DAYS)
    }
}

impl LookbackWindow {
    pub fn start_for(self, end: Date) -> Result<Date, ValidationError> {
        match self {
            Self::FixedDays(0) | Self::CalendarYears(0) => Err(ValidationError::EmptyLookback),
            Self::FixedDays(days) => end
                .checked_sub(Duration::days(i64::from(days)))
                .ok_or(ValidationError::LookbackOutOfRange),
            Self::CalendarYears(years) => {
                let year = end.year() - i32::from(years);
                Date::from_calendar_date(year, end.month(), end.day())
                    .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
                    .map_err(|_| ValidationError::LookbackOutOfRange)
            }
        }
    }
}

impl Display for LookbackWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedDays(days) => write!(f, "{days} days"),
            Self::CalendarYears(years) => write!(f, "{years} calendar years"),
        }
    }
}

/// Inclusive calendar date range for a price history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "iso_date")]
    start: Date,
    #[serde(with = "iso_date")]
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range ending at `end` and reaching back by `window`.
    pub fn lookback(end: Date, window: LookbackWindow) -> Result<Self, ValidationError> {
        let start = window.start_for(end)?;
        Self::new(start, end)
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
