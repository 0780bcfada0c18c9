use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration};

use crate::ConfigError;

pub(crate) const ISO_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<Date, ConfigError> {
    Date::parse(value.trim(), ISO_DATE).map_err(|_| ConfigError::InvalidDate {
        value: value.to_owned(),
    })
}

/// Requested pull window, inclusive of `start` as passed to adapters.
///
/// Adapter-specific edge handling (e.g. fetching one extra leading day to
/// compute a return) happens on top of this range, via [`with_lead_days`].
///
/// [`with_lead_days`]: DateRange::with_lead_days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ConfigError> {
        if start >= end {
            return Err(ConfigError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    /// Same range with the start moved `days` earlier.
    pub fn with_lead_days(&self, days: i64) -> Self {
        let start = self
            .start
            .checked_sub(Duration::days(days))
            .unwrap_or(self.start);
        Self {
            start,
            end: self.end,
        }
    }
}

/// Serde helpers for ISO-formatted `time::Date` fields.
pub(crate) mod iso_date {
    use serde::de::Error as DeError;
    use serde::ser::Error as SerError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::ISO_DATE;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(ISO_DATE).map_err(S::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Date::parse(&value, ISO_DATE).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let date = parse_date("2024-01-02").expect("must parse");
        assert_eq!((date.year(), date.month() as u8, date.day()), (2024, 1, 2));
    }

    #[test]
    fn rejects_malformed_date() {
        let err = parse_date("02/01/2024").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidDate { .. }));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = DateRange::parse("2024-06-30", "2024-01-01").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidDateRange { .. }));
    }

    #[test]
    fn rejects_empty_range() {
        let err = DateRange::parse("2024-01-01", "2024-01-01").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidDateRange { .. }));
    }

    #[test]
    fn lead_days_move_start_only() {
        let range = DateRange::parse("2024-01-10", "2024-02-01").expect("valid range");
        let extended = range.with_lead_days(1);
        assert_eq!(extended.start(), parse_date("2024-01-09").expect("date"));
        assert_eq!(extended.end(), range.end());
    }
}
