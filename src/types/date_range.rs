use crate::error::WwoError;
use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Display, Formatter};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of calendar dates, `start <= end`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Fails with [`WwoError::InvalidRange`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WwoError> {
        if start > end {
            return Err(WwoError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` strings.
    ///
    /// Every failure, including a reversed range, is reported as
    /// [`WwoError::InvalidArgument`] since this validates caller input.
    pub fn parse(start: &str, end: &str) -> Result<Self, WwoError> {
        let start = parse_date("start_date", start)?;
        let end = parse_date("end_date", end)?;
        Self::new(start, end).map_err(|e| WwoError::invalid_argument(e.to_string()))
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, WwoError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        WwoError::invalid_argument(format!(
            "{name} '{value}' is not a YYYY-MM-DD date: {e}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_range() {
        let range = DateRange::parse("2020-01-01", "2020-01-02").unwrap();
        assert_eq!(range.days(), 2);
        assert_eq!(range.to_string(), "2020-01-01 to 2020-01-02");
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::parse("2020-03-15", "2020-03-15").unwrap();
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn test_parse_rejects_malformed_dates() {
        let err = DateRange::parse("2020/01/01", "2020-01-02").unwrap_err();
        assert!(matches!(err, WwoError::InvalidArgument { .. }));
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn test_parse_rejects_reversed_range() {
        let err = DateRange::parse("2020-02-01", "2020-01-01").unwrap_err();
        assert!(matches!(err, WwoError::InvalidArgument { .. }));
    }

    #[test]
    fn test_new_rejects_reversed_range() {
        let start = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(matches!(
            DateRange::new(start, end),
            Err(WwoError::InvalidRange { .. })
        ));
    }
}
