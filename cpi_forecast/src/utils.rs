//! Date helpers for monthly series

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// The only accepted input date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date strictly as ISO `YYYY-MM-DD`.
///
/// Day-first forms, other separators and unpadded fields are rejected rather
/// than guessed at.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let bytes = trimmed.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return Err(ForecastError::InvalidInput(format!(
            "'{}' is not a date in YYYY-MM-DD format",
            trimmed
        )));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| {
        ForecastError::InvalidInput(format!("'{}' is not a valid calendar date: {}", trimmed, e))
    })
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Month start `months` months after the month containing `date`
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    month_start(date)
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            ForecastError::InvalidInput(format!(
                "Date {} plus {} months is out of range",
                date, months
            ))
        })
}

/// The first `horizon` month-start dates strictly after `last`.
pub fn future_month_starts(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon)
        .map(|step| {
            let step = u32::try_from(step).map_err(|_| {
                ForecastError::InvalidInput(format!("Horizon {} is too large", horizon))
            })?;
            add_months(last, step)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2015-01-01").unwrap(), ymd(2015, 1, 1));
        assert_eq!(parse_iso_date("  2019-12-31\n").unwrap(), ymd(2019, 12, 31));
    }

    #[rstest]
    #[case("01-02-2020")]
    #[case("2020/01/02")]
    #[case("2020-1-2")]
    #[case("2020-02-30")]
    #[case("20200102")]
    #[case("")]
    fn test_parse_iso_date_rejects(#[case] input: &str) {
        assert!(matches!(
            parse_iso_date(input),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_future_month_starts() {
        let dates = future_month_starts(ymd(2019, 12, 1), 3).unwrap();
        assert_eq!(dates, vec![ymd(2020, 1, 1), ymd(2020, 2, 1), ymd(2020, 3, 1)]);

        // Mid-month input still steps to month starts
        let dates = future_month_starts(ymd(2020, 1, 31), 2).unwrap();
        assert_eq!(dates, vec![ymd(2020, 2, 1), ymd(2020, 3, 1)]);

        assert!(future_month_starts(ymd(2020, 1, 1), 0).unwrap().is_empty());
    }
}
