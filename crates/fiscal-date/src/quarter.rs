//! Fiscal-quarter configuration and quarter-position arithmetic.
//!
//! A fiscal year is split into four quarters whose start months are spaced
//! three months apart, beginning at a configurable first month. The start
//! months are kept in ascending calendar order, so the quarter that contains
//! January is not necessarily index 0.
//!
//! Moving between quarters is done on a [`QuarterPosition`]: an index into the
//! ascending start months plus the calendar year in which that start month
//! occurs. Stepping the index past either end wraps modulo 4 and carries one
//! year in the direction of the wrap.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DateError, Result};

/// The first month of the first fiscal quarter and the four quarter start
/// months derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QuarterConfig {
    first_month: u32,
    start_months: [u32; 4],
}

impl QuarterConfig {
    /// Build a configuration whose first quarter starts in `first_month`.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::QuarterConfiguration`] if `first_month` is outside 1..=12.
    ///
    /// # Examples
    ///
    /// ```
    /// use fiscal_date::QuarterConfig;
    ///
    /// let config = QuarterConfig::new(9).unwrap();
    /// assert_eq!(config.start_months(), [3, 6, 9, 12]);
    /// ```
    pub fn new(first_month: u32) -> Result<Self> {
        if !(1..=12).contains(&first_month) {
            return Err(DateError::QuarterConfiguration(format!(
                "month must be between 1 and 12, got {first_month}"
            )));
        }
        Ok(Self {
            first_month,
            start_months: compute_start_months(first_month),
        })
    }

    /// The configured first month of the first quarter.
    pub fn first_month(&self) -> u32 {
        self.first_month
    }

    /// The four quarter start months in ascending order.
    pub fn start_months(&self) -> [u32; 4] {
        self.start_months
    }

    /// The quarter containing `month` of `year`.
    ///
    /// The quarter starts at the largest start month not after `month`. When
    /// every start month is after `month`, the quarter began at the last start
    /// month of the previous year.
    pub fn locate(&self, year: i32, month: u32) -> QuarterPosition {
        match self.start_months.iter().rposition(|&start| start <= month) {
            Some(index) => QuarterPosition { year, index },
            None => QuarterPosition {
                year: year - 1,
                index: 3,
            },
        }
    }

    /// The first day of the quarter at `position`, or `None` when its index is
    /// not 0..4 or the date is out of range.
    pub fn first_day(&self, position: QuarterPosition) -> Option<NaiveDate> {
        let month = *self.start_months.get(position.index)?;
        NaiveDate::from_ymd_opt(position.year, month, 1)
    }

    /// The last day of the quarter at `position`, with the same `None` cases
    /// as [`QuarterConfig::first_day`].
    pub fn last_day(&self, position: QuarterPosition) -> Option<NaiveDate> {
        self.start_months.get(position.index)?;
        self.first_day(position.offset(1))?.pred_opt()
    }
}

impl Default for QuarterConfig {
    fn default() -> Self {
        Self {
            first_month: 1,
            start_months: [1, 4, 7, 10],
        }
    }
}

impl TryFrom<u32> for QuarterConfig {
    type Error = DateError;

    fn try_from(first_month: u32) -> Result<Self> {
        Self::new(first_month)
    }
}

impl From<QuarterConfig> for u32 {
    fn from(config: QuarterConfig) -> Self {
        config.first_month
    }
}

impl FromStr for QuarterConfig {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self> {
        let month = s.trim().parse::<u32>().map_err(|_| {
            DateError::QuarterConfiguration(format!("month must be an integer, got '{s}'"))
        })?;
        Self::new(month)
    }
}

impl fmt::Display for QuarterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.start_months;
        write!(f, "quarters starting in months {a}, {b}, {c}, {d}")
    }
}

/// A quarter identified by its index into the ascending start months and the
/// calendar year in which its start month falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuarterPosition {
    pub year: i32,
    pub index: usize,
}

impl QuarterPosition {
    /// Step `quarters` positions forward (or backward when negative).
    ///
    /// An index past 3 counts as that many quarters after the first one of
    /// `year`. The year saturates at the bounds of `i32`.
    pub fn offset(self, quarters: i32) -> Self {
        let raw = i64::try_from(self.index)
            .unwrap_or(i64::MAX)
            .saturating_add(i64::from(quarters));
        let years = raw
            .div_euclid(4)
            .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Self {
            year: self.year.saturating_add(years),
            // rem_euclid(4) is in 0..4
            index: raw.rem_euclid(4) as usize,
        }
    }
}

fn compute_start_months(first_month: u32) -> [u32; 4] {
    let mut months = [0; 4];
    let mut month = first_month;
    for slot in &mut months {
        *slot = month;
        month = (month - 1 + 3) % 12 + 1;
    }
    months.sort_unstable();
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_start_months() {
        assert_eq!(QuarterConfig::default().start_months(), [1, 4, 7, 10]);
        assert_eq!(QuarterConfig::default(), QuarterConfig::new(1).unwrap());
    }

    #[test]
    fn test_start_months_are_sorted() {
        assert_eq!(QuarterConfig::new(2).unwrap().start_months(), [2, 5, 8, 11]);
        assert_eq!(QuarterConfig::new(9).unwrap().start_months(), [3, 6, 9, 12]);
        assert_eq!(QuarterConfig::new(12).unwrap().start_months(), [3, 6, 9, 12]);
        assert_eq!(QuarterConfig::new(11).unwrap().start_months(), [2, 5, 8, 11]);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        for month in [0, 13, 100] {
            let err = QuarterConfig::new(month).unwrap_err();
            assert!(matches!(err, DateError::QuarterConfiguration(_)), "got: {err}");
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("4".parse::<QuarterConfig>().unwrap().first_month(), 4);
        assert_eq!(" 10 ".parse::<QuarterConfig>().unwrap().first_month(), 10);

        let err = "3.5".parse::<QuarterConfig>().unwrap_err().to_string();
        assert!(err.contains("must be an integer"), "got: {err}");

        let err = "13".parse::<QuarterConfig>().unwrap_err().to_string();
        assert!(err.contains("between 1 and 12"), "got: {err}");
    }

    #[test]
    fn test_locate_within_year() {
        let config = QuarterConfig::default();
        assert_eq!(config.locate(2015, 4), QuarterPosition { year: 2015, index: 1 });
        assert_eq!(config.locate(2015, 3), QuarterPosition { year: 2015, index: 0 });
        assert_eq!(config.locate(2015, 12), QuarterPosition { year: 2015, index: 3 });
    }

    #[test]
    fn test_locate_before_first_boundary_rolls_back_a_year() {
        let config = QuarterConfig::new(2).unwrap();
        assert_eq!(config.locate(2015, 1), QuarterPosition { year: 2014, index: 3 });
        assert_eq!(
            config.first_day(config.locate(2015, 1)),
            NaiveDate::from_ymd_opt(2014, 11, 1)
        );
    }

    #[test]
    fn test_offset_wraps_with_year() {
        let q4 = QuarterPosition { year: 2015, index: 3 };
        assert_eq!(q4.offset(1), QuarterPosition { year: 2016, index: 0 });
        assert_eq!(q4.offset(2), QuarterPosition { year: 2016, index: 1 });

        let q1 = QuarterPosition { year: 2015, index: 0 };
        assert_eq!(q1.offset(-1), QuarterPosition { year: 2014, index: 3 });
        assert_eq!(q1.offset(-5), QuarterPosition { year: 2013, index: 3 });
        assert_eq!(q1.offset(0), q1);
    }

    #[test]
    fn test_offset_normalizes_index_past_three() {
        let position = QuarterPosition { year: 2015, index: 5 };
        assert_eq!(position.offset(0), QuarterPosition { year: 2016, index: 1 });
        assert_eq!(position.offset(-2), QuarterPosition { year: 2015, index: 3 });
    }

    #[test]
    fn test_out_of_range_index_has_no_days() {
        let config = QuarterConfig::default();
        for index in [4, 7, usize::MAX] {
            let position = QuarterPosition { year: 2015, index };
            assert_eq!(config.first_day(position), None);
            assert_eq!(config.last_day(position), None);
        }
    }

    #[test]
    fn test_days_at_year_limits_are_none() {
        let config = QuarterConfig::default();
        let position = QuarterPosition { year: i32::MAX, index: 3 };
        assert_eq!(config.first_day(position), None);
        assert_eq!(config.last_day(position), None);
    }

    #[test]
    fn test_last_day_handles_leap_february() {
        let config = QuarterConfig::new(3).unwrap();
        // Quarter starting December 2015 ends on the last day of February 2016.
        let position = QuarterPosition { year: 2015, index: 3 };
        assert_eq!(config.last_day(position), NaiveDate::from_ymd_opt(2016, 2, 29));
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let config = QuarterConfig::new(10).unwrap();
        assert_eq!(serde_json::to_string(&config).unwrap(), "10");
        assert_eq!(serde_json::from_str::<QuarterConfig>("10").unwrap(), config);
        assert!(serde_json::from_str::<QuarterConfig>("0").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            QuarterConfig::new(2).unwrap().to_string(),
            "quarters starting in months 2, 5, 8, 11"
        );
    }
}
