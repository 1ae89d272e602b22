//! Month windows: the span of dates one optimization run covers.

use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid year-month {0:?}, expected YYYY-MM")]
    Malformed(String),
    #[error("Month out of range: {year}-{month}")]
    OutOfRange { year: i32, month: u32 },
}

/// A calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthWindow {
    year: i32,
    month: u32,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CalendarError::OutOfRange { year, month });
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Validated in the constructor
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .checked_sub_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn len(&self) -> usize {
        self.last_day().day() as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every date in the month, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.first_day().iter_days().take(self.len()).collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl FromStr for MonthWindow {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CalendarError::Malformed(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(malformed)?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let window: MonthWindow = "2025-06".parse().unwrap();
        assert_eq!(window.year(), 2025);
        assert_eq!(window.month(), 6);
        assert_eq!(window.to_string(), "2025-06");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "2025/06".parse::<MonthWindow>(),
            Err(CalendarError::Malformed(_))
        ));
        assert_eq!(
            "2025-13".parse::<MonthWindow>(),
            Err(CalendarError::OutOfRange {
                year: 2025,
                month: 13
            })
        );
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(MonthWindow::new(2025, 6).unwrap().len(), 30);
        assert_eq!(MonthWindow::new(2024, 2).unwrap().len(), 29);
        assert_eq!(MonthWindow::new(2025, 2).unwrap().len(), 28);

        let days = MonthWindow::new(2025, 1).unwrap().days();
        assert_eq!(days.len(), 31);
        assert_eq!(days[0], d(2025, 1, 1));
        assert_eq!(days[30], d(2025, 1, 31));
    }

    #[test]
    fn test_navigation_wraps_years() {
        let dec = MonthWindow::new(2024, 12).unwrap();
        assert_eq!(dec.next(), MonthWindow::new(2025, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(dec.last_day(), d(2024, 12, 31));
        assert!(dec.contains(d(2024, 12, 5)));
        assert!(!dec.contains(d(2025, 12, 5)));
    }
}
