//! Working-day classification.

use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;

use crate::ledger::ShiftLedger;
use crate::models::{DayPattern, WeeklyPattern};

/// Decides whether a date takes part in generation.
///
/// A date is non-working when its weekday pattern is OFF, its daily target is
/// explicitly 0, or every known person is locked OFF on it. Half-day patterns
/// still count as working; they only constrain the shift type.
pub struct WorkDayClassifier<'a> {
    pattern: &'a WeeklyPattern,
    daily_targets: &'a FxHashMap<NaiveDate, i32>,
    ledger: &'a ShiftLedger,
    person_ids: Vec<&'a str>,
}

impl<'a> WorkDayClassifier<'a> {
    pub fn new(
        pattern: &'a WeeklyPattern,
        daily_targets: &'a FxHashMap<NaiveDate, i32>,
        ledger: &'a ShiftLedger,
        person_ids: Vec<&'a str>,
    ) -> Self {
        Self {
            pattern,
            daily_targets,
            ledger,
            person_ids,
        }
    }

    pub fn pattern_for(&self, date: NaiveDate) -> DayPattern {
        self.pattern.get(date.weekday())
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        if self.pattern_for(date) == DayPattern::Off {
            return false;
        }
        if self.daily_targets.get(&date) == Some(&0) {
            return false;
        }
        !self
            .ledger
            .all_locked_off(date, self.person_ids.iter().copied())
    }
}
