//! Carried consecutive-work streaks across month boundaries.

use chrono::NaiveDate;

use crate::calendar::MonthWindow;
use crate::ledger::ShiftLedger;
use crate::models::cell_value;

/// Latest date in `window` on which the person is not working.
///
/// Unassigned cells count as non-working.
pub fn last_off_day_in(
    ledger: &ShiftLedger,
    person_id: &str,
    window: &MonthWindow,
) -> Option<NaiveDate> {
    window
        .days()
        .into_iter()
        .rev()
        .find(|date| cell_value(ledger.get(*date, person_id)) == 0.0)
}

/// The last off day before `window` starts.
///
/// Uses the explicit value when given, then the previous month's ledger, and
/// finally the previous month's last day.
pub fn resolve_last_off_day(
    explicit: Option<NaiveDate>,
    ledger: &ShiftLedger,
    person_id: &str,
    window: &MonthWindow,
) -> NaiveDate {
    if let Some(date) = explicit {
        return date;
    }
    let prev = window.prev();
    last_off_day_in(ledger, person_id, &prev).unwrap_or_else(|| prev.last_day())
}

/// Consecutive working days already accumulated when `window_start` arrives.
pub fn streak_seed(last_off: NaiveDate, window_start: NaiveDate) -> u32 {
    let gap = (window_start - last_off).num_days();
    if gap > 1 {
        (gap - 1) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_seed_from_gap() {
        assert_eq!(streak_seed(d(2025, 5, 31), d(2025, 6, 1)), 0);
        assert_eq!(streak_seed(d(2025, 5, 28), d(2025, 6, 1)), 3);
        // A date inside the window gives no seed
        assert_eq!(streak_seed(d(2025, 6, 3), d(2025, 6, 1)), 0);
    }

    #[test]
    fn test_last_off_day_scans_backwards() {
        let mut ledger = ShiftLedger::new();
        let may = MonthWindow::new(2025, 5).unwrap();
        for day in 1..=31 {
            ledger.set(d(2025, 5, day), "a", ShiftType::OnSite);
        }
        ledger.set(d(2025, 5, 27), "a", ShiftType::Off);

        assert_eq!(last_off_day_in(&ledger, "a", &may), Some(d(2025, 5, 27)));
        // Half days are work
        ledger.set(d(2025, 5, 29), "a", ShiftType::HalfAm);
        assert_eq!(last_off_day_in(&ledger, "a", &may), Some(d(2025, 5, 27)));
    }

    #[test]
    fn test_resolve_prefers_explicit_then_ledger_then_month_end() {
        let mut ledger = ShiftLedger::new();
        let june = MonthWindow::new(2025, 6).unwrap();

        assert_eq!(
            resolve_last_off_day(Some(d(2025, 5, 20)), &ledger, "a", &june),
            d(2025, 5, 20)
        );
        // Nothing recorded in May: the 31st is unassigned, so it counts as off
        assert_eq!(
            resolve_last_off_day(None, &ledger, "a", &june),
            d(2025, 5, 31)
        );

        for day in 25..=31 {
            ledger.set(d(2025, 5, day), "a", ShiftType::OnSite);
        }
        assert_eq!(
            resolve_last_off_day(None, &ledger, "a", &june),
            d(2025, 5, 24)
        );
    }
}
