//! Per-person monthly work quotas.

use crate::models::ShiftType;

/// How much work a person should get in the window and how much is already fixed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quota {
    /// Work-equivalent days the person should end up with.
    pub target: f64,
    /// Work already pinned by locks.
    pub fixed: f64,
}

impl Quota {
    /// `max(0, total_days - base_off - extra_off)`
    pub fn target_work(total_days: usize, base_off: u32, extra_off: u32) -> f64 {
        (total_days as f64 - base_off as f64 - extra_off as f64).max(0.0)
    }

    /// Build from the window length and the person's locked cells, given as
    /// `(is_working_day, locked_shift)` pairs.
    pub fn compute(
        total_days: usize,
        base_off: u32,
        extra_off: u32,
        locked: impl IntoIterator<Item = (bool, ShiftType)>,
    ) -> Self {
        let fixed = locked
            .into_iter()
            .map(|(working, shift)| {
                if working {
                    shift.day_value()
                } else if shift.is_full_work() {
                    1.0
                } else {
                    0.0
                }
            })
            .sum();
        Self {
            target: Self::target_work(total_days, base_off, extra_off),
            fixed,
        }
    }

    /// Work still to hand out; negative means the locks already exceed the quota.
    pub fn needed(&self) -> f64 {
        self.target - self.fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_work() {
        assert_eq!(Quota::target_work(30, 8, 0), 22.0);
        assert_eq!(Quota::target_work(30, 8, 1), 21.0);
        assert_eq!(Quota::target_work(28, 20, 10), 0.0);
    }

    #[test]
    fn test_fixed_work_counts_locks() {
        let quota = Quota::compute(
            30,
            8,
            0,
            [
                (true, ShiftType::OnSite),
                (true, ShiftType::HalfPm),
                (true, ShiftType::Off),
                // Locked trip on a weekend still counts
                (false, ShiftType::Trip),
                // Half days on non-working days do not
                (false, ShiftType::HalfAm),
            ],
        );
        assert_eq!(quota.fixed, 2.5);
        assert_eq!(quota.needed(), 19.5);
    }

    #[test]
    fn test_needed_can_go_negative() {
        let quota = Quota::compute(3, 2, 0, [(true, ShiftType::OnSite); 3]);
        assert_eq!(quota.needed(), -2.0);
    }
}
