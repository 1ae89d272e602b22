//! Randomized initial assignment honoring per-person quotas.

use rand::seq::SliceRandom;
use rand::Rng;

use super::state::{ScheduleContext, ShiftGrid};
use crate::log_debug;
use crate::models::ShiftType;
use crate::quota::Quota;

/// Fill every unlocked cell of a prepared grid.
///
/// Non-working days become OFF. Each person's open working days are shuffled
/// and walked in order: a day gets its work shift while the assigned
/// day-values still fit under the quota, otherwise OFF. A fractional
/// remainder is rounded down.
pub fn build_initial<R: Rng>(
    ctx: &ScheduleContext,
    grid: &mut ShiftGrid,
    base_off: u32,
    rng: &mut R,
    verbosity: u8,
) {
    let n_days = ctx.days.len();

    for (m, member) in ctx.members.iter().enumerate() {
        for (d, day) in ctx.days.iter().enumerate() {
            if !day.working && !grid.is_locked(d, m) && grid.get(d, m).is_none() {
                grid.set(d, m, Some(ShiftType::Off));
            }
        }

        let quota = Quota::compute(
            n_days,
            base_off,
            member.extra_off,
            ctx.days
                .iter()
                .enumerate()
                .filter(|(d, _)| grid.is_locked(*d, m))
                .filter_map(|(d, day)| grid.get(d, m).map(|shift| (day.working, shift))),
        );
        let needed = quota.needed();

        let mut pool: Vec<usize> = ctx
            .working_days
            .iter()
            .copied()
            .filter(|&d| !grid.is_locked(d, m) && grid.get(d, m).is_none())
            .collect();
        pool.shuffle(rng);

        let mut assigned = 0.0;
        for &d in &pool {
            let work = ctx.days[d].work_shift();
            let shift = if assigned + work.day_value() <= needed {
                assigned += work.day_value();
                work
            } else {
                ShiftType::Off
            };
            grid.set(d, m, Some(shift));
        }

        log_debug!(
            verbosity,
            "{}: target {:.1}, fixed {:.1}, assigned {:.1} of {} open",
            member.id,
            quota.target,
            quota.fixed,
            assigned,
            pool.len()
        );
    }
}
