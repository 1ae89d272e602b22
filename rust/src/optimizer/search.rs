//! Randomized local search over single-person day swaps.

use rand::seq::SliceRandom;
use rand::Rng;

use super::core::OptimizerError;
use super::scoring::score;
use super::state::{ScheduleContext, ShiftGrid};
use crate::models::ShiftType;
use crate::{log_debug, log_moves};

/// Counters from one search run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchStats {
    pub iterations: u32,
    /// Swaps actually scored.
    pub proposals: u32,
    pub accepted: u32,
    pub initial_score: f64,
    pub final_score: f64,
}

/// Hill-climb for `iterations` steps.
///
/// Each step picks a random member and two distinct working days where the
/// member is unlocked and works on exactly one of them, then exchanges the
/// work. Both days must carry the same work day-value, so the member's total
/// never changes. A swap is kept when the score does not get worse.
/// `on_chunk` runs every `interval` steps with the number of completed steps;
/// an error from it aborts the search.
pub fn local_search<R, F>(
    ctx: &ScheduleContext,
    grid: &mut ShiftGrid,
    iterations: u32,
    interval: u32,
    rng: &mut R,
    verbosity: u8,
    mut on_chunk: F,
) -> Result<SearchStats, OptimizerError>
where
    R: Rng,
    F: FnMut(u32) -> Result<(), OptimizerError>,
{
    let interval = interval.max(1);
    let mut current = score(ctx, grid);
    let mut stats = SearchStats {
        initial_score: current,
        final_score: current,
        ..SearchStats::default()
    };

    if ctx.members.is_empty() || ctx.working_days.len() < 2 {
        return Ok(stats);
    }

    for i in 0..iterations {
        if i % interval == 0 {
            on_chunk(i)?;
        }
        stats.iterations += 1;

        let m = rng.gen_range(0..ctx.members.len());
        let (Some(&d1), Some(&d2)) = (
            ctx.working_days.choose(rng),
            ctx.working_days.choose(rng),
        ) else {
            continue;
        };
        if d1 == d2 || grid.is_locked(d1, m) || grid.is_locked(d2, m) {
            continue;
        }

        let s1 = grid.get(d1, m);
        let s2 = grid.get(d2, m);
        let works1 = grid.value(d1, m) > 0.0;
        let works2 = grid.value(d2, m) > 0.0;
        if works1 == works2 {
            continue;
        }
        // Moving work between a half-day and a full-day pattern changes the total
        if ctx.days[d1].work_shift().day_value() != ctx.days[d2].work_shift().day_value() {
            continue;
        }

        let new1 = if works2 {
            ctx.days[d1].work_shift()
        } else {
            ShiftType::Off
        };
        let new2 = if works1 {
            ctx.days[d2].work_shift()
        } else {
            ShiftType::Off
        };
        grid.set(d1, m, Some(new1));
        grid.set(d2, m, Some(new2));
        stats.proposals += 1;

        let candidate = score(ctx, grid);
        if candidate <= current {
            current = candidate;
            stats.accepted += 1;
        } else {
            grid.set(d1, m, s1);
            grid.set(d2, m, s2);
        }
    }

    stats.final_score = current;
    log_moves!(
        verbosity,
        "search: {} iterations, {} proposals, {} accepted",
        stats.iterations,
        stats.proposals,
        stats.accepted
    );
    log_debug!(
        verbosity,
        "search: score {:.1} -> {:.1}",
        stats.initial_score,
        stats.final_score
    );
    Ok(stats)
}
