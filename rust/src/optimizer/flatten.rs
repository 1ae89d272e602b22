//! Directed flattening: move single work days from the busiest dates to the
//! quietest ones until the daily headcount spread drops below 2.

use rand::seq::SliceRandom;
use rand::Rng;

use super::scoring::{Spread, GROSS_SPREAD};
use super::state::{ScheduleContext, ShiftGrid};
use crate::interner::PersonIdx;
use crate::log_moves;
use crate::models::ShiftType;

/// Run up to `attempts` transfers among `members`. Returns the number of
/// transfers made.
///
/// Only variance-eligible days are considered. A transfer picks a random
/// unlocked member who works on a max day and is exactly OFF on a min day,
/// then swaps the two cells. Stops early when the spread is already under 2
/// or no transfer is possible.
pub fn flatten<R: Rng>(
    ctx: &ScheduleContext,
    grid: &mut ShiftGrid,
    members: &[PersonIdx],
    attempts: u32,
    rng: &mut R,
    verbosity: u8,
) -> usize {
    let eligible: Vec<usize> = ctx
        .working_days
        .iter()
        .copied()
        .filter(|&d| ctx.days[d].variance_eligible())
        .collect();
    if eligible.is_empty() || members.is_empty() {
        return 0;
    }

    let mut moves = 0;
    for _ in 0..attempts {
        let counts: Vec<f64> = eligible
            .iter()
            .map(|&d| grid.day_total(d, members))
            .collect();
        let spread = Spread::of(counts.iter().copied());
        let (Some(lo), Some(hi)) = (spread.min(), spread.max()) else {
            break;
        };
        if hi - lo < GROSS_SPREAD {
            break;
        }

        let mut min_days: Vec<usize> = Vec::new();
        let mut max_days: Vec<usize> = Vec::new();
        for (&d, &c) in eligible.iter().zip(&counts) {
            if c == lo {
                min_days.push(d);
            }
            if c == hi {
                max_days.push(d);
            }
        }
        min_days.shuffle(rng);
        max_days.shuffle(rng);

        let transfer = max_days.iter().find_map(|&from| {
            min_days.iter().find_map(|&to| {
                if from == to {
                    return None;
                }
                let candidates: Vec<PersonIdx> = members
                    .iter()
                    .copied()
                    .filter(|&m| {
                        !grid.is_locked(from, m)
                            && !grid.is_locked(to, m)
                            && grid.value(from, m) >= 1.0
                            && grid.get(to, m) == Some(ShiftType::Off)
                    })
                    .collect();
                candidates.choose(rng).map(|&m| (m, from, to))
            })
        });

        let Some((m, from, to)) = transfer else {
            break;
        };
        grid.set(from, m, Some(ShiftType::Off));
        grid.set(to, m, Some(ctx.days[to].work_shift()));
        moves += 1;

        log_moves!(
            verbosity,
            "flatten: {} {} -> {}",
            ctx.members[m].id,
            ctx.days[from].date,
            ctx.days[to].date
        );
    }
    moves
}
