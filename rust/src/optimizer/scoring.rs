//! The objective minimized by the search. Lower is better.

use super::state::{ScheduleContext, ShiftGrid};
use crate::models::PairMode;

/// Per unit of headcount off an explicit daily target.
pub const TARGET_WEIGHT: f64 = 5_000.0;
/// Per unit of inter-team spread on a targeted day, when the spread is >= 2.
pub const TARGET_TEAM_SPREAD_WEIGHT: f64 = 50_000.0;
/// Flat charge for a targeted day whose team spread is at least 1 but under 2.
pub const TARGET_TEAM_NEAR_PENALTY: f64 = 500.0;
/// Per squared headcount on every working day.
pub const SMOOTHING_WEIGHT: f64 = 10.0;
/// Per unit of global daily spread, when the spread is >= 2.
pub const GLOBAL_SPREAD_WEIGHT: f64 = 10_000.0;
/// Per unit of one team's daily spread, when the spread is >= 2.
pub const TEAM_SPREAD_WEIGHT: f64 = 8_000.0;
/// Per squared streak length on each working day.
pub const STREAK_WEIGHT: f64 = 10.0;
/// Charged on every day a streak runs past the configured maximum.
pub const STREAK_OVERRUN_PENALTY: f64 = 1_000.0;
/// Per day a pairing condition is broken.
pub const PAIR_PENALTY: f64 = 200.0;

/// Spread threshold shared by the variance terms and the validator.
pub const GROSS_SPREAD: f64 = 2.0;

/// Running min/max over a set of headcounts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spread {
    bounds: Option<(f64, f64)>,
}

impl Spread {
    #[inline]
    pub fn observe(&mut self, value: f64) {
        self.bounds = Some(match self.bounds {
            None => (value, value),
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
        });
    }

    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let mut spread = Self::default();
        for v in values {
            spread.observe(v);
        }
        spread
    }

    pub fn min(&self) -> Option<f64> {
        self.bounds.map(|(lo, _)| lo)
    }

    pub fn max(&self) -> Option<f64> {
        self.bounds.map(|(_, hi)| hi)
    }

    /// max - min, or 0 when nothing was observed.
    pub fn range(&self) -> f64 {
        self.bounds.map_or(0.0, |(lo, hi)| hi - lo)
    }
}

/// Score split into its terms, for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub target_deviation: f64,
    pub target_team_balance: f64,
    pub smoothing: f64,
    pub global_variance: f64,
    pub team_variance: f64,
    pub consecutive: f64,
    pub pairing: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.target_deviation
            + self.target_team_balance
            + self.smoothing
            + self.global_variance
            + self.team_variance
            + self.consecutive
            + self.pairing
    }
}

/// Total score of the grid.
pub fn score(ctx: &ScheduleContext, grid: &ShiftGrid) -> f64 {
    score_breakdown(ctx, grid).total()
}

/// Compute every term from scratch. Holds no state between calls.
pub fn score_breakdown(ctx: &ScheduleContext, grid: &ShiftGrid) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();
    let mut global = Spread::default();

    for &d in &ctx.working_days {
        let day = &ctx.days[d];
        let count = grid.day_total_all(d);

        if let Some(target) = day.target {
            breakdown.target_deviation += TARGET_WEIGHT * (count - target as f64).abs();

            if !ctx.teams.is_empty() {
                let spread = Spread::of(ctx.teams.iter().map(|team| grid.day_total(d, team)))
                    .range();
                if spread >= GROSS_SPREAD {
                    breakdown.target_team_balance += TARGET_TEAM_SPREAD_WEIGHT * spread;
                } else if spread >= 1.0 {
                    breakdown.target_team_balance += TARGET_TEAM_NEAR_PENALTY;
                }
            }
        }

        if day.variance_eligible() {
            global.observe(count);
        }

        breakdown.smoothing += SMOOTHING_WEIGHT * count * count;
    }

    let global_range = global.range();
    if global_range >= GROSS_SPREAD {
        breakdown.global_variance += GLOBAL_SPREAD_WEIGHT * global_range;
    }

    for team in &ctx.teams {
        let range = Spread::of(
            ctx.working_days
                .iter()
                .filter(|&&d| ctx.days[d].variance_eligible())
                .map(|&d| grid.day_total(d, team)),
        )
        .range();
        if range >= GROSS_SPREAD {
            breakdown.team_variance += TEAM_SPREAD_WEIGHT * range;
        }
    }

    for (m, member) in ctx.members.iter().enumerate() {
        let mut streak = member.streak_seed;
        for d in 0..ctx.days.len() {
            if grid.value(d, m) > 0.0 {
                streak += 1;
                if streak > ctx.max_consecutive {
                    breakdown.consecutive += STREAK_OVERRUN_PENALTY;
                }
                breakdown.consecutive += STREAK_WEIGHT * (streak as f64).powi(2);
            } else {
                streak = 0;
            }
        }
    }

    for pair in &ctx.pairs {
        for &d in &ctx.working_days {
            let first = grid.value(d, pair.first) > 0.0;
            let second = grid.value(d, pair.second) > 0.0;
            let broken = match pair.mode {
                PairMode::Together => first != second,
                PairMode::Separate => first && second,
            };
            if broken {
                breakdown.pairing += PAIR_PENALTY;
            }
        }
    }

    breakdown
}
