//! Post-hoc schedule checks. Findings are advisory and never fail a run.

use chrono::NaiveDate;
use std::fmt;

use crate::config::OptimizerConfig;
use crate::input::ScheduleInput;
use crate::ledger::ShiftLedger;
use crate::models::ShiftType;
use crate::optimizer::scoring::{Spread, GROSS_SPREAD};
use crate::optimizer::{OptimizerError, ScheduleContext, ShiftGrid};

/// One problem found in a schedule.
#[derive(Clone, Debug, PartialEq)]
pub enum Finding {
    /// A targeted day whose headcount misses the target.
    TargetDeviation {
        date: NaiveDate,
        target: i32,
        actual: f64,
    },
    /// Headcount spread across variance-eligible days is 2 or more.
    DailySpread {
        min: f64,
        max: f64,
        min_dates: Vec<NaiveDate>,
        max_dates: Vec<NaiveDate>,
    },
    /// People locked to full work on one of the busiest days.
    LockedWork { date: NaiveDate, names: Vec<String> },
    /// People locked OFF on one of the quietest days.
    LockedOff { date: NaiveDate, names: Vec<String> },
    ConsecutiveRun {
        person: String,
        longest: u32,
        limit: u32,
    },
}

impl Finding {
    /// Whether this finding should trigger another attempt.
    pub fn is_spread_issue(&self) -> bool {
        matches!(self, Finding::DailySpread { .. })
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::TargetDeviation {
                date,
                target,
                actual,
            } => write!(f, "{}: target {} but {} scheduled", date, target, actual),
            Finding::DailySpread { min, max, .. } => write!(
                f,
                "Daily headcount spread too large (min: {}, max: {})",
                min, max
            ),
            Finding::LockedWork { date, names } => write!(
                f,
                "{}: busiest day has locked work for {}",
                date,
                names.join(", ")
            ),
            Finding::LockedOff { date, names } => write!(
                f,
                "{}: quietest day has locked OFF for {}",
                date,
                names.join(", ")
            ),
            Finding::ConsecutiveRun {
                person,
                longest,
                limit,
            } => write!(
                f,
                "{}: {} consecutive working days (limit {})",
                person, longest, limit
            ),
        }
    }
}

/// Check a grid against its context.
pub fn validate(ctx: &ScheduleContext, grid: &ShiftGrid) -> Vec<Finding> {
    let mut findings = Vec::new();

    let mut eligible: Vec<(usize, f64)> = Vec::new();
    for &d in &ctx.working_days {
        let day = &ctx.days[d];
        let count = grid.day_total_all(d);
        if let Some(target) = day.target {
            if count != target as f64 {
                findings.push(Finding::TargetDeviation {
                    date: day.date,
                    target,
                    actual: count,
                });
            }
        }
        if day.variance_eligible() {
            eligible.push((d, count));
        }
    }

    let spread = Spread::of(eligible.iter().map(|&(_, c)| c));
    if let (Some(min), Some(max)) = (spread.min(), spread.max()) {
        if max - min >= GROSS_SPREAD {
            let dates_at = |level: f64| -> Vec<usize> {
                eligible
                    .iter()
                    .filter(|&&(_, c)| c == level)
                    .map(|&(d, _)| d)
                    .collect()
            };
            let max_days = dates_at(max);
            let min_days = dates_at(min);

            findings.push(Finding::DailySpread {
                min,
                max,
                min_dates: min_days.iter().map(|&d| ctx.days[d].date).collect(),
                max_dates: max_days.iter().map(|&d| ctx.days[d].date).collect(),
            });

            for &d in &max_days {
                let names = locked_names(ctx, grid, d, |s| s.is_full_work());
                if !names.is_empty() {
                    findings.push(Finding::LockedWork {
                        date: ctx.days[d].date,
                        names,
                    });
                }
            }
            for &d in &min_days {
                let names = locked_names(ctx, grid, d, |s| s == ShiftType::Off);
                if !names.is_empty() {
                    findings.push(Finding::LockedOff {
                        date: ctx.days[d].date,
                        names,
                    });
                }
            }
        }
    }

    for (m, member) in ctx.members.iter().enumerate() {
        let mut streak = member.streak_seed;
        let mut longest = 0;
        for d in 0..ctx.days.len() {
            if grid.value(d, m) > 0.0 {
                streak += 1;
                longest = longest.max(streak);
            } else {
                streak = 0;
            }
        }
        if longest > ctx.max_consecutive {
            findings.push(Finding::ConsecutiveRun {
                person: member.name.clone(),
                longest,
                limit: ctx.max_consecutive,
            });
        }
    }

    findings
}

fn locked_names(
    ctx: &ScheduleContext,
    grid: &ShiftGrid,
    day: usize,
    matches: impl Fn(ShiftType) -> bool,
) -> Vec<String> {
    ctx.members
        .iter()
        .enumerate()
        .filter(|&(m, _)| grid.is_locked(day, m) && grid.get(day, m).is_some_and(&matches))
        .map(|(_, member)| member.name.clone())
        .collect()
}

/// Check the ledger's current values for the input's window and roster.
pub fn validate_ledger(
    input: &ScheduleInput,
    config: &OptimizerConfig,
    ledger: &ShiftLedger,
) -> Result<Vec<Finding>, OptimizerError> {
    let ctx = ScheduleContext::build(input, ledger, config.max_consecutive)?;
    let grid = ctx.captured_grid(ledger);
    Ok(validate(&ctx, &grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::MonthWindow;
    use crate::models::{Person, Team};
    use chrono::Datelike;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn roster(count: usize) -> ScheduleInput {
        let people = (0..count)
            .map(|i| Person::new(format!("p{}", i), format!("P{}", i), 0, Some("t".to_string())))
            .collect();
        ScheduleInput::new(
            MonthWindow::new(2025, 6).unwrap(),
            people,
            vec![Team::new("t".to_string(), "Team".to_string())],
        )
    }

    /// Everyone works every weekday.
    fn full_ledger(input: &ScheduleInput) -> ShiftLedger {
        let mut ledger = ShiftLedger::new();
        for date in input.window.days() {
            for person in &input.people {
                let weekend = date.weekday().num_days_from_monday() >= 5;
                let shift = if weekend { ShiftType::Off } else { ShiftType::OnSite };
                ledger.set(date, &person.id, shift);
            }
        }
        ledger
    }

    #[test]
    fn test_flat_schedule_has_no_spread_finding() {
        let input = roster(2);
        let ledger = full_ledger(&input);
        let findings = validate_ledger(&input, &OptimizerConfig::default(), &ledger).unwrap();
        assert!(findings.iter().all(|f| !f.is_spread_issue()));
        assert!(findings
            .iter()
            .all(|f| !matches!(f, Finding::TargetDeviation { .. })));
    }

    #[test]
    fn test_target_deviation_reported() {
        let mut input = roster(2);
        input.daily_targets.insert(d(2025, 6, 10), 1);
        let ledger = full_ledger(&input);
        let findings = validate_ledger(&input, &OptimizerConfig::default(), &ledger).unwrap();

        assert!(findings.contains(&Finding::TargetDeviation {
            date: d(2025, 6, 10),
            target: 1,
            actual: 2.0,
        }));
        assert_eq!(
            findings[0].to_string(),
            "2025-06-10: target 1 but 2 scheduled"
        );
    }

    #[test]
    fn test_spread_with_lock_impact() {
        let input = roster(2);
        let mut ledger = full_ledger(&input);
        // The 3rd: both off, P0 locked
        ledger.lock_as(d(2025, 6, 3), "p0", ShiftType::Off);
        ledger.set(d(2025, 6, 3), "p1", ShiftType::Off);
        // The 4th stays at 2 with P1 locked on site
        ledger.lock_as(d(2025, 6, 4), "p1", ShiftType::OnSite);

        let findings = validate_ledger(&input, &OptimizerConfig::default(), &ledger).unwrap();

        let spread = findings
            .iter()
            .find(|f| f.is_spread_issue())
            .expect("spread finding");
        match spread {
            Finding::DailySpread {
                min,
                max,
                min_dates,
                max_dates,
            } => {
                assert_eq!((*min, *max), (0.0, 2.0));
                assert_eq!(min_dates, &vec![d(2025, 6, 3)]);
                assert_eq!(max_dates.len(), 20);
            }
            _ => unreachable!(),
        }
        assert!(findings.contains(&Finding::LockedOff {
            date: d(2025, 6, 3),
            names: vec!["P0".to_string()],
        }));
        assert!(findings.contains(&Finding::LockedWork {
            date: d(2025, 6, 4),
            names: vec!["P1".to_string()],
        }));
    }

    #[test]
    fn test_consecutive_run_includes_carried_streak() {
        let mut input = roster(1);
        // July 2025 starts on a Tuesday
        input.window = MonthWindow::new(2025, 7).unwrap();
        let ledger = full_ledger(&input);
        let config = OptimizerConfig::default();

        // Mon-Fri is exactly the limit of 5
        let findings = validate_ledger(&input, &config, &ledger).unwrap();
        assert!(findings
            .iter()
            .all(|f| !matches!(f, Finding::ConsecutiveRun { .. })));

        // Worked the last two days of June: Tue-Fri becomes a run of 6
        input.last_off_days.insert("p0".to_string(), d(2025, 6, 28));
        let findings = validate_ledger(&input, &config, &ledger).unwrap();
        assert!(findings.contains(&Finding::ConsecutiveRun {
            person: "P0".to_string(),
            longest: 6,
            limit: 5,
        }));
    }
}
