//! Dense working state for one optimization run.
//!
//! `ScheduleContext` is the immutable part (days, members, teams, pairing
//! rules); `ShiftGrid` holds the cells every phase reads and mutates.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::calendar::MonthWindow;
use crate::input::ScheduleInput;
use crate::interner::{PersonIdInterner, PersonIdx};
use crate::ledger::ShiftLedger;
use crate::models::{cell_value, DayPattern, PairMode, ParseError, ShiftType};
use crate::streak::{resolve_last_off_day, streak_seed};
use crate::workday::WorkDayClassifier;

/// One date of the window.
#[derive(Clone, Debug)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub pattern: DayPattern,
    pub working: bool,
    pub target: Option<i32>,
}

impl DaySlot {
    /// Days that take part in spread checks: working, full-day pattern, no target.
    #[inline]
    pub fn variance_eligible(&self) -> bool {
        self.working && self.pattern == DayPattern::Work && self.target.is_none()
    }

    #[inline]
    pub fn work_shift(&self) -> ShiftType {
        self.pattern.work_shift()
    }
}

/// One active person.
#[derive(Clone, Debug)]
pub struct MemberSlot {
    pub id: String,
    pub name: String,
    pub extra_off: u32,
    /// Index into `ScheduleContext::teams`.
    pub team: Option<usize>,
    /// Working days carried in from the previous month.
    pub streak_seed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairRule {
    pub first: PersonIdx,
    pub second: PersonIdx,
    pub mode: PairMode,
}

/// Immutable facts about the window and the active roster.
#[derive(Clone, Debug)]
pub struct ScheduleContext {
    pub window: MonthWindow,
    pub days: Vec<DaySlot>,
    pub members: Vec<MemberSlot>,
    /// Member indices per team; only teams with at least one active member.
    pub teams: Vec<Vec<PersonIdx>>,
    pub pairs: Vec<PairRule>,
    pub max_consecutive: u32,
    /// Indices of working days.
    pub working_days: Vec<usize>,
    interner: PersonIdInterner,
}

impl ScheduleContext {
    /// Snapshot the input. Pairing rules naming people outside the active
    /// roster are dropped.
    pub fn build(
        input: &ScheduleInput,
        ledger: &ShiftLedger,
        max_consecutive: u32,
    ) -> Result<Self, ParseError> {
        let active = input.active_people();
        let interner = PersonIdInterner::from_ids(active.iter().map(|p| p.id.as_str()));

        let classifier = WorkDayClassifier::new(
            &input.pattern,
            &input.daily_targets,
            ledger,
            input.person_ids(),
        );
        let days: Vec<DaySlot> = input
            .window
            .days()
            .into_iter()
            .map(|date| DaySlot {
                date,
                pattern: classifier.pattern_for(date),
                working: classifier.is_working_day(date),
                target: input.daily_targets.get(&date).copied(),
            })
            .collect();
        let working_days = days
            .iter()
            .enumerate()
            .filter(|(_, day)| day.working)
            .map(|(i, _)| i)
            .collect();

        let mut teams: Vec<Vec<PersonIdx>> = Vec::new();
        let mut team_slot: FxHashMap<&str, usize> = FxHashMap::default();
        for team in &input.teams {
            let members: Vec<PersonIdx> = active
                .iter()
                .filter(|p| p.team_id.as_deref() == Some(team.id.as_str()))
                .filter_map(|p| interner.get(&p.id))
                .collect();
            if !members.is_empty() {
                team_slot.insert(team.id.as_str(), teams.len());
                teams.push(members);
            }
        }

        let window_start = input.window.first_day();
        let mut members = Vec::with_capacity(interner.len());
        for idx in 0..interner.len() {
            let id = interner.resolve(idx).unwrap_or_default();
            // Duplicate ids collapse onto the first entry
            let Some(person) = active.iter().find(|p| p.id == id) else {
                continue;
            };
            let last_off = resolve_last_off_day(
                input.last_off_days.get(id).copied(),
                ledger,
                id,
                &input.window,
            );
            members.push(MemberSlot {
                id: person.id.clone(),
                name: person.name.clone(),
                extra_off: person.extra_off,
                team: person
                    .team_id
                    .as_deref()
                    .and_then(|t| team_slot.get(t).copied()),
                streak_seed: streak_seed(last_off, window_start),
            });
        }

        let mut pairs = Vec::new();
        for condition in &input.conditions {
            let mode = condition.pair_mode()?;
            if let (Some(first), Some(second)) =
                (interner.get(&condition.first), interner.get(&condition.second))
            {
                pairs.push(PairRule {
                    first,
                    second,
                    mode,
                });
            }
        }

        Ok(Self {
            window: input.window,
            days,
            members,
            teams,
            pairs,
            max_consecutive,
            working_days,
            interner,
        })
    }

    pub fn member_index(&self, person_id: &str) -> Option<PersonIdx> {
        self.interner.get(person_id)
    }

    pub fn all_members(&self) -> Vec<PersonIdx> {
        (0..self.members.len()).collect()
    }

    /// Grid holding only the locked cells; everything else unassigned.
    pub fn prepared_grid(&self, ledger: &ShiftLedger) -> ShiftGrid {
        let mut grid = ShiftGrid::empty(self.days.len(), self.members.len());
        for (d, day) in self.days.iter().enumerate() {
            for (m, member) in self.members.iter().enumerate() {
                if let Some(locked) = ledger.locked_value(day.date, &member.id) {
                    grid.pin(d, m, locked);
                }
            }
        }
        grid
    }

    /// Grid holding the ledger's current values, locks included.
    pub fn captured_grid(&self, ledger: &ShiftLedger) -> ShiftGrid {
        let mut grid = self.prepared_grid(ledger);
        for (d, day) in self.days.iter().enumerate() {
            for (m, member) in self.members.iter().enumerate() {
                if !grid.is_locked(d, m) {
                    let i = grid.offset(d, m);
                    grid.cells[i] = ledger.get(day.date, &member.id);
                }
            }
        }
        grid
    }

    /// Write the grid into the ledger. Only the active roster's cells in the
    /// window are touched; locked cells keep their locked value.
    pub fn commit(&self, grid: &ShiftGrid, ledger: &mut ShiftLedger) {
        ledger.prepare_window(&self.window, self.members.iter().map(|m| m.id.as_str()));
        for (d, day) in self.days.iter().enumerate() {
            for (m, member) in self.members.iter().enumerate() {
                if grid.is_locked(d, m) {
                    continue;
                }
                if let Some(shift) = grid.get(d, m) {
                    ledger.set(day.date, &member.id, shift);
                }
            }
        }
    }
}

/// Day-major grid of assignments with a parallel lock mask.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftGrid {
    n_members: usize,
    cells: Vec<Option<ShiftType>>,
    locked: Vec<bool>,
}

impl ShiftGrid {
    pub fn empty(n_days: usize, n_members: usize) -> Self {
        Self {
            n_members,
            cells: vec![None; n_days * n_members],
            locked: vec![false; n_days * n_members],
        }
    }

    #[inline]
    fn offset(&self, day: usize, member: PersonIdx) -> usize {
        day * self.n_members + member
    }

    fn pin(&mut self, day: usize, member: PersonIdx, shift: ShiftType) {
        let i = self.offset(day, member);
        self.cells[i] = Some(shift);
        self.locked[i] = true;
    }

    #[inline]
    pub fn get(&self, day: usize, member: PersonIdx) -> Option<ShiftType> {
        self.cells[self.offset(day, member)]
    }

    #[inline]
    pub fn value(&self, day: usize, member: PersonIdx) -> f64 {
        cell_value(self.get(day, member))
    }

    #[inline]
    pub fn is_locked(&self, day: usize, member: PersonIdx) -> bool {
        self.locked[self.offset(day, member)]
    }

    /// Assign an unlocked cell. Locked cells are never written; returns
    /// whether the write happened.
    #[inline]
    pub fn set(&mut self, day: usize, member: PersonIdx, shift: Option<ShiftType>) -> bool {
        let i = self.offset(day, member);
        if self.locked[i] {
            return false;
        }
        self.cells[i] = shift;
        true
    }

    /// Headcount of `members` on `day`.
    pub fn day_total(&self, day: usize, members: &[PersonIdx]) -> f64 {
        members.iter().map(|&m| self.value(day, m)).sum()
    }

    /// Headcount of every member on `day`.
    pub fn day_total_all(&self, day: usize) -> f64 {
        let start = day * self.n_members;
        self.cells[start..start + self.n_members]
            .iter()
            .map(|c| cell_value(*c))
            .sum()
    }

    /// Number of working-status days for one member.
    pub fn work_days_of(&self, member: PersonIdx, n_days: usize) -> usize {
        (0..n_days).filter(|&d| self.value(d, member) > 0.0).count()
    }

    /// Summed day-values for one member.
    pub fn work_value_of(&self, member: PersonIdx, n_days: usize) -> f64 {
        (0..n_days).map(|d| self.value(d, member)).sum()
    }
}
