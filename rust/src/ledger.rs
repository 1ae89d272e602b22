//! The shift ledger: mutable assignments plus a lock overlay.
//!
//! Reads of a locked cell always return the locked value. Locking a cell
//! copies its current value (or OFF) into both maps.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use std::collections::HashMap;

use crate::calendar::MonthWindow;
use crate::models::{ParseError, ShiftType};

type DayCells = FxHashMap<String, ShiftType>;

/// Assignments and locked overrides, keyed by date then person id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShiftLedger {
    assignments: FxHashMap<NaiveDate, DayCells>,
    locks: FxHashMap<NaiveDate, DayCells>,
}

impl ShiftLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a cell; the lock overlay wins.
    pub fn get(&self, date: NaiveDate, person_id: &str) -> Option<ShiftType> {
        self.locked_value(date, person_id).or_else(|| {
            self.assignments
                .get(&date)
                .and_then(|cells| cells.get(person_id).copied())
        })
    }

    pub fn locked_value(&self, date: NaiveDate, person_id: &str) -> Option<ShiftType> {
        self.locks
            .get(&date)
            .and_then(|cells| cells.get(person_id).copied())
    }

    pub fn is_locked(&self, date: NaiveDate, person_id: &str) -> bool {
        self.locked_value(date, person_id).is_some()
    }

    /// Write an assignment. The lock overlay is untouched, so a locked cell
    /// keeps reading its locked value.
    pub fn set(&mut self, date: NaiveDate, person_id: &str, shift: ShiftType) {
        self.assignments
            .entry(date)
            .or_default()
            .insert(person_id.to_string(), shift);
    }

    /// Remove an assignment; returns the removed value.
    pub fn clear(&mut self, date: NaiveDate, person_id: &str) -> Option<ShiftType> {
        let cells = self.assignments.get_mut(&date)?;
        let removed = cells.remove(person_id);
        if cells.is_empty() {
            self.assignments.remove(&date);
        }
        removed
    }

    /// Pin a cell to its current value (OFF when unassigned).
    pub fn lock(&mut self, date: NaiveDate, person_id: &str) -> ShiftType {
        let value = self.get(date, person_id).unwrap_or(ShiftType::Off);
        self.lock_as(date, person_id, value);
        value
    }

    /// Pin a cell to an explicit value.
    pub fn lock_as(&mut self, date: NaiveDate, person_id: &str, shift: ShiftType) {
        self.locks
            .entry(date)
            .or_default()
            .insert(person_id.to_string(), shift);
        self.set(date, person_id, shift);
    }

    pub fn unlock(&mut self, date: NaiveDate, person_id: &str) -> Option<ShiftType> {
        let cells = self.locks.get_mut(&date)?;
        let removed = cells.remove(person_id);
        if cells.is_empty() {
            self.locks.remove(&date);
        }
        removed
    }

    /// Lock an unlocked cell or unlock a locked one. Returns the new lock state.
    pub fn toggle_lock(&mut self, date: NaiveDate, person_id: &str) -> bool {
        if self.unlock(date, person_id).is_some() {
            false
        } else {
            self.lock(date, person_id);
            true
        }
    }

    /// Lock every listed person on `date`, or unlock them all when every one
    /// is already locked. Returns the new lock state.
    pub fn toggle_day_lock<'a>(
        &mut self,
        date: NaiveDate,
        person_ids: impl IntoIterator<Item = &'a str> + Clone,
    ) -> bool {
        let all_locked = person_ids
            .clone()
            .into_iter()
            .all(|id| self.is_locked(date, id));
        if all_locked {
            for id in person_ids {
                self.unlock(date, id);
            }
            false
        } else {
            for id in person_ids {
                self.lock(date, id);
            }
            true
        }
    }

    /// Drop every assignment and every lock.
    pub fn reset(&mut self) {
        self.assignments.clear();
        self.locks.clear();
    }

    /// Make the window ready for regeneration: locked cells are replayed into
    /// the assignments, every other cell of the listed people is removed.
    pub fn prepare_window<'a>(
        &mut self,
        window: &MonthWindow,
        person_ids: impl IntoIterator<Item = &'a str> + Clone,
    ) {
        for date in window.days() {
            for id in person_ids.clone() {
                match self.locked_value(date, id) {
                    Some(locked) => self.set(date, id, locked),
                    None => {
                        self.clear(date, id);
                    }
                }
            }
        }
    }

    /// True when every listed person is locked OFF on `date` (and the list is non-empty).
    pub fn all_locked_off<'a>(
        &self,
        date: NaiveDate,
        person_ids: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        let Some(cells) = self.locks.get(&date) else {
            return false;
        };
        let mut any = false;
        for id in person_ids {
            any = true;
            if cells.get(id) != Some(&ShiftType::Off) {
                return false;
            }
        }
        any
    }

    pub fn locked_cells(&self) -> impl Iterator<Item = (NaiveDate, &str, ShiftType)> + '_ {
        self.locks.iter().flat_map(|(date, cells)| {
            cells
                .iter()
                .map(move |(id, shift)| (*date, id.as_str(), *shift))
        })
    }

    /// Build from the string-coded maps used at the Python boundary.
    pub fn from_codes(
        shifts: &HashMap<NaiveDate, HashMap<String, String>>,
        locks: &HashMap<NaiveDate, HashMap<String, String>>,
    ) -> Result<Self, ParseError> {
        let mut ledger = Self::new();
        for (date, cells) in shifts {
            for (id, code) in cells {
                ledger.set(*date, id, code.parse()?);
            }
        }
        for (date, cells) in locks {
            for (id, code) in cells {
                ledger
                    .locks
                    .entry(*date)
                    .or_default()
                    .insert(id.clone(), code.parse()?);
            }
        }
        Ok(ledger)
    }

    /// Effective values (locks applied) as string codes.
    pub fn to_codes(&self) -> HashMap<NaiveDate, HashMap<String, String>> {
        let mut out: HashMap<NaiveDate, HashMap<String, String>> = HashMap::new();
        for (date, cells) in self.assignments.iter().chain(self.locks.iter()) {
            let day = out.entry(*date).or_default();
            for id in cells.keys() {
                if let Some(shift) = self.get(*date, id) {
                    day.insert(id.clone(), shift.as_str().to_string());
                }
            }
        }
        out
    }
}
