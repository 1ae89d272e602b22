//! Core data types for the shift optimizer.

use chrono::{NaiveDate, Weekday};
use pyo3::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Note: We use std HashMap on the PyO3-facing types for interface compatibility

/// Errors raised when decoding the string codes used at the crate boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown shift type: {0}")]
    ShiftType(String),
    #[error("Unknown day pattern: {0}")]
    DayPattern(String),
    #[error("Unknown weekday key: {0}")]
    Weekday(String),
    #[error("Unknown pairing mode: {0}")]
    PairMode(String),
    #[error("Unknown optimization strength: {0}")]
    Strength(String),
}

/// The category of work assigned to one person on one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShiftType {
    OnSite,
    Trip,
    HalfAm,
    HalfPm,
    Off,
}

impl ShiftType {
    /// Numeric work contribution used by all quota and headcount arithmetic.
    pub fn day_value(self) -> f64 {
        match self {
            ShiftType::OnSite | ShiftType::Trip => 1.0,
            ShiftType::HalfAm | ShiftType::HalfPm => 0.5,
            ShiftType::Off => 0.0,
        }
    }

    pub fn is_work(self) -> bool {
        self.day_value() > 0.0
    }

    pub fn is_full_work(self) -> bool {
        matches!(self, ShiftType::OnSite | ShiftType::Trip)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftType::OnSite => "ON_SITE",
            ShiftType::Trip => "TRIP",
            ShiftType::HalfAm => "HALF_AM",
            ShiftType::HalfPm => "HALF_PM",
            ShiftType::Off => "OFF",
        }
    }
}

/// Day-value of a possibly unassigned cell (unassigned counts as OFF).
#[inline]
pub fn cell_value(shift: Option<ShiftType>) -> f64 {
    shift.map_or(0.0, ShiftType::day_value)
}

impl FromStr for ShiftType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_SITE" => Ok(ShiftType::OnSite),
            "TRIP" => Ok(ShiftType::Trip),
            "HALF_AM" => Ok(ShiftType::HalfAm),
            "HALF_PM" => Ok(ShiftType::HalfPm),
            "OFF" => Ok(ShiftType::Off),
            other => Err(ParseError::ShiftType(other.to_string())),
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weekly setting for one weekday.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayPattern {
    Work,
    Off,
    HalfAm,
    HalfPm,
}

impl DayPattern {
    /// Shift type assigned when a person works on a day with this pattern.
    pub fn work_shift(self) -> ShiftType {
        match self {
            DayPattern::HalfAm => ShiftType::HalfAm,
            DayPattern::HalfPm => ShiftType::HalfPm,
            DayPattern::Work | DayPattern::Off => ShiftType::OnSite,
        }
    }
}

impl FromStr for DayPattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WORK" => Ok(DayPattern::Work),
            "OFF" => Ok(DayPattern::Off),
            "HALF_AM" => Ok(DayPattern::HalfAm),
            "HALF_PM" => Ok(DayPattern::HalfPm),
            other => Err(ParseError::DayPattern(other.to_string())),
        }
    }
}

/// One `DayPattern` per weekday.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklyPattern {
    /// Indexed by `Weekday::num_days_from_monday()`.
    days: [DayPattern; 7],
}

impl Default for WeeklyPattern {
    fn default() -> Self {
        Self {
            days: [
                DayPattern::Work,
                DayPattern::Work,
                DayPattern::Work,
                DayPattern::Work,
                DayPattern::Work,
                DayPattern::Off,
                DayPattern::Off,
            ],
        }
    }
}

impl WeeklyPattern {
    pub fn uniform(pattern: DayPattern) -> Self {
        Self { days: [pattern; 7] }
    }

    pub fn get(&self, weekday: Weekday) -> DayPattern {
        self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn set(&mut self, weekday: Weekday, pattern: DayPattern) {
        self.days[weekday.num_days_from_monday() as usize] = pattern;
    }

    /// Build from `{"mon": "WORK", "sat": "OFF", ...}`; missing keys keep the default.
    pub fn from_codes(codes: &HashMap<String, String>) -> Result<Self, ParseError> {
        let mut pattern = Self::default();
        for (key, value) in codes {
            let weekday = match key.as_str() {
                "mon" => Weekday::Mon,
                "tue" => Weekday::Tue,
                "wed" => Weekday::Wed,
                "thu" => Weekday::Thu,
                "fri" => Weekday::Fri,
                "sat" => Weekday::Sat,
                "sun" => Weekday::Sun,
                other => return Err(ParseError::Weekday(other.to_string())),
            };
            pattern.set(weekday, value.parse()?);
        }
        Ok(pattern)
    }
}

/// How two people in a pairing condition relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairMode {
    /// Same working/non-working status on every working day.
    Together,
    /// Never both working on the same day.
    Separate,
}

impl FromStr for PairMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOGETHER" => Ok(PairMode::Together),
            "SEPARATE" => Ok(PairMode::Separate),
            other => Err(ParseError::PairMode(other.to_string())),
        }
    }
}

/// A person on the roster.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Person {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
    /// Leave days on top of the global base-off count.
    #[pyo3(get, set)]
    pub extra_off: u32,
    #[pyo3(get, set)]
    pub team_id: Option<String>,
}

#[pymethods]
impl Person {
    #[new]
    #[pyo3(signature = (id, name, extra_off=0, team_id=None))]
    pub fn new(id: String, name: String, extra_off: u32, team_id: Option<String>) -> Self {
        Self {
            id,
            name,
            extra_off,
            team_id,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Person(id={:?}, name={:?}, extra_off={}, team_id={:?})",
            self.id, self.name, self.extra_off, self.team_id
        )
    }
}

/// A named grouping of people.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Team {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
}

#[pymethods]
impl Team {
    #[new]
    pub fn new(id: String, name: String) -> Self {
        Self { id, name }
    }

    fn __repr__(&self) -> String {
        format!("Team(id={:?}, name={:?})", self.id, self.name)
    }
}

/// Pairing constraint between two people.
#[pyclass]
#[derive(Clone, Debug)]
pub struct PairCondition {
    /// "TOGETHER" or "SEPARATE"
    #[pyo3(get, set)]
    pub mode: String,
    #[pyo3(get, set)]
    pub first: String,
    #[pyo3(get, set)]
    pub second: String,
}

#[pymethods]
impl PairCondition {
    #[new]
    pub fn new(mode: String, first: String, second: String) -> Self {
        Self {
            mode,
            first,
            second,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "PairCondition(mode={:?}, first={:?}, second={:?})",
            self.mode, self.first, self.second
        )
    }
}

impl PairCondition {
    pub fn pair_mode(&self) -> Result<PairMode, ParseError> {
        self.mode.parse()
    }
}

/// Result of a committed optimization run.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct OptimizationResult {
    /// Full shift map after the run: date -> person -> shift code.
    #[pyo3(get, set)]
    pub shifts: HashMap<NaiveDate, HashMap<String, String>>,
    /// Carried-streak values for the following month: person -> last off day.
    #[pyo3(get, set)]
    pub next_month_last_off: HashMap<String, NaiveDate>,
    #[pyo3(get, set)]
    pub warnings: Vec<String>,
    #[pyo3(get, set)]
    pub attempts: u32,
    #[pyo3(get, set)]
    pub score: f64,
    #[pyo3(get, set)]
    pub metadata: HashMap<String, String>,
}

#[pymethods]
impl OptimizationResult {
    fn __repr__(&self) -> String {
        format!(
            "OptimizationResult(dates={}, warnings={}, attempts={}, score={})",
            self.shifts.len(),
            self.warnings.len(),
            self.attempts,
            self.score
        )
    }
}
