//! Rust implementation of the shiftplan monthly shift optimizer.
//!
//! This module provides the scheduling core (ledger, quotas, scoring, search)
//! and its Python bindings.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::HashMap;

pub mod calendar;
mod config;
pub mod input;
pub mod interner;
pub mod ledger;
pub mod logging;
mod models;
pub mod optimizer;
pub mod quota;
pub mod streak;
pub mod validator;
pub mod workday;

pub use calendar::{CalendarError, MonthWindow};
pub use config::{OptimizerConfig, Strength};
pub use input::ScheduleInput;
pub use ledger::ShiftLedger;
pub use models::{
    cell_value, DayPattern, OptimizationResult, PairCondition, PairMode, ParseError, Person,
    ShiftType, Team, WeeklyPattern,
};
pub use optimizer::{
    CancellationToken, NoProgress, OptimizationOutcome, OptimizerError, ProgressFn,
    ProgressSink, ProgressUpdate, ShiftOptimizer,
};
pub use validator::{validate_ledger, Finding};

type ShiftCodes = HashMap<NaiveDate, HashMap<String, String>>;

fn to_py_err(err: OptimizerError) -> PyErr {
    match err {
        OptimizerError::Cancelled => pyo3::exceptions::PyRuntimeError::new_err(err.to_string()),
        _ => pyo3::exceptions::PyValueError::new_err(err.to_string()),
    }
}

/// Assemble the input snapshot from the Python-side pieces.
#[allow(clippy::too_many_arguments)]
fn schedule_input(
    year_month: &str,
    people: Vec<Person>,
    teams: Option<Vec<Team>>,
    work_days: Option<HashMap<String, String>>,
    daily_targets: Option<HashMap<NaiveDate, i32>>,
    conditions: Option<Vec<PairCondition>>,
    last_off_days: Option<HashMap<String, NaiveDate>>,
    active_team: Option<String>,
) -> Result<ScheduleInput, OptimizerError> {
    let window: MonthWindow = year_month.parse()?;
    let mut input = ScheduleInput::new(window, people, teams.unwrap_or_default());
    if let Some(codes) = work_days {
        input.pattern = WeeklyPattern::from_codes(&codes)?;
    }
    input.daily_targets = daily_targets.unwrap_or_default().into_iter().collect();
    input.conditions = conditions.unwrap_or_default();
    input.last_off_days = last_off_days.unwrap_or_default().into_iter().collect();
    input.active_team = active_team;
    Ok(input)
}

/// Forwards progress to a Python callable `(attempt, max_attempts, percent)`.
///
/// A callback returning `False` cancels the run; exceptions it raises are
/// logged and otherwise ignored.
struct PyProgress<'py> {
    callback: Bound<'py, PyAny>,
    cancel: CancellationToken,
    verbosity: u8,
}

impl ProgressSink for PyProgress<'_> {
    fn report(&mut self, update: ProgressUpdate) {
        match self
            .callback
            .call1((update.attempt, update.max_attempts, update.percent()))
        {
            Ok(ret) => {
                if matches!(ret.extract::<bool>(), Ok(false)) {
                    self.cancel.cancel();
                }
            }
            Err(err) => {
                log_phases!(self.verbosity, "Progress callback failed: {}", err);
            }
        }
    }
}

/// Regenerate one month of shifts.
///
/// # Arguments
/// * `year_month` - Month to generate, as "YYYY-MM"
/// * `people` - Every known person; `active_team` narrows who is regenerated
/// * `shifts` - Current shift map: date -> person id -> shift code
/// * `locks` - Locked cells: date -> person id -> shift code
/// * `config` - Optimizer settings
/// * `work_days` - Weekday pattern codes keyed "mon".."sun"
/// * `daily_targets` - Exact headcount wanted on specific dates
/// * `last_off_days` - Last off day before the month, per person id
/// * `progress` - Optional callable `(attempt, max_attempts, percent)`
///
/// # Returns
/// * OptimizationResult with the full updated shift map, next month's
///   carried streaks and the warnings of the committed attempt
///
/// # Raises
/// * ValueError on malformed input, RuntimeError if cancelled
#[pyfunction]
#[pyo3(signature = (
    year_month,
    people,
    shifts,
    locks,
    config,
    teams=None,
    work_days=None,
    daily_targets=None,
    conditions=None,
    last_off_days=None,
    active_team=None,
    progress=None
))]
#[allow(clippy::too_many_arguments)]
fn run_optimizer(
    year_month: &str,
    people: Vec<Person>,
    shifts: ShiftCodes,
    locks: ShiftCodes,
    config: OptimizerConfig,
    teams: Option<Vec<Team>>,
    work_days: Option<HashMap<String, String>>,
    daily_targets: Option<HashMap<NaiveDate, i32>>,
    conditions: Option<Vec<PairCondition>>,
    last_off_days: Option<HashMap<String, NaiveDate>>,
    active_team: Option<String>,
    progress: Option<Bound<'_, PyAny>>,
) -> PyResult<OptimizationResult> {
    let input = schedule_input(
        year_month,
        people,
        teams,
        work_days,
        daily_targets,
        conditions,
        last_off_days,
        active_team,
    )
    .map_err(to_py_err)?;
    let mut ledger = ShiftLedger::from_codes(&shifts, &locks)
        .map_err(|e| to_py_err(OptimizerError::from(e)))?;

    let mut metadata = HashMap::new();
    metadata.insert("window".to_string(), input.window.to_string());
    metadata.insert("strength".to_string(), config.strength.clone());
    if let Some(seed) = config.seed {
        metadata.insert("seed".to_string(), seed.to_string());
    }

    let cancel = CancellationToken::new();
    let verbosity = config.verbosity;
    let optimizer = ShiftOptimizer::new(input, config).map_err(to_py_err)?;
    let outcome = match progress {
        Some(callback) => {
            let mut sink = PyProgress {
                callback,
                cancel: cancel.clone(),
                verbosity,
            };
            optimizer.optimize(&mut ledger, &mut sink, &cancel)
        }
        None => optimizer.optimize(&mut ledger, &mut NoProgress, &cancel),
    }
    .map_err(to_py_err)?;

    metadata.insert("iterations".to_string(), outcome.iterations.to_string());

    Ok(OptimizationResult {
        shifts: ledger.to_codes(),
        warnings: outcome.warnings(),
        next_month_last_off: outcome.next_month_last_off.into_iter().collect(),
        attempts: outcome.attempts,
        score: outcome.score,
        metadata,
    })
}

/// Check an existing shift map and return its warnings.
///
/// # Raises
/// * ValueError on malformed input
#[pyfunction]
#[pyo3(signature = (
    year_month,
    people,
    shifts,
    locks,
    config=None,
    teams=None,
    work_days=None,
    daily_targets=None,
    last_off_days=None,
    active_team=None
))]
#[allow(clippy::too_many_arguments)]
fn validate_schedule(
    year_month: &str,
    people: Vec<Person>,
    shifts: ShiftCodes,
    locks: ShiftCodes,
    config: Option<OptimizerConfig>,
    teams: Option<Vec<Team>>,
    work_days: Option<HashMap<String, String>>,
    daily_targets: Option<HashMap<NaiveDate, i32>>,
    last_off_days: Option<HashMap<String, NaiveDate>>,
    active_team: Option<String>,
) -> PyResult<Vec<String>> {
    let input = schedule_input(
        year_month,
        people,
        teams,
        work_days,
        daily_targets,
        None,
        last_off_days,
        active_team,
    )
    .map_err(to_py_err)?;
    let ledger = ShiftLedger::from_codes(&shifts, &locks)
        .map_err(|e| to_py_err(OptimizerError::from(e)))?;
    let findings =
        validate_ledger(&input, &config.unwrap_or_default(), &ledger).map_err(to_py_err)?;
    Ok(findings.iter().map(|f| f.to_string()).collect())
}

/// The shiftplan.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Person>()?;
    m.add_class::<Team>()?;
    m.add_class::<PairCondition>()?;
    m.add_class::<OptimizationResult>()?;

    // Config types
    m.add_class::<OptimizerConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(run_optimizer, m)?)?;
    m.add_function(wrap_pyfunction!(validate_schedule, m)?)?;

    Ok(())
}
