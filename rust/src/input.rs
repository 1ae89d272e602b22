//! The read-only snapshot an optimization run consumes.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::calendar::MonthWindow;
use crate::models::{PairCondition, Person, Team, WeeklyPattern};

/// Everything the optimizer reads besides the ledger and its tuning knobs.
#[derive(Clone, Debug)]
pub struct ScheduleInput {
    pub window: MonthWindow,
    /// Every known person, active or not.
    pub people: Vec<Person>,
    pub teams: Vec<Team>,
    /// Restrict the run to one team's members; None means everyone.
    pub active_team: Option<String>,
    pub pattern: WeeklyPattern,
    pub daily_targets: FxHashMap<NaiveDate, i32>,
    pub conditions: Vec<PairCondition>,
    /// Explicit last off day before the window, per person id.
    pub last_off_days: FxHashMap<String, NaiveDate>,
}

impl ScheduleInput {
    pub fn new(window: MonthWindow, people: Vec<Person>, teams: Vec<Team>) -> Self {
        Self {
            window,
            people,
            teams,
            active_team: None,
            pattern: WeeklyPattern::default(),
            daily_targets: FxHashMap::default(),
            conditions: Vec::new(),
            last_off_days: FxHashMap::default(),
        }
    }

    /// People the run generates, scores and validates.
    pub fn active_people(&self) -> Vec<&Person> {
        match &self.active_team {
            None => self.people.iter().collect(),
            Some(team) => self
                .people
                .iter()
                .filter(|p| p.team_id.as_deref() == Some(team.as_str()))
                .collect(),
        }
    }

    pub fn person_ids(&self) -> Vec<&str> {
        self.people.iter().map(|p| p.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, team: Option<&str>) -> Person {
        Person::new(id.to_string(), id.to_uppercase(), 0, team.map(str::to_string))
    }

    #[test]
    fn test_active_people_follow_team_view() {
        let mut input = ScheduleInput::new(
            MonthWindow::new(2025, 6).unwrap(),
            vec![
                person("a", Some("t1")),
                person("b", Some("t2")),
                person("c", None),
            ],
            vec![],
        );

        assert_eq!(input.active_people().len(), 3);

        input.active_team = Some("t2".to_string());
        let active: Vec<&str> = input.active_people().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(active, vec!["b"]);
        assert_eq!(input.person_ids(), vec!["a", "b", "c"]);
    }
}
