//! Core domain types for the Glow wellness tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - The per-day health record and the typed updates that mutate it
//! - Derived weekly and streak views
//! - Facial exercise definitions

use crate::{DateKey, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Daily water target in glasses
pub const WATER_GOAL_GLASSES: u32 = 8;

/// Number of tracked goals per day (water, exercise, meals)
pub const DAILY_TASKS: usize = 3;

// ============================================================================
// Daily Record
// ============================================================================

/// Which meal counter an update targets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealKind {
    Healthy,
    Unhealthy,
}

impl fmt::Display for MealKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealKind::Healthy => write!(f, "healthy"),
            MealKind::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

impl FromStr for MealKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "healthy" => Ok(MealKind::Healthy),
            "unhealthy" => Ok(MealKind::Unhealthy),
            other => Err(Error::InvalidArgument(format!(
                "Unknown meal kind: {} (expected healthy or unhealthy)",
                other
            ))),
        }
    }
}

/// Everything logged for one calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: DateKey,
    #[serde(default)]
    pub water_glasses: u32,
    #[serde(default)]
    pub healthy_meals: u32,
    #[serde(default)]
    pub unhealthy_meals: u32,
    #[serde(default)]
    pub exercises_completed: BTreeSet<String>,
}

impl DailyRecord {
    /// The zero record for a day nothing has been logged on
    pub fn empty(date: DateKey) -> Self {
        Self {
            date,
            water_glasses: 0,
            healthy_meals: 0,
            unhealthy_meals: 0,
            exercises_completed: BTreeSet::new(),
        }
    }

    pub fn meals(&self, kind: MealKind) -> u32 {
        match kind {
            MealKind::Healthy => self.healthy_meals,
            MealKind::Unhealthy => self.unhealthy_meals,
        }
    }

    fn meals_mut(&mut self, kind: MealKind) -> &mut u32 {
        match kind {
            MealKind::Healthy => &mut self.healthy_meals,
            MealKind::Unhealthy => &mut self.unhealthy_meals,
        }
    }

    pub fn water_goal_met(&self) -> bool {
        self.water_glasses >= WATER_GOAL_GLASSES
    }

    pub fn exercise_complete(&self) -> bool {
        !self.exercises_completed.is_empty()
    }

    /// Healthy meals must reach at least one and at least the unhealthy count.
    /// A day with no meals logged is not balanced.
    pub fn meals_balanced(&self) -> bool {
        self.healthy_meals >= self.unhealthy_meals.max(1)
    }
}

/// A single, explicit change to a day's record
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordUpdate {
    SetWater(i64),
    AddWater(i64),
    SetMeals(MealKind, i64),
    AddMeals(MealKind, i64),
    CompleteExercise(String),
}

impl RecordUpdate {
    /// Checks that need no stored state. Runs before the store is touched.
    pub fn validate(&self) -> Result<()> {
        match self {
            RecordUpdate::SetWater(count) => to_count(*count, "water glasses").map(|_| ()),
            RecordUpdate::SetMeals(kind, count) => {
                to_count(*count, &format!("{} meals", kind)).map(|_| ())
            }
            RecordUpdate::AddWater(_) | RecordUpdate::AddMeals(_, _) => Ok(()),
            RecordUpdate::CompleteExercise(id) => {
                if id.trim().is_empty() {
                    Err(Error::InvalidArgument("Exercise id must not be blank".into()))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Apply to `record`, returning whether anything changed.
    ///
    /// On error the record is left untouched.
    pub fn apply_to(&self, record: &mut DailyRecord) -> Result<bool> {
        self.validate()?;
        match self {
            RecordUpdate::SetWater(count) => {
                let count = to_count(*count, "water glasses")?;
                Ok(replace(&mut record.water_glasses, count))
            }
            RecordUpdate::AddWater(delta) => {
                let count = offset(record.water_glasses, *delta, "water glasses")?;
                Ok(replace(&mut record.water_glasses, count))
            }
            RecordUpdate::SetMeals(kind, count) => {
                let count = to_count(*count, &format!("{} meals", kind))?;
                Ok(replace(record.meals_mut(*kind), count))
            }
            RecordUpdate::AddMeals(kind, delta) => {
                let count = offset(record.meals(*kind), *delta, &format!("{} meals", kind))?;
                Ok(replace(record.meals_mut(*kind), count))
            }
            RecordUpdate::CompleteExercise(id) => {
                Ok(record.exercises_completed.insert(id.trim().to_string()))
            }
        }
    }
}

fn to_count(value: i64, what: &str) -> Result<u32> {
    if value < 0 {
        return Err(Error::InvalidArgument(format!(
            "{} must not be negative (got {})",
            what, value
        )));
    }
    u32::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("{} out of range (got {})", what, value)))
}

fn offset(current: u32, delta: i64, what: &str) -> Result<u32> {
    let target = i64::from(current).checked_add(delta).ok_or_else(|| {
        Error::InvalidArgument(format!("{} adjustment overflows (delta {})", what, delta))
    })?;
    to_count(target, what)
}

fn replace(slot: &mut u32, value: u32) -> bool {
    let changed = *slot != value;
    *slot = value;
    changed
}

// ============================================================================
// Derived Views
// ============================================================================

/// Goal flags for one day of the weekly window
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyDay {
    pub date: DateKey,
    pub water_goal_met: bool,
    pub exercise_complete: bool,
    pub meals_balanced: bool,
}

impl WeeklyDay {
    /// Flags for `date`; a missing record sets every flag to false
    pub fn from_record(date: DateKey, record: Option<&DailyRecord>) -> Self {
        match record {
            Some(r) => Self {
                date,
                water_goal_met: r.water_goal_met(),
                exercise_complete: r.exercise_complete(),
                meals_balanced: r.meals_balanced(),
            },
            None => Self {
                date,
                water_goal_met: false,
                exercise_complete: false,
                meals_balanced: false,
            },
        }
    }

    /// How many of the daily tasks were met (0..=3)
    pub fn completed_tasks(&self) -> usize {
        [self.water_goal_met, self.exercise_complete, self.meals_balanced]
            .iter()
            .filter(|met| **met)
            .count()
    }

    pub fn is_fully_completed(&self) -> bool {
        self.completed_tasks() == DAILY_TASKS
    }
}

/// The weekly window plus per-goal tallies
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklySummary {
    pub days: Vec<WeeklyDay>,
    pub water_days: usize,
    pub exercise_days: usize,
    pub balanced_meal_days: usize,
}

/// Current and best run of fully completed days
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StreakState {
    pub current_streak: u32,
    pub best_streak: u32,
}

/// Totals over every retained record
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub days_tracked: usize,
    pub fully_completed_days: usize,
    pub total_exercises_completed: usize,
}

// ============================================================================
// Exercise Catalog Types
// ============================================================================

/// A guided facial exercise
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration_seconds: u32,
    pub steps: Vec<String>,
    pub benefits: Vec<String>,
}

/// The set of exercises a user can complete
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: HashMap<String, Exercise>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DailyRecord {
        DailyRecord::empty(DateKey::parse("2026-01-05").unwrap())
    }

    #[test]
    fn test_meals_balanced_asymmetry() {
        let mut r = record();
        assert!(!r.meals_balanced(), "0/0 must not count as balanced");

        r.healthy_meals = 1;
        assert!(r.meals_balanced());

        r.healthy_meals = 2;
        r.unhealthy_meals = 3;
        assert!(!r.meals_balanced());

        r.healthy_meals = 3;
        assert!(r.meals_balanced());
    }

    #[test]
    fn test_set_rejects_negative_without_touching_record() {
        let mut r = record();
        r.water_glasses = 4;

        let err = RecordUpdate::SetWater(-1).apply_to(&mut r).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(r.water_glasses, 4);
    }

    #[test]
    fn test_set_rejects_values_beyond_u32() {
        let update = RecordUpdate::SetMeals(MealKind::Healthy, i64::from(u32::MAX) + 1);
        assert!(matches!(update.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_add_below_zero_is_rejected() {
        let mut r = record();
        r.unhealthy_meals = 1;

        let result = RecordUpdate::AddMeals(MealKind::Unhealthy, -2).apply_to(&mut r);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(r.unhealthy_meals, 1);

        assert!(RecordUpdate::AddMeals(MealKind::Unhealthy, -1)
            .apply_to(&mut r)
            .unwrap());
        assert_eq!(r.unhealthy_meals, 0);
    }

    #[test]
    fn test_meal_updates_touch_one_counter() {
        let mut r = record();
        RecordUpdate::SetMeals(MealKind::Unhealthy, 5)
            .apply_to(&mut r)
            .unwrap();
        assert_eq!(r.unhealthy_meals, 5);
        assert_eq!(r.healthy_meals, 0);
    }

    #[test]
    fn test_complete_exercise_reports_change_once() {
        let mut r = record();
        let update = RecordUpdate::CompleteExercise("jaw_release".into());
        assert!(update.apply_to(&mut r).unwrap());
        assert!(!update.apply_to(&mut r).unwrap());
        assert_eq!(r.exercises_completed.len(), 1);
    }

    #[test]
    fn test_blank_exercise_id_rejected() {
        assert!(RecordUpdate::CompleteExercise("   ".into()).validate().is_err());
    }

    #[test]
    fn test_meal_kind_parse() {
        assert_eq!("Healthy".parse::<MealKind>().unwrap(), MealKind::Healthy);
        assert_eq!("unhealthy".parse::<MealKind>().unwrap(), MealKind::Unhealthy);
        assert!("snack".parse::<MealKind>().is_err());
    }

    #[test]
    fn test_weekly_day_missing_record_is_all_false() {
        let day = WeeklyDay::from_record(record().date, None);
        assert_eq!(day.completed_tasks(), 0);
        assert!(!day.is_fully_completed());
    }

    #[test]
    fn test_record_deserializes_with_missing_counters() {
        let r: DailyRecord = serde_json::from_str(r#"{"date":"2026-01-05"}"#).unwrap();
        assert_eq!(r, record());
    }
}
