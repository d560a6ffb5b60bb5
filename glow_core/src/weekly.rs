//! Seven-day goal rollup.
//!
//! The window covers the six days before `today` plus `today`, oldest first.
//! Each call reads the store afresh; nothing is cached between calls.

use crate::{DateKey, Error, RecordStore, Result, WeeklyDay, WeeklySummary};

/// Number of days in the rollup window
pub const WINDOW_DAYS: u64 = 7;

/// Goal flags for each day of the window ending at `today`
pub fn weekly_progress<S: RecordStore + ?Sized>(
    store: &S,
    today: DateKey,
) -> Result<Vec<WeeklyDay>> {
    let mut days = Vec::with_capacity(WINDOW_DAYS as usize);

    for offset in (0..WINDOW_DAYS).rev() {
        let date = today.days_back(offset).ok_or_else(|| {
            Error::InvalidArgument(format!("No {}-day window ends at {}", WINDOW_DAYS, today))
        })?;
        let record = store.get(&date)?;
        days.push(WeeklyDay::from_record(date, record.as_ref()));
    }

    tracing::debug!(
        "Weekly window {}..={}: {} fully completed",
        days[0].date,
        today,
        days.iter().filter(|d| d.is_fully_completed()).count()
    );

    Ok(days)
}

/// The weekly window together with how many days met each goal
pub fn weekly_summary<S: RecordStore + ?Sized>(store: &S, today: DateKey) -> Result<WeeklySummary> {
    Ok(summarize(weekly_progress(store, today)?))
}

fn summarize(days: Vec<WeeklyDay>) -> WeeklySummary {
    let water_days = days.iter().filter(|d| d.water_goal_met).count();
    let exercise_days = days.iter().filter(|d| d.exercise_complete).count();
    let balanced_meal_days = days.iter().filter(|d| d.meals_balanced).count();

    WeeklySummary {
        days,
        water_days,
        exercise_days,
        balanced_meal_days,
    }
}
