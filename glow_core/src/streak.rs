//! Streak computation over the full record history.
//!
//! A day counts toward a streak only when all three daily goals were met.
//! Missing days break a streak the same way failed days do.

use crate::{DailyRecord, DateKey, HistorySummary, RecordStore, Result, StreakState, WeeklyDay};
use std::collections::BTreeSet;

/// A named streak length worth celebrating
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Milestone {
    pub days: u32,
    pub reward: &'static str,
}

/// Milestones in ascending order
pub const MILESTONES: [Milestone; 4] = [
    Milestone { days: 3, reward: "Early Bird" },
    Milestone { days: 7, reward: "Weekly Warrior" },
    Milestone { days: 14, reward: "Consistency Champion" },
    Milestone { days: 30, reward: "Glow Master" },
];

impl Milestone {
    /// Highest milestone already reached by `streak`
    pub fn current_for(streak: u32) -> Option<&'static Milestone> {
        MILESTONES.iter().rev().find(|m| m.days <= streak)
    }

    /// Lowest milestone still ahead of `streak`
    pub fn next_for(streak: u32) -> Option<&'static Milestone> {
        MILESTONES.iter().find(|m| m.days > streak)
    }

    pub fn days_to_go(&self, streak: u32) -> u32 {
        self.days.saturating_sub(streak)
    }
}

fn is_fully_completed(record: &DailyRecord) -> bool {
    WeeklyDay::from_record(record.date, Some(record)).is_fully_completed()
}

/// Current and best streaks as of `today`.
///
/// Today only extends the current streak once it is fully completed; until
/// then the streak ending yesterday is reported. Records dated after `today`
/// are ignored.
pub fn compute_streaks(records: &[DailyRecord], today: DateKey) -> StreakState {
    let completed: BTreeSet<DateKey> = records
        .iter()
        .filter(|r| r.date <= today && is_fully_completed(r))
        .map(|r| r.date)
        .collect();

    let mut best = 0u32;
    let mut run = 0u32;
    let mut previous: Option<DateKey> = None;
    for date in &completed {
        run = match previous.and_then(|p| p.succ()) {
            Some(expected) if expected == *date => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(*date);
    }

    let mut current = 0u32;
    let mut cursor = if completed.contains(&today) {
        Some(today)
    } else {
        today.pred()
    };
    while let Some(date) = cursor {
        if !completed.contains(&date) {
            break;
        }
        current += 1;
        cursor = date.pred();
    }

    StreakState {
        current_streak: current,
        best_streak: best,
    }
}

/// Streaks over everything in `store`
pub fn streak_state<S: RecordStore + ?Sized>(store: &S, today: DateKey) -> Result<StreakState> {
    let records = store.list()?;
    let state = compute_streaks(&records, today);
    tracing::debug!(
        "Streaks as of {}: current {}, best {} ({} records)",
        today,
        state.current_streak,
        state.best_streak,
        records.len()
    );
    Ok(state)
}

/// Lifetime totals as of `today`; like streaks, records dated later are ignored
pub fn history_summary(records: &[DailyRecord], today: DateKey) -> HistorySummary {
    let tracked: Vec<&DailyRecord> = records.iter().filter(|r| r.date <= today).collect();
    HistorySummary {
        days_tracked: tracked.len(),
        fully_completed_days: tracked.iter().filter(|r| is_fully_completed(r)).count(),
        total_exercises_completed: tracked.iter().map(|r| r.exercises_completed.len()).sum(),
    }
}
