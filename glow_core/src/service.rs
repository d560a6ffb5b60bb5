//! Business logic over daily records.
//!
//! [`DailyRecordService`] is the only component that mutates records. Every
//! mutation targets the day that was current when the call started and runs
//! as a read-modify-write under a per-day lock, first in-process and then
//! through [`RecordStore::update`], so concurrent updates to the same day
//! never overwrite each other's fields.

use crate::streak::{history_summary, streak_state};
use crate::weekly::{weekly_progress, weekly_summary};
use crate::{
    Clock, DailyRecord, DateKey, Error, HistorySummary, MealKind, RecordStore, RecordUpdate,
    Result, StreakState, WeeklyDay, WeeklySummary,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Reads and mutates daily records through an injected store and clock
pub struct DailyRecordService<S, C> {
    store: S,
    clock: C,
    day_locks: Mutex<HashMap<DateKey, Arc<Mutex<()>>>>,
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<S: RecordStore, C: Clock> DailyRecordService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            day_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Date key of the current local day
    pub fn today(&self) -> DateKey {
        self.clock.today()
    }

    /// Today's record, or a zero record if nothing was logged yet.
    ///
    /// The zero record is not persisted.
    pub fn get_today(&self) -> Result<DailyRecord> {
        let key = self.today();
        Ok(self
            .store
            .get(&key)?
            .unwrap_or_else(|| DailyRecord::empty(key)))
    }

    /// The stored record for `key`; fails with `NotFound` if the day was never written
    pub fn get_record(&self, key: &DateKey) -> Result<DailyRecord> {
        self.store
            .get(key)?
            .ok_or_else(|| Error::NotFound(format!("No record for {}", key)))
    }

    pub fn set_water_glasses(&self, count: i64) -> Result<DailyRecord> {
        self.apply(RecordUpdate::SetWater(count))
    }

    pub fn add_water_glasses(&self, delta: i64) -> Result<DailyRecord> {
        self.apply(RecordUpdate::AddWater(delta))
    }

    pub fn set_meal_count(&self, kind: MealKind, count: i64) -> Result<DailyRecord> {
        self.apply(RecordUpdate::SetMeals(kind, count))
    }

    pub fn add_meal_count(&self, kind: MealKind, delta: i64) -> Result<DailyRecord> {
        self.apply(RecordUpdate::AddMeals(kind, delta))
    }

    /// Register an exercise as done today. Repeating it changes nothing.
    pub fn complete_exercise(&self, exercise_id: &str) -> Result<DailyRecord> {
        self.apply(RecordUpdate::CompleteExercise(exercise_id.to_string()))
    }

    /// Apply one typed update to today's record and return the result
    pub fn apply(&self, update: RecordUpdate) -> Result<DailyRecord> {
        let key = self.today();
        update.validate()?;

        let day_lock = self.day_lock(&key);
        let _guard = lock_ignoring_poison(&day_lock);

        let mut outcome = None;
        self.store.update(&key, &mut |existing| {
            let materialize = existing.is_none();
            let mut record = existing.unwrap_or_else(|| DailyRecord::empty(key));
            let write = update.apply_to(&mut record)? || materialize;
            outcome = Some((record.clone(), materialize, write));
            Ok(write.then_some(record))
        })?;

        let (record, materialize, written) = outcome
            .ok_or_else(|| Error::Storage(format!("Store skipped update of {}", key)))?;
        if !written {
            tracing::debug!("{:?} left record {} unchanged", update, key);
        } else if materialize {
            tracing::info!("Created record for {} via {:?}", key, update);
        } else {
            tracing::info!("Updated record {} via {:?}", key, update);
        }

        Ok(record)
    }

    /// Mutex serializing writers of one day.
    ///
    /// Entries for other days are dropped once no caller holds them.
    fn day_lock(&self, key: &DateKey) -> Arc<Mutex<()>> {
        let mut locks = lock_ignoring_poison(&self.day_locks);
        locks.retain(|day, lock| day == key || Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(*key).or_default())
    }

    pub fn weekly_progress(&self) -> Result<Vec<WeeklyDay>> {
        weekly_progress(&self.store, self.today())
    }

    pub fn weekly_summary(&self) -> Result<WeeklySummary> {
        weekly_summary(&self.store, self.today())
    }

    pub fn streak_state(&self) -> Result<StreakState> {
        streak_state(&self.store, self.today())
    }

    /// Every retained record, oldest first
    pub fn history(&self) -> Result<Vec<DailyRecord>> {
        self.store.list()
    }

    pub fn history_summary(&self) -> Result<HistorySummary> {
        Ok(history_summary(&self.store.list()?, self.today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedClock, MemoryStore};
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn clock(date: &str) -> FixedClock {
        FixedClock::at_date(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap())
    }

    fn service() -> DailyRecordService<Arc<MemoryStore>, FixedClock> {
        DailyRecordService::new(Arc::new(MemoryStore::new()), clock("2026-01-05"))
    }

    /// Store double that can be told to fail and counts writes
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_puts: AtomicBool,
        fail_gets: AtomicBool,
        puts: AtomicUsize,
    }

    impl RecordStore for FlakyStore {
        fn get(&self, key: &DateKey) -> Result<Option<DailyRecord>> {
            if self.fail_gets.load(Ordering::SeqCst) {
                return Err(Error::Storage("backend offline".into()));
            }
            self.inner.get(key)
        }

        fn put(&self, key: &DateKey, record: &DailyRecord) -> Result<()> {
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(Error::Storage("disk full".into()));
            }
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put(key, record)
        }

        fn list(&self) -> Result<Vec<DailyRecord>> {
            self.inner.list()
        }
    }

    #[test]
    fn test_get_today_defaults_without_materializing() {
        let svc = service();
        let today = svc.get_today().unwrap();

        assert_eq!(today, DailyRecord::empty(svc.today()));
        assert_eq!(today.date.to_string(), "2026-01-05");
        assert!(svc.store().get(&svc.today()).unwrap().is_none());
    }

    #[test]
    fn test_first_mutation_materializes() {
        let svc = service();
        let record = svc.set_water_glasses(3).unwrap();

        assert_eq!(record.water_glasses, 3);
        assert_eq!(svc.store().get(&svc.today()).unwrap(), Some(record));
    }

    #[test]
    fn test_setting_zero_on_missing_day_still_materializes() {
        let svc = service();
        svc.set_meal_count(MealKind::Unhealthy, 0).unwrap();
        assert!(svc.store().get(&svc.today()).unwrap().is_some());
    }

    #[test]
    fn test_counters_are_independent() {
        let svc = service();
        svc.set_water_glasses(5).unwrap();
        let record = svc.set_meal_count(MealKind::Healthy, 3).unwrap();

        assert_eq!(record.water_glasses, 5);
        assert_eq!(record.healthy_meals, 3);
        assert_eq!(record.unhealthy_meals, 0);

        let record = svc.set_meal_count(MealKind::Unhealthy, 7).unwrap();
        assert_eq!(record.healthy_meals, 3, "no clamping between meal counters");
    }

    #[test]
    fn test_no_upper_bound_on_water() {
        let svc = service();
        assert_eq!(svc.set_water_glasses(25).unwrap().water_glasses, 25);
    }

    #[test]
    fn test_complete_exercise_idempotent() {
        let store = Arc::new(FlakyStore::default());
        let svc = DailyRecordService::new(Arc::clone(&store), clock("2026-01-05"));

        svc.set_water_glasses(4).unwrap();
        let first = svc.complete_exercise("cheek_lift").unwrap();
        let second = svc.complete_exercise("cheek_lift").unwrap();

        assert_eq!(first, second);
        assert_eq!(second.exercises_completed.len(), 1);
        assert_eq!(second.water_glasses, 4);
        assert_eq!(store.puts.load(Ordering::SeqCst), 2, "repeat must not write");
    }

    #[test]
    fn test_completion_order_does_not_matter() {
        let a = service();
        a.complete_exercise("x").unwrap();
        a.complete_exercise("y").unwrap();

        let b = service();
        b.complete_exercise("y").unwrap();
        b.complete_exercise("x").unwrap();

        assert_eq!(a.get_today().unwrap(), b.get_today().unwrap());
    }

    #[test]
    fn test_negative_count_rejected_before_store_access() {
        let store = Arc::new(FlakyStore::default());
        store.fail_gets.store(true, Ordering::SeqCst);
        let svc = DailyRecordService::new(Arc::clone(&store), clock("2026-01-05"));

        // Would be a storage error if the store had been reached
        let err = svc.set_water_glasses(-1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = svc.set_meal_count(MealKind::Healthy, -3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_failed_put_leaves_prior_record() {
        let store = Arc::new(FlakyStore::default());
        let svc = DailyRecordService::new(Arc::clone(&store), clock("2026-01-05"));
        let before = svc.set_water_glasses(4).unwrap();

        store.fail_puts.store(true, Ordering::SeqCst);
        let err = svc.set_water_glasses(6).unwrap_err();
        assert!(err.is_storage());

        store.fail_puts.store(false, Ordering::SeqCst);
        assert_eq!(svc.get_today().unwrap(), before);
    }

    #[test]
    fn test_storage_error_propagates_unchanged() {
        let store = Arc::new(FlakyStore::default());
        store.fail_gets.store(true, Ordering::SeqCst);
        let svc = DailyRecordService::new(Arc::clone(&store), clock("2026-01-05"));

        match svc.get_today() {
            Err(Error::Storage(msg)) => assert_eq!(msg, "backend offline"),
            other => panic!("expected storage error, got {:?}", other),
        }
    }

    #[test]
    fn test_get_record_not_found_only_on_explicit_lookup() {
        let svc = service();
        let err = svc.get_record(&svc.today()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        svc.complete_exercise("jaw_release").unwrap();
        assert!(svc.get_record(&svc.today()).is_ok());
    }

    #[test]
    fn test_add_water_accumulates() {
        let svc = service();
        svc.add_water_glasses(2).unwrap();
        svc.add_water_glasses(3).unwrap();
        assert_eq!(svc.get_today().unwrap().water_glasses, 5);

        assert!(svc.add_water_glasses(-6).is_err());
        assert_eq!(svc.add_water_glasses(-5).unwrap().water_glasses, 0);
    }

    #[test]
    fn test_new_day_starts_from_zero() {
        let clock = Arc::new(clock("2026-01-05"));
        let svc = DailyRecordService::new(MemoryStore::new(), Arc::clone(&clock));
        svc.set_water_glasses(8).unwrap();

        clock.advance(Duration::days(1));
        assert_eq!(svc.get_today().unwrap().water_glasses, 0);
        svc.set_water_glasses(1).unwrap();

        let history = svc.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].water_glasses, 8, "past day untouched");
    }

    /// Store that moves the clock past midnight while a mutation is in flight
    struct MidnightStore {
        inner: MemoryStore,
        clock: Arc<FixedClock>,
    }

    impl RecordStore for MidnightStore {
        fn get(&self, key: &DateKey) -> Result<Option<DailyRecord>> {
            self.clock.advance(Duration::minutes(2));
            self.inner.get(key)
        }

        fn put(&self, key: &DateKey, record: &DailyRecord) -> Result<()> {
            self.inner.put(key, record)
        }

        fn list(&self) -> Result<Vec<DailyRecord>> {
            self.inner.list()
        }
    }

    #[test]
    fn test_mutation_straddling_midnight_uses_start_day() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let clock = Arc::new(FixedClock::new(
            tz.with_ymd_and_hms(2026, 1, 5, 23, 59, 0).unwrap(),
        ));
        let store = Arc::new(MidnightStore {
            inner: MemoryStore::new(),
            clock: Arc::clone(&clock),
        });
        let svc = DailyRecordService::new(Arc::clone(&store), Arc::clone(&clock));

        let record = svc.set_water_glasses(2).unwrap();

        assert_eq!(record.date.to_string(), "2026-01-05");
        assert_eq!(clock.today().to_string(), "2026-01-06");
        let stored = store.inner.list().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].date.to_string(), "2026-01-05");
    }

    #[test]
    fn test_day_one_scenario() {
        crate::logging::init_test();
        let svc = service();
        svc.set_water_glasses(8).unwrap();
        svc.complete_exercise("e1").unwrap();
        svc.set_meal_count(MealKind::Healthy, 2).unwrap();
        svc.set_meal_count(MealKind::Unhealthy, 0).unwrap();

        let week = svc.weekly_progress().unwrap();
        let today = week.last().unwrap();
        assert!(today.water_goal_met);
        assert!(today.exercise_complete);
        assert!(today.meals_balanced);

        assert_eq!(svc.streak_state().unwrap().current_streak, 1);
    }

    #[test]
    fn test_weekly_sees_mutation_without_caching() {
        let svc = service();
        assert!(!svc.weekly_progress().unwrap()[6].water_goal_met);

        svc.set_water_glasses(8).unwrap();
        assert!(svc.weekly_progress().unwrap()[6].water_goal_met);
    }

    #[test]
    fn test_day_locks_do_not_accumulate() {
        let clock = Arc::new(clock("2026-01-05"));
        let svc = DailyRecordService::new(MemoryStore::new(), Arc::clone(&clock));
        for _ in 0..10 {
            svc.set_water_glasses(1).unwrap();
            clock.advance(Duration::days(1));
        }
        assert_eq!(lock_ignoring_poison(&svc.day_locks).len(), 1);
    }
}
