//! Workout manager - owns the history, the tracker and their storage
//!
//! Every mutation goes through [`WorkoutManager::transaction`]: it works on
//! copies of both documents, writes both to disk, and only then makes the
//! copies current. A failed step leaves the manager exactly as it was.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::exercises::Catalog;
use crate::model::{TrainingBlock, Workout, WorkoutHistory};
use crate::tracker::AggregateStore;

/// Outcome of registering an exercise name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    AlreadyExists,
}

pub struct WorkoutManager {
    db: Database,
    history: WorkoutHistory,
    tracker: AggregateStore,
}

impl WorkoutManager {
    /// Load both documents. Aggregates are taken as stored, never recomputed.
    pub fn open(db: Database) -> Result<Self> {
        let (history, tracker) = load(&db)?;
        Ok(Self {
            db,
            history,
            tracker,
        })
    }

    /// Re-read both documents from disk
    pub fn reload(&mut self) -> Result<()> {
        let (history, tracker) = load(&self.db)?;
        self.history = history;
        self.tracker = tracker;
        Ok(())
    }

    fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut WorkoutHistory, &mut AggregateStore) -> Result<T>,
    ) -> Result<T> {
        let mut history = self.history.clone();
        let mut tracker = self.tracker.clone();

        let out = f(&mut history, &mut tracker)?;
        self.db.commit(&history, &tracker)?;

        self.history = history;
        self.tracker = tracker;
        Ok(out)
    }

    /// Add a new training block, returning its index
    pub fn add_training_block(
        &mut self,
        starting_date: NaiveDate,
        workouts_per_week: u32,
    ) -> Result<usize> {
        if workouts_per_week == 0 {
            return Err(Error::InvalidWorkoutsPerWeek);
        }
        let idx = self.transaction(|history, _| {
            history
                .training_blocks
                .push(TrainingBlock::new(starting_date, workouts_per_week));
            Ok(history.training_blocks.len() - 1)
        })?;
        info!(block = idx + 1, %starting_date, workouts_per_week, "training block added");
        Ok(idx)
    }

    /// Add a workout template to a block. Its exercises are registered if new.
    pub fn add_template(
        &mut self,
        block_idx: usize,
        name: &str,
        exercises: Vec<String>,
    ) -> Result<()> {
        self.transaction(|history, tracker| {
            if block_idx >= history.training_blocks.len() {
                return Err(Error::UnknownBlock(block_idx + 1));
            }
            for exercise in &exercises {
                register(history, tracker, exercise)?;
            }
            history.training_blocks[block_idx].add_template(name, exercises);
            Ok(())
        })?;
        info!(block = block_idx + 1, template = name, "template added");
        Ok(())
    }

    /// Register a new exercise name in the catalog and the tracker
    pub fn add_exercise(&mut self, name: &str) -> Result<Registration> {
        if self.history.all_exercises.contains(name) && self.tracker.is_registered(name) {
            info!(exercise = name, "exercise already exists");
            return Ok(Registration::AlreadyExists);
        }
        self.transaction(|history, tracker| register(history, tracker, name))
    }

    /// Log a completed workout under a block and fold it into the tracker.
    ///
    /// Any exercise the workout mentions is registered first.
    pub fn log_workout(&mut self, block_idx: usize, workout: Workout) -> Result<()> {
        let date = workout.date.clone();
        self.transaction(|history, tracker| {
            if block_idx >= history.training_blocks.len() {
                return Err(Error::UnknownBlock(block_idx + 1));
            }
            for exercise in workout.entries.exercises() {
                register(history, tracker, exercise)?;
            }
            tracker.record(&workout)?;
            history.training_blocks[block_idx].add_workout(workout);
            Ok(())
        })?;
        info!(block = block_idx + 1, date = date.as_str(), "workout logged");
        Ok(())
    }

    /// Recompute the tracker from scratch out of the full workout history
    pub fn rebuild_tracker(&mut self) -> Result<()> {
        let workouts = self.transaction(|history, tracker| {
            *tracker = AggregateStore::new();
            for name in history.all_exercises.iter() {
                tracker.register(name)?;
            }

            let mut count = 0usize;
            for block in &history.training_blocks {
                for workout in &block.workouts {
                    for name in workout.entries.exercises() {
                        history.all_exercises.insert(name)?;
                        tracker.register(name)?;
                    }
                    tracker.record(workout)?;
                    count += 1;
                }
            }
            Ok(count)
        })?;
        info!(workouts, "tracker rebuilt from history");
        Ok(())
    }

    pub fn exercises(&self) -> &Catalog {
        &self.history.all_exercises
    }

    pub fn training_blocks(&self) -> &[TrainingBlock] {
        &self.history.training_blocks
    }

    pub fn block(&self, idx: usize) -> Result<&TrainingBlock> {
        self.history
            .training_blocks
            .get(idx)
            .ok_or(Error::UnknownBlock(idx + 1))
    }

    pub fn history(&self) -> &WorkoutHistory {
        &self.history
    }

    pub fn tracker(&self) -> &AggregateStore {
        &self.tracker
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn load(db: &Database) -> Result<(WorkoutHistory, AggregateStore)> {
    let history = db.load_history()?;
    let mut tracker = db.load_tracker()?;

    // A lost tracker document would otherwise leave known exercises unfoldable
    for name in history.all_exercises.iter() {
        match tracker.register(name) {
            Ok(true) => {
                warn!(exercise = name, "tracker had no entry for catalog exercise, added an empty one")
            }
            Ok(false) => {}
            Err(e) => warn!(exercise = name, error = %e, "skipping unusable catalog exercise"),
        }
    }

    info!(
        dir = %db.dir().display(),
        exercises = history.all_exercises.len(),
        blocks = history.training_blocks.len(),
        "data loaded"
    );
    Ok((history, tracker))
}

fn register(
    history: &mut WorkoutHistory,
    tracker: &mut AggregateStore,
    name: &str,
) -> Result<Registration> {
    let added_to_catalog = history.all_exercises.insert(name)?;
    let added_to_tracker = tracker.register(name)?;
    if added_to_catalog || added_to_tracker {
        info!(exercise = name, "exercise registered");
        Ok(Registration::Added)
    } else {
        Ok(Registration::AlreadyExists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LoadPolicy;
    use crate::model::{Entries, SetEntry};
    use crate::tracker::PersonalBest;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn open(dir: &TempDir) -> WorkoutManager {
        let db = Database::open(dir.path(), LoadPolicy::Recover).unwrap();
        WorkoutManager::open(db).unwrap()
    }

    fn squat_workout(day: u32, sets: &[(u32, f64)]) -> Workout {
        let mut entries = Entries::new();
        entries.insert(
            "Squat",
            sets.iter().map(|&(r, w)| SetEntry::new(r, w)).collect(),
        );
        Workout::new("Leg Day", june(day)).with_entries(entries)
    }

    #[test]
    fn test_add_exercise_on_empty_catalog() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);

        assert_eq!(manager.add_exercise("Bench Press").unwrap(), Registration::Added);
        assert_eq!(manager.exercises().names(), &["Bench Press".to_string()]);
        assert!(manager.tracker().is_registered("Bench Press"));
    }

    #[test]
    fn test_add_exercise_twice() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);
        manager.add_exercise("Bench Press").unwrap();
        let tracker = manager.tracker().clone();

        assert_eq!(
            manager.add_exercise("Bench Press").unwrap(),
            Registration::AlreadyExists
        );
        assert_eq!(manager.exercises().len(), 1);
        assert_eq!(manager.tracker(), &tracker);
    }

    #[test]
    fn test_add_exercise_persists() {
        let dir = tempdir().unwrap();
        open(&dir).add_exercise("Deadlift").unwrap();

        let manager = open(&dir);
        assert!(manager.exercises().contains("Deadlift"));
        assert!(manager.tracker().is_registered("Deadlift"));
    }

    #[test]
    fn test_blocks_and_templates() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);

        let idx = manager.add_training_block(june(1), 3).unwrap();
        assert_eq!(idx, 0);
        manager
            .add_template(idx, "Leg Day", vec!["Squat".into(), "Leg Press".into()])
            .unwrap();

        let block = manager.block(0).unwrap();
        assert_eq!(block.starting_date, "06-01-2024");
        assert_eq!(block.template("Leg Day").unwrap().exercises.len(), 2);
        assert!(manager.exercises().contains("Leg Press"));
        assert!(manager.tracker().is_registered("Squat"));
    }

    #[test]
    fn test_rejects_zero_workouts_per_week() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);
        assert!(matches!(
            manager.add_training_block(june(1), 0),
            Err(Error::InvalidWorkoutsPerWeek)
        ));
        assert!(manager.training_blocks().is_empty());
    }

    #[test]
    fn test_unknown_block_changes_nothing() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);

        let result = manager.log_workout(2, squat_workout(1, &[(5, 200.0)]));
        assert!(matches!(result, Err(Error::UnknownBlock(3))));
        assert!(manager.exercises().is_empty());
        assert_eq!(manager.tracker(), &AggregateStore::default());
    }

    #[test]
    fn test_log_workout_end_to_end() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);
        manager.add_exercise("Squat").unwrap();
        let block = manager.add_training_block(june(1), 3).unwrap();

        manager
            .log_workout(block, squat_workout(1, &[(5, 200.0), (5, 205.0), (3, 225.0)]))
            .unwrap();

        let squat = manager.tracker().exercise("Squat").unwrap();
        assert_eq!(squat.volume.values(), &[2700.0]);
        assert_eq!(squat.rep_series(5).unwrap().values(), &[205.0]);
        assert_eq!(squat.rep_series(3).unwrap().values(), &[225.0]);
        assert_eq!(
            manager.tracker().personal_best("Squat"),
            Some(&PersonalBest {
                reps: 3,
                weight: 225.0,
                date: "June 1, 2024".into(),
            })
        );

        manager
            .log_workout(block, squat_workout(8, &[(5, 225.0)]))
            .unwrap();
        let pb = manager.tracker().personal_best("Squat").unwrap();
        assert_eq!((pb.reps, pb.weight, pb.date.as_str()), (5, 225.0, "June 8, 2024"));

        // both documents reflect both workouts after a restart
        let reopened = open(&dir);
        assert_eq!(reopened.block(0).unwrap().workouts.len(), 2);
        assert_eq!(reopened.tracker(), manager.tracker());
        assert_eq!(reopened.history(), manager.history());
    }

    #[test]
    fn test_log_workout_registers_new_exercises() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);
        let block = manager.add_training_block(june(1), 2).unwrap();

        manager
            .log_workout(block, squat_workout(1, &[(5, 200.0)]))
            .unwrap();

        assert!(manager.exercises().contains("Squat"));
        assert_eq!(manager.tracker().stats().total_reps, 5);
    }

    #[test]
    fn test_failed_commit_keeps_memory_state() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);
        let block = manager.add_training_block(june(1), 2).unwrap();
        let before_history = manager.history().clone();
        let before_tracker = manager.tracker().clone();

        // a directory where the temp file should go makes the write fail
        fs::create_dir(manager.database().tracker_path().with_extension("tmp")).unwrap();

        let result = manager.log_workout(block, squat_workout(1, &[(5, 200.0)]));
        assert!(matches!(result, Err(Error::Io { .. })));
        assert_eq!(manager.history(), &before_history);
        assert_eq!(manager.tracker(), &before_tracker);
        assert!(!manager.database().history_path().with_extension("tmp").exists());
    }

    #[test]
    fn test_open_fills_missing_tracker_entries() {
        let dir = tempdir().unwrap();
        {
            let mut manager = open(&dir);
            manager.add_exercise("Squat").unwrap();
            fs::write(manager.database().tracker_path(), "not json").unwrap();
        }

        let manager = open(&dir);
        assert!(manager.tracker().is_registered("Squat"));
        assert!(manager.tracker().exercise("Squat").unwrap().volume.is_empty());
    }

    #[test]
    fn test_open_tolerates_legacy_catalog_names() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path(), LoadPolicy::Recover).unwrap();
        fs::write(
            db.history_path(),
            r#"{"all_exercises": ["", "Squat", "Stats"], "training_blocks": []}"#,
        )
        .unwrap();
        fs::write(
            db.tracker_path(),
            r#"{
                "": {"Volume": [[], []]},
                "Squat": {"Volume": [[], []]},
                "Personal Bests": {"": [0, 0, ""], "Squat": [0, 0, ""]},
                "Stats": {}
            }"#,
        )
        .unwrap();

        let mut manager = WorkoutManager::open(db).unwrap();
        assert!(manager.exercises().contains(""));
        assert!(manager.tracker().is_registered(""));
        assert!(manager.tracker().is_registered("Squat"));
        assert!(manager.tracker().exercise("Stats").is_none());

        let block = manager.add_training_block(june(1), 3).unwrap();
        manager
            .log_workout(block, squat_workout(1, &[(5, 200.0)]))
            .unwrap();
        assert_eq!(manager.tracker().stats().total_reps, 5);
    }

    #[test]
    fn test_rebuild_tracker_matches_incremental() {
        let dir = tempdir().unwrap();
        let mut manager = open(&dir);
        let block = manager.add_training_block(june(1), 3).unwrap();
        manager.add_exercise("Bench Press").unwrap();
        manager
            .log_workout(block, squat_workout(1, &[(5, 200.0), (3, 225.0)]))
            .unwrap();
        manager
            .log_workout(block, squat_workout(3, &[(5, 210.0)]))
            .unwrap();
        let incremental = manager.tracker().clone();

        fs::write(manager.database().tracker_path(), "{").unwrap();
        manager.reload().unwrap();
        assert!(manager.tracker().exercise("Squat").unwrap().volume.is_empty());

        manager.rebuild_tracker().unwrap();
        assert_eq!(manager.tracker(), &incremental);
    }

    #[test]
    fn test_reload_picks_up_disk_changes() {
        let dir = tempdir().unwrap();
        let mut first = open(&dir);
        let mut second = open(&dir);

        second.add_exercise("Row").unwrap();
        assert!(!first.exercises().contains("Row"));

        first.reload().unwrap();
        assert!(first.exercises().contains("Row"));
    }
}
