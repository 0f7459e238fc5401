//! Over-time tracker - derived statistics folded in one workout at a time
//!
//! Holds, per exercise:
//! - total volume per session
//! - heaviest weight per rep count per session
//! - the personal best
//!
//! plus global rep and volume totals. The store is persisted on its own and is
//! never recomputed on startup, so every fold must be kept in step with the
//! workout history by the caller.

pub mod series;
pub mod session;
pub mod trend;

pub use series::Series;
pub use session::SessionSummary;
pub use trend::ProgressTrend;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Error as _, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::exercises;
use crate::model::{Number, Workout};

pub const VOLUME_KEY: &str = "Volume";
pub const PERSONAL_BESTS_KEY: &str = "Personal Bests";
pub const STATS_KEY: &str = "Stats";

/// Chartable history of one exercise
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseHistory {
    /// Total reps * weight per session
    pub volume: Series<f64>,
    /// Heaviest weight per session, keyed by exact rep count
    pub by_reps: BTreeMap<u32, Series<f64>>,
}

impl ExerciseHistory {
    pub fn rep_series(&self, reps: u32) -> Option<&Series<f64>> {
        self.by_reps.get(&reps)
    }
}

impl Serialize for ExerciseHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.by_reps.len() + 1))?;
        map.serialize_entry(VOLUME_KEY, &self.volume)?;
        for (reps, series) in &self.by_reps {
            map.serialize_entry(&reps.to_string(), series)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExerciseHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HistoryVisitor;

        impl<'de> Visitor<'de> for HistoryVisitor {
            type Value = ExerciseHistory;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of \"Volume\" and rep counts to series")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<ExerciseHistory, A::Error> {
                let mut history = ExerciseHistory::default();
                while let Some(key) = access.next_key::<String>()? {
                    if key == VOLUME_KEY {
                        history.volume = access.next_value()?;
                        continue;
                    }
                    let reps: u32 = key
                        .parse()
                        .map_err(|_| A::Error::custom(format!("invalid rep count key `{}`", key)))?;
                    history.by_reps.insert(reps, access.next_value()?);
                }
                Ok(history)
            }
        }

        deserializer.deserialize_map(HistoryVisitor)
    }
}

/// Best set ever logged for an exercise, stored as `[reps, weight, date]`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "(u32, f64, String)")]
pub struct PersonalBest {
    pub reps: u32,
    pub weight: f64,
    /// Empty until the first session is recorded
    pub date: String,
}

impl PersonalBest {
    /// Apply a session's heaviest set. Heavier always wins; at equal weight
    /// a rep count greater than or equal to the stored one takes the record
    /// (and its date).
    pub fn consider(&mut self, reps: u32, weight: f64, date: &str) -> bool {
        let promote = weight > self.weight || (weight == self.weight && reps >= self.reps);
        if promote {
            self.reps = reps;
            self.weight = weight;
            self.date = date.to_string();
        }
        promote
    }

    pub fn is_set(&self) -> bool {
        !self.date.is_empty()
    }
}

impl From<(u32, f64, String)> for PersonalBest {
    fn from((reps, weight, date): (u32, f64, String)) -> Self {
        Self { reps, weight, date }
    }
}

impl Serialize for PersonalBest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (self.reps, Number(self.weight), &self.date).serialize(serializer)
    }
}

/// Totals across every exercise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "Total Rep #", default)]
    pub total_reps: u64,
    #[serde(
        rename = "Total Volume",
        default,
        serialize_with = "crate::model::serialize_number"
    )]
    pub total_volume: f64,
    #[serde(rename = "Rep # Per Workout", default)]
    pub reps_per_workout: Series<u64>,
    #[serde(rename = "Volume Per Workout", default)]
    pub volume_per_workout: Series<f64>,
}

/// The aggregate store.
///
/// Serialized as one JSON object whose keys are the exercise names plus
/// `"Personal Bests"` and `"Stats"`. Exercise entries and personal bests are
/// only ever created together by [`AggregateStore::register`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStore {
    exercises: BTreeMap<String, ExerciseHistory>,
    personal_bests: BTreeMap<String, PersonalBest>,
    stats: Stats,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty history and a zero personal best for `name`.
    /// Returns `false` if the exercise was already tracked.
    pub fn register(&mut self, name: &str) -> Result<bool> {
        if self.is_registered(name) {
            return Ok(false);
        }
        exercises::validate_name(name)?;
        self.exercises
            .insert(name.to_string(), ExerciseHistory::default());
        self.personal_bests
            .insert(name.to_string(), PersonalBest::default());
        Ok(true)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.exercises.contains_key(name) && self.personal_bests.contains_key(name)
    }

    /// Fold one completed workout into the store.
    ///
    /// Every exercise in the workout must already be registered; otherwise
    /// nothing is changed and [`Error::UnknownExercise`] is returned.
    pub fn record(&mut self, workout: &Workout) -> Result<()> {
        if let Some(missing) = workout
            .entries
            .exercises()
            .find(|name| !self.is_registered(name))
        {
            return Err(Error::UnknownExercise(missing.to_string()));
        }

        let date = workout.date.as_str();
        let mut session_reps = 0u64;
        let mut session_volume = 0.0;

        for (name, sets) in workout.entries.iter() {
            if sets.is_empty() {
                continue;
            }
            let summary = SessionSummary::from_sets(sets);

            let (Some(history), Some(pb)) = (
                self.exercises.get_mut(name),
                self.personal_bests.get_mut(name),
            ) else {
                return Err(Error::UnknownExercise(name.to_string()));
            };

            history.volume.push(summary.total_volume, date);
            for &(reps, weight) in &summary.best_by_reps {
                history.by_reps.entry(reps).or_default().push(weight, date);
            }

            if let Some((reps, weight)) = summary.heaviest() {
                if pb.consider(reps, weight, date) {
                    debug!(exercise = name, reps, weight, "personal best updated");
                }
            }

            self.stats.total_reps += summary.total_reps;
            self.stats.total_volume += summary.total_volume;
            session_reps += summary.total_reps;
            session_volume += summary.total_volume;
        }

        self.stats.reps_per_workout.push(session_reps, date);
        self.stats.volume_per_workout.push(session_volume, date);

        debug!(
            date,
            template = workout.template_name.as_str(),
            reps = session_reps,
            volume = session_volume,
            "workout recorded"
        );
        Ok(())
    }

    pub fn exercise(&self, name: &str) -> Option<&ExerciseHistory> {
        self.exercises.get(name)
    }

    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    pub fn personal_best(&self, name: &str) -> Option<&PersonalBest> {
        self.personal_bests.get(name)
    }

    pub fn personal_bests(&self) -> &BTreeMap<String, PersonalBest> {
        &self.personal_bests
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

impl Serialize for AggregateStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.exercises.len() + 2))?;
        for (name, history) in &self.exercises {
            map.serialize_entry(name, history)?;
        }
        map.serialize_entry(PERSONAL_BESTS_KEY, &self.personal_bests)?;
        map.serialize_entry(STATS_KEY, &self.stats)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for AggregateStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = AggregateStore;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an over-time tracker document")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<AggregateStore, A::Error> {
                let mut store = AggregateStore::default();
                while let Some(key) = access.next_key::<String>()? {
                    if key == PERSONAL_BESTS_KEY {
                        store.personal_bests = access.next_value()?;
                    } else if key == STATS_KEY {
                        store.stats = access.next_value()?;
                    } else {
                        let history = access.next_value()?;
                        store.exercises.insert(key, history);
                    }
                }

                // Keep the pairing invariant even for hand-edited documents
                for name in store.exercises.keys() {
                    store.personal_bests.entry(name.clone()).or_default();
                }
                for name in store.personal_bests.keys() {
                    store.exercises.entry(name.clone()).or_default();
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(StoreVisitor)
    }
}
