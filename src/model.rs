//! Entity model - training blocks, templates and logged workouts

use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::exercises::Catalog;

/// Date format used on workouts, e.g. "June 1, 2024"
pub const DISPLAY_DATE_FORMAT: &str = "%B %-d, %Y";
/// Date format used for block start dates, e.g. "06-01-2024"
pub const BLOCK_DATE_FORMAT: &str = "%m-%d-%Y";

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parse a workout date. Day may be zero-padded or not.
pub fn parse_display_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%B %d, %Y").ok()
}

pub fn parse_block_date(s: &str) -> crate::error::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), BLOCK_DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Weight or volume as written to the documents: whole numbers as integers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number(pub f64);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(&self.0, serializer)
    }
}

pub fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// One performed set
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(u32, f64)")]
pub struct SetEntry {
    pub reps: u32,
    pub weight: f64,
}

impl SetEntry {
    pub fn new(reps: u32, weight: f64) -> Self {
        Self { reps, weight }
    }

    /// Weight moved by this set (reps * weight)
    pub fn volume(&self) -> f64 {
        self.reps as f64 * self.weight
    }
}

impl From<(u32, f64)> for SetEntry {
    fn from((reps, weight): (u32, f64)) -> Self {
        Self { reps, weight }
    }
}

impl Serialize for SetEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.reps, Number(self.weight)).serialize(serializer)
    }
}

/// Exercise -> sets, in the order exercises were entered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entries(Vec<(String, Vec<SetEntry>)>);

impl Entries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sets for `exercise`, replacing any earlier entry in place
    pub fn insert(&mut self, exercise: impl Into<String>, sets: Vec<SetEntry>) {
        let exercise = exercise.into();
        match self.0.iter_mut().find(|(name, _)| *name == exercise) {
            Some((_, existing)) => *existing = sets,
            None => self.0.push((exercise, sets)),
        }
    }

    /// Append one set, creating the exercise entry if needed
    pub fn push_set(&mut self, exercise: &str, set: SetEntry) {
        match self.0.iter_mut().find(|(name, _)| name == exercise) {
            Some((_, sets)) => sets.push(set),
            None => self.0.push((exercise.to_string(), vec![set])),
        }
    }

    pub fn get(&self, exercise: &str) -> Option<&[SetEntry]> {
        self.0
            .iter()
            .find(|(name, _)| name == exercise)
            .map(|(_, sets)| sets.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SetEntry])> {
        self.0
            .iter()
            .map(|(name, sets)| (name.as_str(), sets.as_slice()))
    }

    pub fn exercises(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Entries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, sets) in &self.0 {
            map.serialize_entry(name, sets)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of exercise name to [reps, weight] sets")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Entries, A::Error> {
                let mut entries = Entries::new();
                while let Some((name, sets)) = access.next_entry::<String, Vec<SetEntry>>()? {
                    entries.insert(name, sets);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// A single logged session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub date: String,
    pub template_name: String,
    pub entries: Entries,
}

impl Workout {
    pub fn new(template_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            date: format_display_date(date),
            template_name: template_name.into(),
            entries: Entries::new(),
        }
    }

    pub fn with_entries(mut self, entries: Entries) -> Self {
        self.entries = entries;
        self
    }

    pub fn total_reps(&self) -> u64 {
        self.entries
            .iter()
            .flat_map(|(_, sets)| sets)
            .map(|s| s.reps as u64)
            .sum()
    }

    pub fn total_volume(&self) -> f64 {
        self.entries
            .iter()
            .flat_map(|(_, sets)| sets)
            .map(SetEntry::volume)
            .sum()
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - Workout: {}", self.date, self.template_name)?;
        for (name, sets) in self.entries.iter() {
            writeln!(f)?;
            writeln!(f, "{}", name)?;
            for set in sets {
                writeln!(f, "       - {} x {} lbs", set.reps, set.weight)?;
            }
        }
        write!(f, "{:-<60}", "")
    }
}

/// Named exercise list for one weekly workout slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub name: String,
    pub exercises: Vec<String>,
}

impl WorkoutTemplate {
    pub fn new(name: impl Into<String>, exercises: Vec<String>) -> Self {
        Self {
            name: name.into(),
            exercises,
        }
    }
}

impl fmt::Display for WorkoutTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.exercises.join(", "))
    }
}

/// Multi-week program: a start date, a weekly slot count, templates and the workouts logged under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingBlock {
    pub starting_date: String,
    pub workouts_per_week: u32,
    #[serde(default)]
    pub workouts: Vec<Workout>,
    #[serde(default)]
    pub templates: Vec<WorkoutTemplate>,
}

impl TrainingBlock {
    pub fn new(starting_date: NaiveDate, workouts_per_week: u32) -> Self {
        Self {
            starting_date: starting_date.format(BLOCK_DATE_FORMAT).to_string(),
            workouts_per_week,
            workouts: Vec::new(),
            templates: Vec::new(),
        }
    }

    pub fn add_workout(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    pub fn add_template(&mut self, name: impl Into<String>, exercises: Vec<String>) {
        self.templates.push(WorkoutTemplate::new(name, exercises));
    }

    pub fn template(&self, name: &str) -> Option<&WorkoutTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }
}

/// Workout history document: the exercise catalog plus every training block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutHistory {
    #[serde(default)]
    pub all_exercises: Catalog,
    #[serde(default)]
    pub training_blocks: Vec<TrainingBlock>,
}

impl WorkoutHistory {
    /// Every workout of every block, in block then logging order
    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.training_blocks.iter().flat_map(|b| b.workouts.iter())
    }
}

/// Parse a command-line set like `Squat:5x200`
pub fn parse_set_arg(arg: &str) -> crate::error::Result<(String, SetEntry)> {
    let invalid = || Error::InvalidSet(arg.to_string());

    let (exercise, set) = arg.rsplit_once(':').ok_or_else(invalid)?;
    let exercise = exercise.trim();
    if exercise.is_empty() {
        return Err(invalid());
    }

    let (reps, weight) = set
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(invalid)?;
    let reps: u32 = reps.trim().parse().map_err(|_| invalid())?;
    let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;

    if reps == 0 || !weight.is_finite() || weight < 0.0 {
        return Err(invalid());
    }

    Ok((exercise.to_string(), SetEntry::new(reps, weight)))
}
