//! Per-session reduction of one exercise's sets

use crate::model::SetEntry;

/// What one session contributed for a single exercise
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Heaviest weight per distinct rep count, in first-seen rep order
    pub best_by_reps: Vec<(u32, f64)>,
    /// Sum of reps over every set
    pub total_reps: u64,
    /// Sum of reps * weight over every set
    pub total_volume: f64,
}

impl SessionSummary {
    pub fn from_sets(sets: &[SetEntry]) -> Self {
        let mut best_by_reps: Vec<(u32, f64)> = Vec::new();
        let mut total_reps = 0u64;
        let mut total_volume = 0.0;

        for set in sets {
            total_reps += set.reps as u64;
            total_volume += set.volume();

            match best_by_reps.iter_mut().find(|(reps, _)| *reps == set.reps) {
                // equal weight keeps the earlier set
                Some((_, best)) => {
                    if set.weight > *best {
                        *best = set.weight;
                    }
                }
                None => best_by_reps.push((set.reps, set.weight)),
            }
        }

        Self {
            best_by_reps,
            total_reps,
            total_volume,
        }
    }

    /// Heaviest weight of the session with the first rep count that reached it
    pub fn heaviest(&self) -> Option<(u32, f64)> {
        let mut heaviest: Option<(u32, f64)> = None;
        for &(reps, weight) in &self.best_by_reps {
            if heaviest.map_or(true, |(_, w)| weight > w) {
                heaviest = Some((reps, weight));
            }
        }
        heaviest
    }
}
