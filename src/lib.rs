//! liftlog - Personal strength training log
//!
//! Training blocks, workout templates and logged sessions, plus an
//! incrementally maintained tracker of personal bests, per-rep-range weight
//! history and volume totals.

pub mod config;
pub mod db;
pub mod error;
pub mod exercises;
pub mod manager;
pub mod model;
pub mod tracker;
pub mod tui;

pub use db::Database;
pub use error::{Error, Result};
pub use manager::WorkoutManager;
