//! Error types for the training log

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A workout referenced an exercise that was never registered
    #[error("exercise `{0}` is not registered")]
    UnknownExercise(String),

    #[error("invalid exercise name `{0}`")]
    InvalidExerciseName(String),

    #[error("training block #{0} does not exist")]
    UnknownBlock(usize),

    #[error("block has no template named `{0}`")]
    UnknownTemplate(String),

    #[error("workouts per week must be at least 1")]
    InvalidWorkoutsPerWeek,

    #[error("invalid date `{0}`")]
    InvalidDate(String),

    #[error("invalid set `{0}`, expected EXERCISE:REPSxWEIGHT")]
    InvalidSet(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
