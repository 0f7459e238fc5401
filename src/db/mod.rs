//! Database module - JSON document storage for the workout history and the tracker
//!
//! Two artifacts live side by side in the data directory:
//! - `training_block_data.json`: exercise catalog and training blocks
//! - `training_data.json`: the over-time tracker
//!
//! Both are complete overwrites on every save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::WorkoutHistory;
use crate::tracker::AggregateStore;

pub const HISTORY_FILE: &str = "training_block_data.json";
pub const TRACKER_FILE: &str = "training_data.json";

const DEFAULT_HISTORY: &str = include_str!("../../data/default_training_block_data.json");
const DEFAULT_TRACKER: &str = include_str!("../../data/default_training_data.json");

/// What to do when a stored document exists but cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Log a warning and continue with an empty document
    #[default]
    Recover,
    /// Refuse to load
    Strict,
}

/// Database wrapper
#[derive(Debug, Clone)]
pub struct Database {
    dir: PathBuf,
    policy: LoadPolicy,
}

impl Database {
    /// Open the data directory, creating it and seeding default documents on first run
    pub fn open(dir: impl Into<PathBuf>, policy: LoadPolicy) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let db = Self { dir, policy };
        db.seed(HISTORY_FILE, DEFAULT_HISTORY)?;
        db.seed(TRACKER_FILE, DEFAULT_TRACKER)?;
        Ok(db)
    }

    fn seed(&self, file: &str, contents: &str) -> Result<()> {
        let path = self.dir.join(file);
        if !path.exists() {
            info!(path = %path.display(), "seeding default document");
            fs::write(&path, contents).map_err(|e| Error::io(&path, e))?;
        }
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    pub fn tracker_path(&self) -> PathBuf {
        self.dir.join(TRACKER_FILE)
    }

    pub fn load_history(&self) -> Result<WorkoutHistory> {
        self.load_document(&self.history_path())
    }

    pub fn load_tracker(&self) -> Result<AggregateStore> {
        self.load_document(&self.tracker_path())
    }

    fn load_document<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(Error::io(path, e)),
        };

        match serde_json::from_str(&data) {
            Ok(doc) => Ok(doc),
            Err(source) => match self.policy {
                LoadPolicy::Recover => {
                    warn!(
                        path = %path.display(),
                        error = %source,
                        "document is unreadable, continuing with an empty one"
                    );
                    Ok(T::default())
                }
                LoadPolicy::Strict => Err(Error::Parse {
                    path: path.to_path_buf(),
                    source,
                }),
            },
        }
    }

    pub fn save_history(&self, history: &WorkoutHistory) -> Result<()> {
        let json = to_json("workout history", history)?;
        let path = self.history_path();
        let temp = write_temp(&path, &json)?;
        replace(&temp, &path)
    }

    pub fn save_tracker(&self, tracker: &AggregateStore) -> Result<()> {
        let json = to_json("tracker", tracker)?;
        let path = self.tracker_path();
        let temp = write_temp(&path, &json)?;
        replace(&temp, &path)
    }

    /// Save both documents. Nothing is replaced unless both serialize and
    /// both temp files are written. If the tracker cannot be moved into place
    /// the previous history is put back.
    pub fn commit(&self, history: &WorkoutHistory, tracker: &AggregateStore) -> Result<()> {
        let history_json = to_json("workout history", history)?;
        let tracker_json = to_json("tracker", tracker)?;

        let history_path = self.history_path();
        let tracker_path = self.tracker_path();

        let history_temp = write_temp(&history_path, &history_json)?;
        let tracker_temp = match write_temp(&tracker_path, &tracker_json) {
            Ok(temp) => temp,
            Err(e) => {
                let _ = fs::remove_file(&history_temp);
                return Err(e);
            }
        };

        let backup = history_path.with_extension("bak");
        let had_history = history_path.exists();
        if had_history && let Err(e) = fs::copy(&history_path, &backup) {
            let _ = fs::remove_file(&history_temp);
            let _ = fs::remove_file(&tracker_temp);
            return Err(Error::io(&backup, e));
        }

        if let Err(e) = replace(&history_temp, &history_path) {
            let _ = fs::remove_file(&tracker_temp);
            let _ = fs::remove_file(&backup);
            return Err(e);
        }

        if let Err(e) = replace(&tracker_temp, &tracker_path) {
            let _ = fs::remove_file(&tracker_temp);
            let restored = if had_history {
                fs::rename(&backup, &history_path)
            } else {
                fs::remove_file(&history_path)
            };
            if let Err(restore) = restored {
                warn!(
                    path = %history_path.display(),
                    error = %restore,
                    "could not restore previous workout history"
                );
            }
            return Err(e);
        }

        let _ = fs::remove_file(&backup);
        info!(dir = %self.dir.display(), "saved workout history and tracker");
        Ok(())
    }
}

fn to_json<T: Serialize>(what: &'static str, value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| Error::Serialize { what, source })
}

fn write_temp(path: &Path, contents: &str) -> Result<PathBuf> {
    let temp = path.with_extension("tmp");
    fs::write(&temp, contents).map_err(|e| Error::io(&temp, e))?;
    Ok(temp)
}

fn replace(temp: &Path, path: &Path) -> Result<()> {
    fs::rename(temp, path).map_err(|e| Error::io(path, e))
}
