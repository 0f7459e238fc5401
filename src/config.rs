//! Runtime configuration

use std::path::PathBuf;

use dirs_next as dirs;

use crate::db::LoadPolicy;

/// Folder created under the platform data directory
pub const APP_DIR_NAME: &str = "LiftLog";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub load_policy: LoadPolicy,
}

impl Config {
    /// Build from optional overrides (command line or environment)
    pub fn new(data_dir: Option<PathBuf>, strict: bool) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            load_policy: if strict {
                LoadPolicy::Strict
            } else {
                LoadPolicy::Recover
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, false)
    }
}

/// Per-user application data folder, e.g. `~/.local/share/LiftLog` on Linux.
/// Falls back to the working directory when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_data_dir() {
        let config = Config::new(Some(PathBuf::from("/tmp/lifts")), false);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/lifts"));
        assert_eq!(config.load_policy, LoadPolicy::Recover);
    }

    #[test]
    fn test_strict_policy() {
        let config = Config::new(Some(PathBuf::from("x")), true);
        assert_eq!(config.load_policy, LoadPolicy::Strict);
    }

    #[test]
    fn test_default_dir_ends_with_app_name() {
        assert!(Config::default().data_dir.ends_with(APP_DIR_NAME));
    }
}
