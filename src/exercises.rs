//! Exercise catalog - the sorted set of every known exercise name

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Keys reserved by the aggregate store document
pub const RESERVED_NAMES: &[&str] = &["Personal Bests", "Stats"];

/// Sorted, deduplicated list of exercise names.
///
/// Names are case-sensitive and kept in lexicographic order. There is no
/// removal: once an exercise is known it stays known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Catalog {
    names: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name` preserving sort order. Returns `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> Result<bool> {
        match self.names.binary_search_by(|n| n.as_str().cmp(name)) {
            Ok(_) => Ok(false),
            Err(idx) => {
                validate_name(name)?;
                self.names.insert(idx, name.to_string());
                Ok(true)
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names
            .binary_search_by(|n| n.as_str().cmp(name))
            .is_ok()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<Vec<String>> for Catalog {
    // Hand-edited documents may be unsorted or hold duplicates
    fn from(mut names: Vec<String>) -> Self {
        names.sort();
        names.dedup();
        Self { names }
    }
}

impl From<Catalog> for Vec<String> {
    fn from(catalog: Catalog) -> Self {
        catalog.names
    }
}

/// Reject names the aggregate store cannot hold as exercise keys
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || RESERVED_NAMES.contains(&name) {
        return Err(Error::InvalidExerciseName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_into_empty() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert("Bench Press").unwrap());
        assert_eq!(catalog.names(), &["Bench Press".to_string()]);
    }

    #[test]
    fn test_insert_keeps_sorted() {
        let mut catalog = Catalog::new();
        for name in ["Squat", "Bench Press", "Deadlift", "Overhead Press"] {
            catalog.insert(name).unwrap();
        }
        let names: Vec<_> = catalog.iter().collect();
        assert_eq!(names, vec!["Bench Press", "Deadlift", "Overhead Press", "Squat"]);
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert("Squat").unwrap());
        assert!(!catalog.insert("Squat").unwrap());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_case_sensitive() {
        let mut catalog = Catalog::new();
        catalog.insert("squat").unwrap();
        assert!(catalog.insert("Squat").unwrap());
        assert_eq!(catalog.len(), 2);
        // uppercase sorts first
        assert_eq!(catalog.names()[0], "Squat");
    }

    #[test]
    fn test_rejects_reserved_and_blank() {
        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.insert("Stats"),
            Err(Error::InvalidExerciseName(_))
        ));
        assert!(matches!(
            catalog.insert("Personal Bests"),
            Err(Error::InvalidExerciseName(_))
        ));
        assert!(matches!(
            catalog.insert("   "),
            Err(Error::InvalidExerciseName(_))
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_deserialize_sorts_and_dedups() {
        let catalog: Catalog =
            serde_json::from_str(r#"["Squat", "Bench Press", "Squat"]"#).unwrap();
        assert_eq!(
            catalog.names(),
            &["Bench Press".to_string(), "Squat".to_string()]
        );
        assert!(catalog.contains("Squat"));
        assert!(!catalog.contains("Deadlift"));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut catalog = Catalog::new();
        catalog.insert("Squat").unwrap();
        catalog.insert("Deadlift").unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(json, r#"["Deadlift","Squat"]"#);
    }
}
