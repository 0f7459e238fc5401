//! Parallel value/date sequences used for every chartable history

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::Number;

/// Values paired index-for-index with the date each was recorded on.
///
/// Serialized as `[[values...], [dates...]]`. The two halves can only grow
/// together, so they always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<T> {
    values: Vec<T>,
    dates: Vec<String>,
}

impl<T> Default for Series<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            dates: Vec::new(),
        }
    }
}

impl<T> Series<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T, date: impl Into<String>) {
        self.values.push(value);
        self.dates.push(date.into());
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &str)> {
        self.values
            .iter()
            .zip(self.dates.iter().map(String::as_str))
    }

    pub fn last(&self) -> Option<(&T, &str)> {
        Some((self.values.last()?, self.dates.last()?.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Series<u64> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.values, &self.dates).serialize(serializer)
    }
}

impl Serialize for Series<f64> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values: Vec<Number> = self.values.iter().copied().map(Number).collect();
        (values, &self.dates).serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Series<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (values, dates): (Vec<T>, Vec<String>) = Deserialize::deserialize(deserializer)?;
        if values.len() != dates.len() {
            return Err(D::Error::custom(format!(
                "series has {} values but {} dates",
                values.len(),
                dates.len()
            )));
        }
        Ok(Self { values, dates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_halves_aligned() {
        let mut series = Series::new();
        series.push(200.0, "June 1, 2024");
        series.push(205.0, "June 3, 2024");

        assert_eq!(series.len(), 2);
        assert_eq!(series.values(), &[200.0, 205.0]);
        assert_eq!(series.dates(), &["June 1, 2024", "June 3, 2024"]);
        assert_eq!(series.last(), Some((&205.0, "June 3, 2024")));
    }

    #[test]
    fn test_json_shape() {
        let mut series: Series<u64> = Series::new();
        series.push(15, "June 1, 2024");
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[[15],["June 1, 2024"]]"#);

        let empty: Series<f64> = serde_json::from_str("[[], []]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_whole_weights_written_as_integers() {
        let mut series = Series::new();
        series.push(200.0, "June 1, 2024");
        series.push(202.5, "June 3, 2024");
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[[200,202.5],["June 1, 2024","June 3, 2024"]]"#);

        let loaded: Series<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let result: Result<Series<f64>, _> = serde_json::from_str(r#"[[1, 2], ["June 1, 2024"]]"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("2 values but 1 dates"), "got: {}", err);
    }
}
