use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Read access to one row of a dataset.
///
/// `field` yields `None` when the key is absent, explicitly null, or NaN,
/// so every consumer sees the same notion of "missing".
pub trait Record {
    fn field(&self, key: &str) -> Option<f64>;
}

fn present(value: Option<&Option<f64>>) -> Option<f64> {
    value.copied().flatten().filter(|v| !v.is_nan())
}

impl Record for HashMap<String, Option<f64>> {
    fn field(&self, key: &str) -> Option<f64> {
        present(self.get(key))
    }
}

impl Record for BTreeMap<String, Option<f64>> {
    fn field(&self, key: &str) -> Option<f64> {
        present(self.get(key))
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, key: &str) -> Option<f64> {
        (**self).field(key)
    }
}

/// A single timestamped buoy reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Unix seconds, when the source carried a parseable time.
    pub timestamp: Option<f64>,
    pub values: BTreeMap<String, Option<f64>>,
}

impl Observation {
    pub fn new(timestamp: Option<f64>) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter, mostly for tests and small callers.
    pub fn with(mut self, key: &str, value: Option<f64>) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn set(&mut self, key: &str, value: Option<f64>) {
        self.values.insert(key.to_string(), value);
    }

    /// True when neither the timestamp nor any value is present.
    pub fn is_blank(&self) -> bool {
        self.timestamp.is_none() && self.values.values().all(|v| present(Some(v)).is_none())
    }
}

impl Record for Observation {
    fn field(&self, key: &str) -> Option<f64> {
        present(self.values.get(key))
    }
}

/// Ordered sequence of observations sharing a common set of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub fields: Vec<String>,
    pub rows: Vec<Observation>,
}

impl Dataset {
    pub fn new(fields: Vec<String>, rows: Vec<Observation>) -> Self {
        Self { fields, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position-preserving column extraction: one entry per row.
    pub fn column(&self, key: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.field(key)).collect()
    }

    /// Row timestamps, one entry per row.
    pub fn timestamps(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }
}

/// Extract one field from any row type, keeping row positions.
pub fn column_of<R: Record>(rows: &[R], key: &str) -> Vec<Option<f64>> {
    rows.iter().map(|r| r.field(key)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_and_null_read_as_missing() {
        let obs = Observation::new(None)
            .with("a", Some(1.5))
            .with("b", None)
            .with("c", Some(f64::NAN));
        assert_eq!(obs.field("a"), Some(1.5));
        assert_eq!(obs.field("b"), None);
        assert_eq!(obs.field("c"), None);
        assert_eq!(obs.field("absent"), None);
    }

    #[test]
    fn plain_maps_are_records() {
        let mut row: HashMap<String, Option<f64>> = HashMap::new();
        row.insert("wind_speed".into(), Some(7.0));
        assert_eq!(row.field("wind_speed"), Some(7.0));
        assert_eq!(column_of(&[row.clone(), HashMap::new()], "wind_speed"), vec![Some(7.0), None]);
    }

    #[test]
    fn blank_rows_are_detected() {
        assert!(Observation::new(None).with("a", Some(f64::NAN)).is_blank());
        assert!(!Observation::new(Some(0.0)).is_blank());
        assert!(!Observation::new(None).with("a", Some(0.0)).is_blank());
    }

    #[test]
    fn column_keeps_positions() {
        let ds = Dataset::new(
            vec!["t".into()],
            vec![
                Observation::new(Some(1.0)).with("t", Some(1.0)),
                Observation::new(Some(2.0)).with("t", None),
                Observation::new(Some(3.0)).with("t", Some(3.0)),
            ],
        );
        assert_eq!(ds.column("t"), vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(ds.timestamps(), vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(ds.len(), 3);
    }
}
