//! Query results: a set of named fields shaped like the query input.

use std::collections::BTreeMap;

use serde::Serialize;

/// Output field names.
pub mod fields {
    pub const DISTMOD: &str = "distmod";
    pub const BEST: &str = "best";
    pub const SAMPLES: &str = "samples";
    pub const GR: &str = "GR";
    pub const N_STARS: &str = "n_stars";
    pub const CONVERGED: &str = "converged";
    pub const SUCCESS: &str = "success";
    pub const DM_RELIABLE_MIN: &str = "DM_reliable_min";
    pub const DM_RELIABLE_MAX: &str = "DM_reliable_max";
    pub const MEDIAN: &str = "median";
    pub const SIGMA: &str = "sigma";
    pub const EBV_SFD: &str = "EBV_SFD";
}

/// A number or nested list of numbers, serialized as plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// A flat list of floats.
    pub fn floats(values: impl IntoIterator<Item = f64>) -> Self {
        FieldValue::List(values.into_iter().map(FieldValue::Float).collect())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Elements of a flat numeric list.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_list()?.iter().map(FieldValue::as_f64).collect()
    }

    /// True if every number inside this value is zero.
    pub fn is_all_zero(&self) -> bool {
        match self {
            FieldValue::Int(v) => *v == 0,
            FieldValue::Float(v) => *v == 0.0,
            FieldValue::List(items) => items.iter().all(FieldValue::is_all_zero),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

/// Named output fields of one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryResult {
    fields: BTreeMap<String, FieldValue>,
}

impl QueryResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
