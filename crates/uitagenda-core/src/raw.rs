//! [`RawRecord`], a loosely-structured candidate as produced by a source
//! adapter, before normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A mapping of field name to optional string value.
///
/// Adapters fill in whatever they managed to extract; nothing is validated
/// until the record passes through [`normalize`](crate::normalize::normalize).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, Option<String>>);

impl RawRecord {
  pub fn new() -> Self { Self::default() }

  /// Builder-style insert of a present value.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.set(key, value);
    self
  }

  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), Some(value.into()));
  }

  /// Record that a key was seen without a value.
  pub fn set_null(&mut self, key: impl Into<String>) {
    self.0.insert(key.into(), None);
  }

  /// The value for `key`, if present and non-null.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).and_then(|v| v.as_deref())
  }

  pub fn contains(&self, key: &str) -> bool { self.get(key).is_some() }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(
      iter
        .into_iter()
        .map(|(k, v)| (k.into(), Some(v.into())))
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn null_values_read_as_absent() {
    let raw: RawRecord =
      serde_json::from_str(r#"{"title":"A","date":null}"#).unwrap();
    assert_eq!(raw.get("title"), Some("A"));
    assert_eq!(raw.get("date"), None);
    assert!(!raw.contains("date"));
    assert_eq!(raw.len(), 2);
  }

  #[test]
  fn collects_from_pairs() {
    let raw: RawRecord = [("title", "A"), ("date", "2025-07-03")]
      .into_iter()
      .collect();
    assert_eq!(raw.get("date"), Some("2025-07-03"));
  }
}
