//! Common types for quarry-vector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier assigned to a record at insertion time.
///
/// Ids are dense and 0-based: the n-th record ever inserted into an index
/// gets id `n - 1`. They are never reused and survive save/load.
pub type RecordId = u64;

/// String and number fields stored next to a vector.
///
/// The index never looks inside; callers read fields back from query
/// results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorMetadata(BTreeMap<String, MetadataValue>);

impl VectorMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build metadata from key-value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<MetadataValue>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Set `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// String field, if present and a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            MetadataValue::Text(s) => Some(s),
            MetadataValue::Number(_) => None,
        }
    }

    /// Numeric field, if present and a number.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            MetadataValue::Number(n) => Some(*n),
            MetadataValue::Text(_) => None,
        }
    }
}

/// A metadata field value. Serialized as a bare JSON string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Text such as a claim or URL.
    Text(String),
    /// Number such as a confidence score.
    Number(f64),
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<f32> for MetadataValue {
    fn from(n: f32) -> Self {
        Self::Number(f64::from(n))
    }
}

/// One result of a nearest-neighbor query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Id of the matched record.
    pub id: RecordId,
    /// Squared Euclidean distance to the query (lower = closer).
    pub distance: f32,
    /// Metadata stored with the record.
    pub metadata: VectorMetadata,
}

/// A stored vector together with its id and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Id assigned at insertion.
    pub id: RecordId,
    /// The vector data.
    pub vector: Vec<f32>,
    /// Metadata attached at insertion.
    pub metadata: VectorMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut meta = VectorMetadata::new();
        meta.insert("claim", "Rust 1.80 stabilized LazyLock");
        meta.insert("confidence", 0.5f32);

        assert_eq!(meta.get_string("claim"), Some("Rust 1.80 stabilized LazyLock"));
        assert_eq!(meta.get_float("confidence"), Some(0.5));
        assert_eq!(meta.get_string("confidence"), None);
        assert_eq!(meta.get_float("claim"), None);
        assert_eq!(meta.get_string("missing"), None);
    }

    #[test]
    fn test_metadata_serializes_as_plain_object() {
        let meta = VectorMetadata::from_pairs([
            ("claim", MetadataValue::from("tokio 1.48 released")),
            ("confidence", MetadataValue::from(0.75f64)),
        ]);

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"claim": "tokio 1.48 released", "confidence": 0.75})
        );
        let back: VectorMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
