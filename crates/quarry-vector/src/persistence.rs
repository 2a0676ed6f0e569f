//! Persistence layer for quarry-vector.
//!
//! An index is stored as a single JSON document:
//!
//! ```text
//! {
//!   "format_version": 1,
//!   "dimension": 384,
//!   "next_id": 3,
//!   "records": [ { "id": 0, "vector": [...], "metadata": {...} }, ... ]
//! }
//! ```
//!
//! Records are written in insertion order. `f32` values round-trip exactly
//! through serde_json, so a reloaded index answers queries identically.

use crate::error::{Error, Result};
use crate::types::{RecordId, VectorRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Borrowed view written by [`save_index`].
#[derive(Serialize)]
struct IndexFileRef<'a> {
    format_version: u32,
    dimension: usize,
    next_id: RecordId,
    records: &'a [VectorRecord],
}

/// Index contents read back by [`load_index`].
#[derive(Debug, Deserialize)]
pub struct IndexFile {
    /// Format version the file was written with.
    pub format_version: u32,
    /// Vector dimension of every record.
    pub dimension: usize,
    /// Id the next inserted record will receive.
    pub next_id: RecordId,
    /// Records in insertion order.
    pub records: Vec<VectorRecord>,
}

impl IndexFile {
    /// Check the file is internally consistent: every record has the index
    /// dimension, ids equal positions and `next_id` equals the record count.
    fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(Error::Persistence(format!(
                "Unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }

        for (position, record) in self.records.iter().enumerate() {
            if record.vector.len() != self.dimension {
                return Err(Error::Persistence(format!(
                    "Record {} has {} components, index dimension is {}",
                    record.id,
                    record.vector.len(),
                    self.dimension
                )));
            }
            if record.id != position as RecordId {
                return Err(Error::Persistence(format!(
                    "Record at position {} has id {}",
                    position, record.id
                )));
            }
        }

        if self.next_id != self.records.len() as RecordId {
            return Err(Error::Persistence(format!(
                "next_id is {} but the file holds {} records",
                self.next_id,
                self.records.len()
            )));
        }

        Ok(())
    }
}

/// Save an index to `path`.
///
/// The document is written to a sibling temporary file first and then
/// renamed over `path`. Parent directories are created as needed.
pub async fn save_index(
    path: &Path,
    dimension: usize,
    next_id: RecordId,
    records: &[VectorRecord],
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let file = IndexFileRef {
        format_version: FORMAT_VERSION,
        dimension,
        next_id,
        records,
    };
    let data = serde_json::to_vec(&file)
        .map_err(|e| Error::Persistence(format!("Failed to serialize index: {}", e)))?;

    let tmp_path = temp_path_for(path);
    tokio::fs::write(&tmp_path, data).await?;
    tokio::fs::rename(&tmp_path, path).await?;

    info!(path = ?path, records = records.len(), "Saved vector index");
    Ok(())
}

/// Load an index from `path`.
///
/// Returns `Ok(None)` when no file exists at `path`.
pub async fn load_index(path: &Path) -> Result<Option<IndexFile>> {
    if !tokio::fs::try_exists(path).await? {
        debug!(path = ?path, "No index file found");
        return Ok(None);
    }

    let data = tokio::fs::read(path).await?;
    let file: IndexFile = serde_json::from_slice(&data)
        .map_err(|e| Error::Persistence(format!("Failed to parse index file: {}", e)))?;
    file.validate()?;

    info!(
        path = ?path,
        records = file.records.len(),
        dimension = file.dimension,
        "Loaded vector index"
    );
    Ok(Some(file))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VectorMetadata;
    use tempfile::TempDir;

    fn record(id: RecordId, vector: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id,
            vector,
            metadata: VectorMetadata::from_pairs([("n", id.to_string())]),
        }
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("index.json");

        let records = vec![record(0, vec![0.1, 0.2]), record(1, vec![-3.5, 1e-7])];
        save_index(&path, 2, 2, &records).await.unwrap();

        let loaded = load_index(&path).await.unwrap().unwrap();
        assert_eq!(loaded.dimension, 2);
        assert_eq!(loaded.next_id, 2);
        assert_eq!(loaded.records, records);
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = load_index(&temp_dir.path().join("absent.json")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let result = load_index(&path).await;
        assert!(matches!(result, Err(Error::Persistence(_))));
    }

    #[tokio::test]
    async fn test_load_rejects_wrong_record_length() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.json");
        save_index(&path, 3, 1, &[record(0, vec![1.0, 2.0])])
            .await
            .unwrap();

        let result = load_index(&path).await;
        assert!(matches!(result, Err(Error::Persistence(_))));
    }

    #[tokio::test]
    async fn test_load_rejects_id_gaps() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.json");
        save_index(&path, 1, 6, &[record(0, vec![1.0]), record(5, vec![2.0])])
            .await
            .unwrap();

        let result = load_index(&path).await;
        assert!(matches!(result, Err(Error::Persistence(ref m)) if m.contains("position 1")));
    }

    #[tokio::test]
    async fn test_load_rejects_counter_ahead_of_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.json");
        save_index(&path, 1, 4, &[record(0, vec![1.0]), record(1, vec![2.0])])
            .await
            .unwrap();

        let result = load_index(&path).await;
        assert!(matches!(result, Err(Error::Persistence(ref m)) if m.contains("next_id")));
    }
}
