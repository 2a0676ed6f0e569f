//! # quarry-vector
//!
//! An append-only, brute-force nearest-neighbor index over fixed-dimension
//! vectors, persisted to a single file.
//!
//! ## Features
//!
//! - **Exact search**: squared Euclidean distance against every record
//! - **Stable ids**: records are numbered `0, 1, 2, ...` in insertion order
//!   and keep their ids across save/load
//! - **Single-file persistence**: one JSON document per index
//! - **Explicit degraded mode**: [`VectorMemory`] wraps an index that may
//!   have failed to open, so callers can check availability instead of
//!   silently getting empty results
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quarry_vector::{VectorIndex, VectorMetadata};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), quarry_vector::Error> {
//!     let mut index = VectorIndex::open(3, "data/long_term.json").await?;
//!
//!     let id = index.upsert(&[0.1, 0.2, 0.3], VectorMetadata::from_pairs([("claim", "...")]))?;
//!     let nearest = index.query(&[0.1, 0.2, 0.3], 5)?;
//!     assert_eq!(nearest[0].id, id);
//!
//!     index.save().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod persistence;
pub mod types;

// Re-exports for convenience
pub use error::{Error, Result};
pub use types::{MetadataValue, Neighbor, RecordId, VectorMetadata, VectorRecord};

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// A brute-force vector index bound to a storage path.
///
/// Records are only ever appended; there is no update or delete. Queries
/// scan every record, so cost is O(N·D).
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    path: PathBuf,
    records: Vec<VectorRecord>,
    next_id: RecordId,
}

impl VectorIndex {
    /// Open the index stored at `path`, or create an empty one.
    ///
    /// If a file exists at `path` its records and id counter are restored
    /// exactly. Nothing is written until [`save`](Self::save) is called.
    ///
    /// # Errors
    ///
    /// Returns an error if `dimension` is zero, if the file cannot be read
    /// or parsed, or if it was written with a different dimension.
    #[instrument(skip(path), fields(path = ?path.as_ref()))]
    pub async fn open(dimension: usize, path: impl AsRef<Path>) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Configuration(
                "Vector dimension must be positive".to_string(),
            ));
        }

        let path = path.as_ref().to_path_buf();
        let Some(file) = persistence::load_index(&path).await? else {
            info!("Creating new vector index");
            return Ok(Self {
                dimension,
                path,
                records: Vec::new(),
                next_id: 0,
            });
        };

        if file.dimension != dimension {
            return Err(Error::Persistence(format!(
                "Index at {} has dimension {}, expected {}",
                path.display(),
                file.dimension,
                dimension
            )));
        }

        Ok(Self {
            dimension,
            path,
            records: file.records,
            next_id: file.next_id,
        })
    }

    /// Vector dimension every record must have.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Storage path used by [`save`](Self::save).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id the next inserted record will receive.
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    /// Append a vector with its metadata and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `vector.len()` differs from
    /// the index dimension, or [`Error::InvalidVector`] if it contains a
    /// non-finite component.
    pub fn upsert(&mut self, vector: &[f32], metadata: VectorMetadata) -> Result<RecordId> {
        self.check_vector(vector)?;

        let id = self.next_id;
        self.records.push(VectorRecord {
            id,
            vector: vector.to_vec(),
            metadata,
        });
        self.next_id += 1;

        debug!(id, "Inserted vector");
        Ok(id)
    }

    /// Append several vectors at once and return their ids in order.
    ///
    /// Every vector is checked before any is inserted, so on error the
    /// index is left exactly as it was.
    pub fn upsert_batch(
        &mut self,
        entries: Vec<(Vec<f32>, VectorMetadata)>,
    ) -> Result<Vec<RecordId>> {
        for (vector, _) in &entries {
            self.check_vector(vector)?;
        }

        let mut ids = Vec::with_capacity(entries.len());
        for (vector, metadata) in entries {
            let id = self.next_id;
            self.records.push(VectorRecord {
                id,
                vector,
                metadata,
            });
            self.next_id += 1;
            ids.push(id);
        }

        debug!(count = ids.len(), "Inserted vector batch");
        Ok(ids)
    }

    /// Return the `k` records closest to `vector`, nearest first.
    ///
    /// Distances are squared Euclidean. Records at equal distance come back
    /// in insertion order. Fewer than `k` results are returned when the
    /// index is smaller than `k`.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_vector(vector)?;

        if k == 0 || self.records.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, usize)> = self
            .records
            .iter()
            .enumerate()
            .map(|(pos, record)| (distance::squared_euclidean(vector, &record.vector), pos))
            .collect();

        // sort_by is stable, so ties keep insertion order
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(distance, pos)| {
                let record = &self.records[pos];
                Neighbor {
                    id: record.id,
                    distance,
                    metadata: record.metadata.clone(),
                }
            })
            .collect())
    }

    /// Persist all records and the id counter to the storage path.
    #[instrument(skip(self), fields(path = ?self.path, records = self.records.len()))]
    pub async fn save(&self) -> Result<()> {
        persistence::save_index(&self.path, self.dimension, self.next_id, &self.records).await
    }

    fn check_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(
                "vector contains NaN or infinite values".to_string(),
            ));
        }
        Ok(())
    }
}

/// A vector index that may be unavailable.
///
/// Opening never fails: when the underlying index cannot be loaded the
/// memory starts in the `Unavailable` state. In that state `upsert`
/// returns [`Error::Unavailable`], `query` returns no results and `save`
/// does nothing, so an unreadable file is never overwritten.
#[derive(Debug, Clone)]
pub enum VectorMemory {
    /// Index opened successfully.
    Available(VectorIndex),
    /// Index could not be opened.
    Unavailable {
        /// Why the index is unavailable.
        reason: String,
    },
}

impl VectorMemory {
    /// Open the index at `path`, degrading to `Unavailable` on failure.
    pub async fn open(dimension: usize, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match VectorIndex::open(dimension, path).await {
            Ok(index) => Self::Available(index),
            Err(e) => {
                warn!(path = ?path, error = %e, "Vector index unavailable, long-term memory disabled");
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Construct an unavailable memory with the given reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Check whether the index is usable.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Reason the index is unavailable, if it is.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }

    /// Borrow the underlying index when available.
    pub fn index(&self) -> Option<&VectorIndex> {
        match self {
            Self::Available(index) => Some(index),
            Self::Unavailable { .. } => None,
        }
    }

    /// Number of stored records (zero when unavailable).
    pub fn len(&self) -> usize {
        self.index().map_or(0, VectorIndex::len)
    }

    /// Check if there are no stored records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a vector; fails with [`Error::Unavailable`] in degraded mode.
    pub fn upsert(&mut self, vector: &[f32], metadata: VectorMetadata) -> Result<RecordId> {
        match self {
            Self::Available(index) => index.upsert(vector, metadata),
            Self::Unavailable { reason } => Err(Error::Unavailable(reason.clone())),
        }
    }

    /// Append a batch of vectors, all or nothing; fails with
    /// [`Error::Unavailable`] in degraded mode.
    pub fn upsert_batch(
        &mut self,
        entries: Vec<(Vec<f32>, VectorMetadata)>,
    ) -> Result<Vec<RecordId>> {
        match self {
            Self::Available(index) => index.upsert_batch(entries),
            Self::Unavailable { reason } => Err(Error::Unavailable(reason.clone())),
        }
    }

    /// Query the index; always empty in degraded mode.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        match self {
            Self::Available(index) => index.query(vector, k),
            Self::Unavailable { .. } => Ok(Vec::new()),
        }
    }

    /// Save the index; a no-op in degraded mode.
    pub async fn save(&self) -> Result<()> {
        match self {
            Self::Available(index) => index.save().await,
            Self::Unavailable { reason } => {
                debug!(reason, "Skipping save of unavailable vector index");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(label: &str) -> VectorMetadata {
        VectorMetadata::from_pairs([("label", label)])
    }

    #[tokio::test]
    async fn test_ids_are_dense_and_zero_based() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(2, temp_dir.path().join("idx.json"))
            .await
            .unwrap();

        assert_eq!(index.upsert(&[0.0, 0.0], meta("a")).unwrap(), 0);
        assert_eq!(index.upsert(&[1.0, 0.0], meta("b")).unwrap(), 1);
        assert_eq!(index.upsert(&[0.0, 1.0], meta("c")).unwrap(), 2);
        assert_eq!(index.len(), 3);
        assert_eq!(index.next_id(), 3);
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(3, temp_dir.path().join("idx.json"))
            .await
            .unwrap();

        let result = index.upsert(&[1.0, 2.0], meta("short"));
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(index.is_empty());
        assert_eq!(index.next_id(), 0);
    }

    #[tokio::test]
    async fn test_upsert_batch_is_all_or_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(2, temp_dir.path().join("idx.json"))
            .await
            .unwrap();
        index.upsert(&[0.0, 0.0], meta("existing")).unwrap();

        let result = index.upsert_batch(vec![
            (vec![1.0, 1.0], meta("a")),
            (vec![2.0, 2.0, 2.0], meta("b")),
            (vec![3.0, 3.0], meta("c")),
        ]);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert_eq!(index.len(), 1);
        assert_eq!(index.next_id(), 1);

        let ids = index
            .upsert_batch(vec![(vec![1.0, 1.0], meta("a")), (vec![3.0, 3.0], meta("c"))])
            .unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(index.len(), 3);
    }

    #[tokio::test]
    async fn test_rejects_nan() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(2, temp_dir.path().join("idx.json"))
            .await
            .unwrap();

        let result = index.upsert(&[f32::NAN, 0.0], meta("nan"));
        assert!(matches!(result, Err(Error::InvalidVector(_))));
    }

    #[tokio::test]
    async fn test_zero_dimension_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = VectorIndex::open(0, temp_dir.path().join("idx.json")).await;
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_query_nearest_first() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(2, temp_dir.path().join("idx.json"))
            .await
            .unwrap();
        index.upsert(&[10.0, 10.0], meta("far")).unwrap();
        index.upsert(&[1.0, 1.0], meta("near")).unwrap();
        index.upsert(&[3.0, 3.0], meta("mid")).unwrap();

        let results = index.query(&[0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata.get_string("label"), Some("near"));
        assert_eq!(results[0].distance, 2.0);
        assert_eq!(results[1].metadata.get_string("label"), Some("mid"));
        assert_eq!(results[1].distance, 18.0);
    }

    #[tokio::test]
    async fn test_query_empty_index() {
        let temp_dir = TempDir::new().unwrap();
        let index = VectorIndex::open(2, temp_dir.path().join("idx.json"))
            .await
            .unwrap();
        assert!(index.query(&[0.0, 0.0], 5).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(1, temp_dir.path().join("idx.json"))
            .await
            .unwrap();
        index.upsert(&[1.0], meta("first")).unwrap();
        index.upsert(&[-1.0], meta("second")).unwrap();
        index.upsert(&[1.0], meta("third")).unwrap();

        let results = index.query(&[0.0], 3).unwrap();
        let ids: Vec<RecordId> = results.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_save_and_reload_restores_ids_and_results() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("idx.json");

        let vectors: Vec<[f32; 3]> = vec![
            [0.12, -0.5, 3.25],
            [1.0, 1.0, 1.0],
            [-2.75, 0.0, 0.001],
            [0.3333, 0.6667, -0.1],
        ];

        let mut index = VectorIndex::open(3, &path).await.unwrap();
        for (i, v) in vectors.iter().enumerate() {
            index.upsert(v, meta(&format!("v{}", i))).unwrap();
        }
        index.save().await.unwrap();
        let before = index.query(&[0.0, 0.0, 0.0], 10).unwrap();

        let mut reloaded = VectorIndex::open(3, &path).await.unwrap();
        assert_eq!(reloaded.len(), vectors.len());
        assert_eq!(reloaded.next_id(), vectors.len() as RecordId);

        for (i, v) in vectors.iter().enumerate() {
            let hit = reloaded.query(v, 1).unwrap();
            assert_eq!(hit.len(), 1);
            assert_eq!(hit[0].distance, 0.0);
            assert_eq!(hit[0].id, i as RecordId);
            assert_eq!(hit[0].metadata, meta(&format!("v{}", i)));
        }

        assert_eq!(reloaded.query(&[0.0, 0.0, 0.0], 10).unwrap(), before);

        // Numbering continues where the saved index left off
        let next = reloaded.upsert(&[9.0, 9.0, 9.0], meta("new")).unwrap();
        assert_eq!(next, vectors.len() as RecordId);
    }

    #[tokio::test]
    async fn test_k_larger_than_len_returns_all_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(2, temp_dir.path().join("idx.json"))
            .await
            .unwrap();
        index.upsert(&[5.0, 0.0], meta("a")).unwrap();
        index.upsert(&[1.0, 0.0], meta("b")).unwrap();
        index.upsert(&[3.0, 0.0], meta("c")).unwrap();

        let results = index.query(&[0.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 3);
        let mut ids: Vec<RecordId> = results.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_open_with_different_dimension_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("idx.json");
        let mut index = VectorIndex::open(2, &path).await.unwrap();
        index.upsert(&[1.0, 2.0], meta("x")).unwrap();
        index.save().await.unwrap();

        let result = VectorIndex::open(4, &path).await;
        assert!(matches!(result, Err(Error::Persistence(_))));
    }

    #[tokio::test]
    async fn test_unavailable_memory_degrades() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("idx.json");
        tokio::fs::write(&path, b"{ corrupted").await.unwrap();

        let mut memory = VectorMemory::open(2, &path).await;
        assert!(!memory.is_available());
        assert!(memory.unavailable_reason().is_some());

        let upsert = memory.upsert(&[1.0, 2.0], meta("x"));
        assert!(matches!(upsert, Err(Error::Unavailable(_))));
        assert!(memory.query(&[1.0, 2.0], 3).unwrap().is_empty());
        memory.save().await.unwrap();

        // The corrupted file is left untouched
        let contents = tokio::fs::read(&path).await.unwrap();
        assert_eq!(contents, b"{ corrupted");
    }

    #[tokio::test]
    async fn test_available_memory_delegates() {
        let temp_dir = TempDir::new().unwrap();
        let mut memory = VectorMemory::open(2, temp_dir.path().join("idx.json")).await;
        assert!(memory.is_available());

        let id = memory.upsert(&[0.5, 0.5], meta("x")).unwrap();
        assert_eq!(id, 0);
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.query(&[0.5, 0.5], 1).unwrap()[0].distance, 0.0);
    }
}
