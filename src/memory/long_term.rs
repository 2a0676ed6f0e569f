//! Long-term evidence archive.
//!
//! Claims gathered during a run are embedded and appended to a
//! [`VectorMemory`] so later runs can recall related evidence. The archive
//! never fails a run: an unavailable index turns every write into a
//! reported no-op.

use crate::types::{AppError, EvidenceItem, Result, Task};
use async_trait::async_trait;
use quarry_vector::{VectorMemory, VectorMetadata};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Turns text into fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each text, returning one vector per input in the same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Evidence returned by [`EvidenceArchive::recall`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecalledEvidence {
    pub distance: f32,
    pub topic: String,
    pub task_id: String,
    pub claim: String,
    pub source_url: String,
    pub title: String,
    pub confidence: f64,
}

pub struct EvidenceArchive {
    memory: Mutex<VectorMemory>,
    embedder: Arc<dyn Embedder>,
}

impl EvidenceArchive {
    pub fn new(memory: VectorMemory, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            memory: Mutex::new(memory),
            embedder,
        }
    }

    pub async fn is_available(&self) -> bool {
        self.memory.lock().await.is_available()
    }

    pub async fn len(&self) -> usize {
        self.memory.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Embed and store every claim of a finished run, then save the index.
    ///
    /// `evidence` pairs each task with its evidence. Returns the number of
    /// records written.
    pub async fn archive_run(
        &self,
        topic: &str,
        evidence: &[(Task, Vec<EvidenceItem>)],
    ) -> Result<usize> {
        let mut memory = self.memory.lock().await;
        if let Some(reason) = memory.unavailable_reason() {
            return Err(quarry_vector::Error::Unavailable(reason.to_string()).into());
        }

        let entries: Vec<(&Task, &EvidenceItem)> = evidence
            .iter()
            .flat_map(|(task, items)| items.iter().map(move |item| (task, item)))
            .collect();
        if entries.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = entries.iter().map(|(_, e)| e.claim.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != entries.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                entries.len(),
                vectors.len()
            )));
        }

        let batch: Vec<(Vec<f32>, VectorMetadata)> = entries
            .into_iter()
            .zip(vectors)
            .map(|((task, item), vector)| {
                let mut metadata = VectorMetadata::new();
                metadata.insert("topic", topic);
                metadata.insert("task_id", task.id.as_str());
                metadata.insert("task", task.text.as_str());
                metadata.insert("claim", item.claim.as_str());
                metadata.insert("source_url", item.source_url.as_str());
                metadata.insert("title", item.title.as_str());
                metadata.insert("confidence", item.confidence);
                (vector, metadata)
            })
            .collect();

        // A rejected vector leaves the index untouched, so nothing from this
        // run reaches a later save.
        let written = memory.upsert_batch(batch)?.len();

        memory.save().await?;
        tracing::info!(topic, records = written, "Archived run evidence");
        Ok(written)
    }

    /// Return up to `k` archived claims closest to `text`.
    ///
    /// Empty when the archive is unavailable or `k` is zero.
    pub async fn recall(&self, text: &str, k: usize) -> Result<Vec<RecalledEvidence>> {
        let memory = self.memory.lock().await;
        if !memory.is_available() || memory.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let vectors = self.embedder.embed(&[text.to_string()]).await?;
        let query = vectors
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("Embedder returned no vector".to_string()))?;

        let neighbors = memory.query(&query, k)?;
        Ok(neighbors
            .into_iter()
            .map(|n| {
                let field = |key: &str| n.metadata.get_string(key).unwrap_or_default().to_string();
                RecalledEvidence {
                    distance: n.distance,
                    topic: field("topic"),
                    task_id: field("task_id"),
                    claim: field("claim"),
                    source_url: field("source_url"),
                    title: field("title"),
                    confidence: n.metadata.get_float("confidence").unwrap_or(0.0),
                }
            })
            .collect())
    }
}

/// Local ONNX embeddings via fastembed (BGE small, 384 dimensions).
#[cfg(feature = "local-embeddings")]
pub struct FastEmbedder {
    model: Arc<parking_lot::Mutex<fastembed::TextEmbedding>>,
}

#[cfg(feature = "local-embeddings")]
impl FastEmbedder {
    /// Dimension of the vectors produced by the default model.
    pub const DIMENSION: usize = 384;

    pub fn new() -> Result<Self> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::BGESmallENV15).with_show_download_progress(true),
        )
        .map_err(|e| AppError::Embedding(e.to_string()))?;

        Ok(Self {
            model: Arc::new(parking_lot::Mutex::new(model)),
        })
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || {
            model
                .lock()
                .embed(texts, None)
                .map_err(|e| AppError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
    }
}
