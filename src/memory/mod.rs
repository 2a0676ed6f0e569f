//! Run memory for the research pipeline.
//!
//! This module provides:
//! - [`ShortTermStore`] - per-run task list, evidence keyed by task id, and notes
//! - [`rank_evidence`] - the shared confidence ranking used by every consumer
//! - [`long_term`] - the embedding archive backed by `quarry-vector`
//!
//! The short-term store does no I/O and no locking. Callers that share one
//! store across concurrent tasks wrap it in a mutex.

pub mod long_term;

pub use long_term::{Embedder, EvidenceArchive, RecalledEvidence};

use crate::types::{AppError, EvidenceItem, Result, Task, TaskStatus};
use std::collections::HashMap;

/// Per-run task, evidence and note state.
#[derive(Debug, Default)]
pub struct ShortTermStore {
    tasks: Vec<Task>,
    evidence: HashMap<String, Vec<EvidenceItem>>,
    notes: Vec<String>,
}

impl ShortTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending task.
    ///
    /// Fails with [`AppError::DuplicateTaskId`] if `id` is already present and
    /// with [`AppError::InvalidInput`] if `text` is blank.
    pub fn add_task(&mut self, id: impl Into<String>, text: impl Into<String>) -> Result<()> {
        let id = id.into();
        let text = text.into();

        if self.tasks.iter().any(|t| t.id == id) {
            return Err(AppError::DuplicateTaskId(id));
        }
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(format!("Task {} has empty text", id)));
        }

        self.tasks.push(Task::new(id, text));
        Ok(())
    }

    /// Mark a task done. Unknown ids are ignored.
    pub fn set_task_done(&mut self, id: &str) {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => task.status = TaskStatus::Done,
            None => tracing::debug!(task_id = id, "Ignoring completion for unknown task"),
        }
    }

    /// Tasks in registration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn add_evidence(&mut self, task_id: &str, item: EvidenceItem) {
        self.evidence
            .entry(task_id.to_string())
            .or_default()
            .push(item);
    }

    /// Evidence for `task_id` in insertion order.
    pub fn evidence(&self, task_id: &str) -> &[EvidenceItem] {
        self.evidence
            .get(task_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Evidence for `task_id` ordered by [`rank_evidence`].
    pub fn ranked_evidence(&self, task_id: &str) -> Vec<EvidenceItem> {
        rank_evidence(self.evidence(task_id).to_vec())
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

/// Order evidence by confidence, highest first.
///
/// The sort is stable, so items with equal confidence keep their insertion
/// order.
pub fn rank_evidence(mut items: Vec<EvidenceItem>) -> Vec<EvidenceItem> {
    items.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    items
}
