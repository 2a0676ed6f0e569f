use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Maximum length of an evidence excerpt, in characters.
pub const MAX_EXCERPT_CHARS: usize = 200;

// ============= Task Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Done,
}

/// One independently addressable unit of work derived from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            status: TaskStatus::Pending,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Raw entry returned by a semantic splitter, before ids are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTask {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
}

impl SplitTask {
    pub fn new(id: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            id: id.map(str::to_string),
            text: text.into(),
        }
    }
}

// ============= Evidence Types =============

/// A candidate page returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A single claim with provenance and a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub source_url: String,
    pub title: String,
    pub claim: String,
    pub excerpt: String,
    pub confidence: f32,
}

impl EvidenceItem {
    /// Build an item, truncating the excerpt to [`MAX_EXCERPT_CHARS`] and
    /// clamping confidence into `[0, 1]` (NaN becomes 0).
    pub fn new(
        source_url: impl Into<String>,
        title: impl Into<String>,
        claim: impl Into<String>,
        excerpt: impl AsRef<str>,
        confidence: f32,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            title: title.into(),
            claim: claim.into(),
            excerpt: truncate_chars(excerpt.as_ref(), MAX_EXCERPT_CHARS),
            confidence: clamp_confidence(confidence),
        }
    }
}

fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Return at most `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

// ============= Summary Types =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRef {
    pub claim: String,
    #[serde(default)]
    pub source: String,
}

/// Per-task summary produced by the summarization collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Id of the task this summary belongs to; filled in by the orchestrator.
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub task: String,
    pub summary: String,
    #[serde(default)]
    pub top_claims: Vec<ClaimRef>,
    #[serde(default)]
    pub uncertainties: Vec<String>,
    /// True when this summary was synthesized after a collaborator failure.
    #[serde(default)]
    pub degraded: bool,
}

/// Summary text used when the summarizer fails.
pub const FALLBACK_SUMMARY_TEXT: &str = "Could not generate detailed summary, returning top claims.";

/// Claims carried into a fallback summary.
pub const FALLBACK_TOP_CLAIMS: usize = 5;

impl TaskSummary {
    /// Minimal summary built from the highest-confidence evidence.
    pub fn fallback(task: &Task, evidence: &[EvidenceItem]) -> Self {
        let top_claims = crate::memory::rank_evidence(evidence.to_vec())
            .into_iter()
            .take(FALLBACK_TOP_CLAIMS)
            .map(|e| ClaimRef {
                claim: e.claim,
                source: e.source_url,
            })
            .collect();

        Self {
            task_id: task.id.clone(),
            task: task.text.clone(),
            summary: FALLBACK_SUMMARY_TEXT.to_string(),
            top_claims,
            uncertainties: Vec::new(),
            degraded: true,
        }
    }
}

// ============= Report Types =============

/// Reference to the rendered report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ReportHandle {
    /// Report written to disk.
    File(PathBuf),
    /// Report kept in memory because rendering failed.
    Inline(String),
}

impl std::fmt::Display for ReportHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportHandle::File(path) => write!(f, "{}", path.display()),
            ReportHandle::Inline(_) => write!(f, "<inline report>"),
        }
    }
}

/// Outcome of one end-to-end run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub topic: String,
    pub tasks: Vec<Task>,
    pub summaries: Vec<TaskSummary>,
    pub notes: Vec<String>,
    pub report: ReportHandle,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("Segmentation produced no tasks")]
    NoTasksProduced,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector memory error: {0}")]
    Vector(#[from] quarry_vector::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
