//! Pipeline collaborators.
//!
//! The orchestrator only talks to these traits. Each one is a narrow
//! contract over something that touches external content:
//!
//! | Trait | Stage |
//! |-------|-------|
//! | [`TaskSplitter`] | semantic split of the request into tasks |
//! | [`Searcher`] | candidate pages for a task |
//! | [`EvidenceExtractor`] | claims with provenance from pages |
//! | [`Summarizer`] | per-task summary from evidence |
//! | [`Renderer`] | final document from ordered summaries |
//!
//! LLM-backed implementations live in the submodules. The web searcher is
//! in [`crate::tools::search`] and the Markdown renderer in [`crate::report`].

pub mod extractor;
pub mod splitter;
pub mod summarizer;

pub use extractor::{LlmEvidenceExtractor, SNIPPET_FALLBACK_CONFIDENCE};
pub use splitter::LlmTaskSplitter;
pub use summarizer::LlmSummarizer;

use crate::types::{EvidenceItem, Page, ReportHandle, Result, SplitTask, TaskSummary};
use async_trait::async_trait;

/// Splits free text into task descriptors. May fail or be unavailable.
#[async_trait]
pub trait TaskSplitter: Send + Sync {
    async fn split_into_tasks(&self, text: &str) -> Result<Vec<SplitTask>>;
}

/// Finds candidate pages for a task.
///
/// Implementations deduplicate by URL and cap the number of pages.
#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search_for_task(&self, task_text: &str) -> Result<Vec<Page>>;
}

#[async_trait]
pub trait EvidenceExtractor: Send + Sync {
    async fn extract_evidence(&self, task_text: &str, pages: &[Page]) -> Result<Vec<EvidenceItem>>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `evidence` for one task. The returned summary's `task_id`
    /// and `task` fields are overwritten by the caller.
    async fn summarize(&self, task_text: &str, evidence: &[EvidenceItem]) -> Result<TaskSummary>;
}

/// Produces the final document and hands back a reference to it.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, topic: &str, summaries: &[TaskSummary]) -> Result<ReportHandle>;
}
