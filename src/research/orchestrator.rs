//! Pipeline orchestration
//!
//! One [`Orchestrator::run`] segments the topic, pushes every task through
//! search, extraction and summarization, then renders the report. A failing
//! collaborator never aborts the run: the task still completes with whatever
//! it gathered, and the failure is logged and recorded as a run note.

use crate::agents::{EvidenceExtractor, Renderer, Searcher, Summarizer, TaskSplitter};
use crate::memory::{Embedder, EvidenceArchive, RecalledEvidence, ShortTermStore};
use crate::report::build_markdown;
use crate::research::segmenter::{SegmentStrategy, TaskSegmenter};
use crate::types::{AppError, EvidenceItem, ReportHandle, Result, RunReport, Task, TaskSummary};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use quarry_vector::VectorMemory;
use std::sync::Arc;
use tracing::{info, warn};

/// The collaborators a run depends on.
pub struct Collaborators {
    /// Semantic splitter. `None` uses the heuristic segmenter only.
    pub splitter: Option<Arc<dyn TaskSplitter>>,
    pub searcher: Arc<dyn Searcher>,
    pub extractor: Arc<dyn EvidenceExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub renderer: Arc<dyn Renderer>,
}

pub struct Orchestrator {
    segmenter: TaskSegmenter,
    searcher: Arc<dyn Searcher>,
    extractor: Arc<dyn EvidenceExtractor>,
    summarizer: Arc<dyn Summarizer>,
    renderer: Arc<dyn Renderer>,
    max_concurrency: usize,
    archive: Option<EvidenceArchive>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators) -> Self {
        let segmenter = match collaborators.splitter {
            Some(splitter) => TaskSegmenter::new(splitter),
            None => TaskSegmenter::heuristic_only(),
        };

        Self {
            segmenter,
            searcher: collaborators.searcher,
            extractor: collaborators.extractor,
            summarizer: collaborators.summarizer,
            renderer: collaborators.renderer,
            max_concurrency: 1,
            archive: None,
        }
    }

    /// Process up to `limit` tasks at once. Summaries keep registration
    /// order regardless. Values below 1 are treated as 1.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// Archive each run's evidence into `memory` after all tasks finish.
    pub fn with_archive(mut self, memory: VectorMemory, embedder: Arc<dyn Embedder>) -> Self {
        self.archive = Some(EvidenceArchive::new(memory, embedder));
        self
    }

    pub fn archive(&self) -> Option<&EvidenceArchive> {
        self.archive.as_ref()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Run the full pipeline for `topic`.
    ///
    /// Fails only for a blank topic. Collaborator failures degrade the
    /// affected task and are listed in [`RunReport::notes`].
    pub async fn run(&self, topic: &str) -> Result<RunReport> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::InvalidInput("Topic must not be empty".to_string()));
        }
        info!(topic, "Starting research run");

        let (tasks, strategy) = self.segmenter.segment(topic).await;
        if tasks.is_empty() {
            return Err(AppError::NoTasksProduced);
        }

        let store = Mutex::new(ShortTermStore::new());
        {
            let mut store = store.lock();
            if strategy == SegmentStrategy::Heuristic {
                store.add_note("Tasks were produced by heuristic segmentation");
            }
            for task in &tasks {
                store.add_task(task.id.clone(), task.text.clone())?;
            }
        }
        info!(tasks = tasks.len(), ?strategy, "Registered tasks");

        let registered: Vec<Task> = store.lock().tasks().to_vec();
        let summaries: Vec<TaskSummary> = stream::iter(registered.iter())
            .map(|task| self.process_task(&store, task))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        self.archive_evidence(topic, &store).await;

        let report = match self.renderer.render(topic, &summaries).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "Rendering failed, keeping report inline");
                store.lock().add_note(format!("Rendering failed: {}", e));
                ReportHandle::Inline(build_markdown(topic, &summaries, Utc::now()))
            }
        };

        let store = store.into_inner();
        info!(report = %report, notes = store.notes().len(), "Research run complete");

        Ok(RunReport {
            topic: topic.to_string(),
            tasks: store.tasks().to_vec(),
            summaries,
            notes: store.notes().to_vec(),
            report,
        })
    }

    /// Search, extract and summarize one task, then mark it done.
    async fn process_task(&self, store: &Mutex<ShortTermStore>, task: &Task) -> TaskSummary {
        info!(task_id = %task.id, task = %task.text, "Processing task");

        let pages = match self.searcher.search_for_task(&task.text).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Search failed");
                store
                    .lock()
                    .add_note(format!("Task {}: search failed: {}", task.id, e));
                Vec::new()
            }
        };

        match self.extractor.extract_evidence(&task.text, &pages).await {
            Ok(items) => {
                let mut store = store.lock();
                for item in items {
                    store.add_evidence(&task.id, item);
                }
            }
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Evidence extraction failed");
                store
                    .lock()
                    .add_note(format!("Task {}: evidence extraction failed: {}", task.id, e));
            }
        }

        let evidence = store.lock().evidence(&task.id).to_vec();
        info!(task_id = %task.id, pages = pages.len(), evidence = evidence.len(), "Evidence gathered");

        let summary = match self.summarizer.summarize(&task.text, &evidence).await {
            Ok(mut summary) => {
                summary.task_id = task.id.clone();
                summary.task = task.text.clone();
                summary
            }
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Summarization failed, using fallback");
                store
                    .lock()
                    .add_note(format!("Task {}: summarization failed: {}", task.id, e));
                TaskSummary::fallback(task, &evidence)
            }
        };

        store.lock().set_task_done(&task.id);
        summary
    }

    async fn archive_evidence(&self, topic: &str, store: &Mutex<ShortTermStore>) {
        let Some(archive) = &self.archive else {
            return;
        };

        let evidence: Vec<(Task, Vec<EvidenceItem>)> = {
            let store = store.lock();
            store
                .tasks()
                .iter()
                .map(|t| (t.clone(), store.evidence(&t.id).to_vec()))
                .collect()
        };

        match archive.archive_run(topic, &evidence).await {
            Ok(written) => info!(records = written, "Evidence archived"),
            Err(e) => {
                warn!(error = %e, "Evidence archive failed");
                store
                    .lock()
                    .add_note(format!("Evidence archive failed: {}", e));
            }
        }
    }

    /// Archived evidence from earlier runs closest to `text`.
    ///
    /// Empty when no archive is attached or it is unavailable.
    pub async fn recall(&self, text: &str, k: usize) -> Result<Vec<RecalledEvidence>> {
        match &self.archive {
            Some(archive) => archive.recall(text, k).await,
            None => Ok(Vec::new()),
        }
    }
}
