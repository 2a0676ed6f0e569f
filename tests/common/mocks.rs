//! Mock collaborators for pipeline tests.
//!
//! Each mock is configured through its constructor and records what it was
//! called with, so tests can assert on both results and interactions.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use quarry::agents::{EvidenceExtractor, Renderer, Searcher, Summarizer, TaskSplitter};
use quarry::memory::Embedder;
use quarry::types::{
    AppError, ClaimRef, EvidenceItem, Page, ReportHandle, Result, SplitTask, TaskSummary,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Splitter returning a fixed task list, or failing.
pub struct MockSplitter {
    tasks: Vec<SplitTask>,
    should_fail: bool,
}

impl MockSplitter {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            tasks: texts.iter().map(|t| SplitTask::new(None, *t)).collect(),
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            tasks: Vec::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl TaskSplitter for MockSplitter {
    async fn split_into_tasks(&self, _text: &str) -> Result<Vec<SplitTask>> {
        if self.should_fail {
            return Err(AppError::LLM("Mock splitter failure".to_string()));
        }
        Ok(self.tasks.clone())
    }
}

/// Searcher returning two pages per task, failing for selected task texts.
#[derive(Default)]
pub struct MockSearcher {
    fail_for: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(texts: &[&str]) -> Self {
        Self {
            fail_for: texts.iter().map(|t| t.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

pub fn page_url(task_text: &str, n: usize) -> String {
    format!("https://example.com/{}/{}", task_text.replace(' ', "-"), n)
}

#[async_trait]
impl Searcher for MockSearcher {
    async fn search_for_task(&self, task_text: &str) -> Result<Vec<Page>> {
        self.calls.lock().push(task_text.to_string());
        if self.fail_for.contains(task_text) {
            return Err(AppError::Search("Mock search failure".to_string()));
        }
        Ok((1..=2)
            .map(|n| Page {
                url: page_url(task_text, n),
                title: format!("{} page {}", task_text, n),
                snippet: format!("snippet {}", n),
                text: Some(format!("text about {}", task_text)),
            })
            .collect())
    }
}

/// Extractor producing one claim per page, with confidence rising by page.
#[derive(Default)]
pub struct MockExtractor {
    should_fail: bool,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl EvidenceExtractor for MockExtractor {
    async fn extract_evidence(&self, task_text: &str, pages: &[Page]) -> Result<Vec<EvidenceItem>> {
        if self.should_fail {
            return Err(AppError::LLM("Mock extractor failure".to_string()));
        }
        Ok(pages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                EvidenceItem::new(
                    &p.url,
                    &p.title,
                    format!("claim {} for {}", i + 1, task_text),
                    &p.snippet,
                    0.4 + 0.2 * i as f32,
                )
            })
            .collect())
    }
}

/// Summarizer that fails for selected task texts and can delay per task.
#[derive(Default)]
pub struct MockSummarizer {
    fail_for: HashSet<String>,
    delays: Vec<(String, Duration)>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub evidence_seen: Mutex<Vec<(String, usize)>>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(texts: &[&str]) -> Self {
        Self {
            fail_for: texts.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_delays(delays: &[(&str, u64)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(t, ms)| (t.to_string(), Duration::from_millis(*ms)))
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, task_text: &str, evidence: &[EvidenceItem]) -> Result<TaskSummary> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.evidence_seen
            .lock()
            .push((task_text.to_string(), evidence.len()));

        if let Some((_, delay)) = self.delays.iter().find(|(t, _)| t == task_text) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_for.contains(task_text) {
            return Err(AppError::LLM("Mock summarizer failure".to_string()));
        }
        Ok(TaskSummary {
            task_id: String::new(),
            task: String::new(),
            summary: format!("Summary of {}", task_text),
            top_claims: evidence
                .iter()
                .take(1)
                .map(|e| ClaimRef {
                    claim: e.claim.clone(),
                    source: e.source_url.clone(),
                })
                .collect(),
            uncertainties: vec!["mock uncertainty".to_string()],
            degraded: false,
        })
    }
}

/// Renderer recording the summaries it receives.
#[derive(Default)]
pub struct MockRenderer {
    should_fail: bool,
    pub rendered: Mutex<Vec<(String, Vec<TaskSummary>)>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, topic: &str, summaries: &[TaskSummary]) -> Result<ReportHandle> {
        self.rendered
            .lock()
            .push((topic.to_string(), summaries.to_vec()));
        if self.should_fail {
            return Err(AppError::Render("Mock renderer failure".to_string()));
        }
        Ok(ReportHandle::File(PathBuf::from(format!(
            "reports/{}.md",
            topic.replace(' ', "_")
        ))))
    }
}

/// Embeds text as character-count features over a fixed alphabet.
pub struct MockEmbedder;

pub const MOCK_EMBEDDING_DIM: usize = 4;

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                ['a', 'e', 'i', 'o']
                    .iter()
                    .map(|c| t.chars().filter(|x| x == c).count() as f32)
                    .collect()
            })
            .collect())
    }
}
