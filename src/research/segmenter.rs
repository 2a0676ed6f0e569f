//! Task segmentation
//!
//! A request is split by a semantic [`TaskSplitter`] when one is configured.
//! Whenever that path is missing, fails, or yields nothing usable, the
//! deterministic [`TaskSegmenter::fallback`] heuristic is used instead.

use crate::agents::TaskSplitter;
use crate::types::{AppError, Result, SplitTask, Task};
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

/// Fragments shorter than this (in characters, before trimming) are dropped
/// unless they are the last fragment.
pub const MIN_FRAGMENT_CHARS: usize = 15;

static CLAUSE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\n+|;|\?|\band\b").expect("clause pattern compiles"));

const SENTENCE_SPLIT: &str = ". ";

/// Which strategy produced a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    Semantic,
    Heuristic,
}

pub struct TaskSegmenter {
    splitter: Option<Arc<dyn TaskSplitter>>,
}

impl TaskSegmenter {
    pub fn new(splitter: Arc<dyn TaskSplitter>) -> Self {
        Self {
            splitter: Some(splitter),
        }
    }

    /// A segmenter that never calls out and always uses the heuristic.
    pub fn heuristic_only() -> Self {
        Self { splitter: None }
    }

    /// Split `text` into tasks.
    ///
    /// Never fails: any problem with the semantic splitter falls through to
    /// the heuristic. Blank input yields no tasks.
    pub async fn segment(&self, text: &str) -> (Vec<Task>, SegmentStrategy) {
        let Some(splitter) = &self.splitter else {
            return (Self::fallback(text), SegmentStrategy::Heuristic);
        };

        let primary = match splitter.split_into_tasks(text).await {
            Ok(raw) => Self::normalize(raw),
            Err(e) => Err(e),
        };

        match primary {
            Ok(tasks) => {
                tracing::debug!(tasks = tasks.len(), "Semantic split succeeded");
                (tasks, SegmentStrategy::Semantic)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Semantic split unusable, using heuristic");
                (Self::fallback(text), SegmentStrategy::Heuristic)
            }
        }
    }

    /// Turn raw splitter output into tasks.
    ///
    /// Entries with blank text are skipped. Missing ids become `t<position>`
    /// where position is the 1-based index in `raw`. Fails with
    /// [`AppError::NoTasksProduced`] if nothing survives and with
    /// [`AppError::DuplicateTaskId`] if two entries share an id.
    pub fn normalize(raw: Vec<SplitTask>) -> Result<Vec<Task>> {
        let mut seen = HashSet::new();
        let mut tasks = Vec::with_capacity(raw.len());

        for (idx, entry) in raw.into_iter().enumerate() {
            let text = entry.text.trim();
            if text.is_empty() {
                continue;
            }
            let id = entry
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("t{}", idx + 1));
            if !seen.insert(id.clone()) {
                return Err(AppError::DuplicateTaskId(id));
            }
            tasks.push(Task::new(id, text));
        }

        if tasks.is_empty() {
            return Err(AppError::NoTasksProduced);
        }
        Ok(tasks)
    }

    /// Deterministic heuristic split.
    ///
    /// Splits on newlines, `;`, `?` and the standalone word "and". A single fragment is
    /// re-split on ". ". Fragments shorter than [`MIN_FRAGMENT_CHARS`] are
    /// dropped unless last. Ids run `t1..tn`.
    pub fn fallback(text: &str) -> Vec<Task> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut fragments: Vec<&str> = split_clauses(trimmed)
            .into_iter()
            .filter(|f| !f.trim().is_empty())
            .collect();
        if fragments.len() == 1 {
            fragments = trimmed
                .split(SENTENCE_SPLIT)
                .filter(|f| !f.trim().is_empty())
                .collect();
        }

        let last = fragments.len().saturating_sub(1);
        let kept: Vec<&str> = fragments
            .into_iter()
            .enumerate()
            .filter(|(i, f)| *i == last || f.chars().count() >= MIN_FRAGMENT_CHARS)
            .map(|(_, f)| f.trim())
            .collect();

        if kept.is_empty() {
            return vec![Task::new("t1", trimmed)];
        }

        kept.into_iter()
            .enumerate()
            .map(|(i, f)| Task::new(format!("t{}", i + 1), f))
            .collect()
    }
}

/// Split on newlines, `;`, `?` and "and" standing alone between whitespace.
///
/// Cuts happen at the separator's edges, so surrounding whitespace stays on
/// the fragments.
fn split_clauses(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;

    for m in CLAUSE_SPLIT.find_iter(text) {
        if m.as_str().eq_ignore_ascii_case("and") && !stands_alone(text, m.start(), m.end()) {
            continue;
        }
        fragments.push(&text[start..m.start()]);
        start = m.end();
    }
    fragments.push(&text[start..]);
    fragments
}

/// True when `text[start..end]` has whitespace or a string edge on both sides.
fn stands_alone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace)
}
