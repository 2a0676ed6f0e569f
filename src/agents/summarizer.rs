use crate::agents::Summarizer;
use crate::llm::{parse_json_reply, LLMClient};
use crate::memory::rank_evidence;
use crate::types::{EvidenceItem, Result, TaskSummary};
use async_trait::async_trait;
use std::sync::Arc;

/// Evidence items included in the summarization prompt.
pub const MAX_PROMPT_EVIDENCE: usize = 8;

const SYSTEM_PROMPT: &str = "You are an expert summarizer. Output JSON only.";

/// Summarizes a task's evidence with an LLM.
///
/// Errors are returned as-is; the orchestrator builds the fallback summary.
pub struct LlmSummarizer {
    llm: Arc<dyn LLMClient>,
}

impl LlmSummarizer {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn prompt(task_text: &str, evidence: &[EvidenceItem]) -> String {
        let lines: Vec<String> = rank_evidence(evidence.to_vec())
            .into_iter()
            .take(MAX_PROMPT_EVIDENCE)
            .map(|e| {
                let text = if e.claim.is_empty() { &e.excerpt } else { &e.claim };
                format!("- {} (source: {})", text, e.source_url)
            })
            .collect();

        format!(
            "Task: {}\n\nEvidence:\n{}\n\n\
             Summarize findings relevant to this task.\n\
             Return a JSON object with keys:\n\
             - summary: 2-3 sentences overview\n\
             - top_claims: array of {{claim, source}}\n\
             - uncertainties: list of weak or unverified points\n",
            task_text,
            lines.join("\n")
        )
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, task_text: &str, evidence: &[EvidenceItem]) -> Result<TaskSummary> {
        let reply = self
            .llm
            .generate_with_system(SYSTEM_PROMPT, &Self::prompt(task_text, evidence))
            .await?;
        let mut summary: TaskSummary = parse_json_reply(&reply)?;
        summary.task = task_text.to_string();
        summary.degraded = false;
        Ok(summary)
    }
}
