use crate::agents::EvidenceExtractor;
use crate::llm::{parse_json_reply, LLMClient};
use crate::memory::rank_evidence;
use crate::types::{truncate_chars, EvidenceItem, Page, Result, MAX_EXCERPT_CHARS};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Confidence given to a page snippet used in place of extracted claims.
pub const SNIPPET_FALLBACK_CONFIDENCE: f32 = 0.3;

/// Page text sent to the model is cut to this many characters.
pub const MAX_PAGE_CHARS: usize = 5000;

const SYSTEM_PROMPT: &str = "You are an extractor. Output JSON only.";

#[derive(Deserialize)]
struct RawClaim {
    #[serde(default)]
    claim: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    confidence: f32,
}

/// Extracts task-relevant claims from fetched pages with an LLM.
///
/// Pages without text are skipped. When the model call or its reply fails
/// for a page that has a snippet, the snippet stands in as a single
/// low-confidence claim.
pub struct LlmEvidenceExtractor {
    llm: Arc<dyn LLMClient>,
}

impl LlmEvidenceExtractor {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn prompt(task_text: &str, page: &Page, text: &str) -> String {
        format!(
            "Task: {}\n\nPage Title: {}\nURL: {}\n\nContent:\n'''{}'''\n\n\
             Extract only the information relevant to the task. \
             Return a JSON array where each item has: \
             claim (short sentence), excerpt (max {} chars), confidence (0-1). \
             If nothing is relevant, return [].",
            task_text,
            page.title,
            page.url,
            truncate_chars(text, MAX_PAGE_CHARS),
            MAX_EXCERPT_CHARS
        )
    }

    async fn extract_page(&self, task_text: &str, page: &Page, text: &str) -> Result<Vec<EvidenceItem>> {
        let reply = self
            .llm
            .generate_with_system(SYSTEM_PROMPT, &Self::prompt(task_text, page, text))
            .await?;
        let claims: Vec<RawClaim> = parse_json_reply(&reply)?;

        Ok(claims
            .into_iter()
            .filter(|c| !c.claim.trim().is_empty())
            .map(|c| EvidenceItem::new(&page.url, &page.title, c.claim, c.excerpt, c.confidence))
            .collect())
    }

    fn snippet_fallback(page: &Page) -> Option<EvidenceItem> {
        let snippet = page.snippet.trim();
        if snippet.is_empty() {
            return None;
        }
        let claim = truncate_chars(snippet, MAX_EXCERPT_CHARS);
        Some(EvidenceItem::new(
            &page.url,
            &page.title,
            claim.clone(),
            claim,
            SNIPPET_FALLBACK_CONFIDENCE,
        ))
    }
}

#[async_trait]
impl EvidenceExtractor for LlmEvidenceExtractor {
    async fn extract_evidence(&self, task_text: &str, pages: &[Page]) -> Result<Vec<EvidenceItem>> {
        let mut evidence = Vec::new();

        for page in pages {
            let Some(text) = page.text.as_deref().filter(|t| !t.trim().is_empty()) else {
                continue;
            };

            match self.extract_page(task_text, page, text).await {
                Ok(items) => evidence.extend(items),
                Err(e) => {
                    tracing::warn!(url = %page.url, error = %e, "Extraction failed");
                    evidence.extend(Self::snippet_fallback(page));
                }
            }
        }

        Ok(rank_evidence(evidence))
    }
}
