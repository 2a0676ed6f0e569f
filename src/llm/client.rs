//! LLM client abstraction
//!
//! Collaborators that prompt a model depend on [`LLMClient`] only, so tests
//! pass a scripted client and the binary passes the configured provider.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Remove a surrounding Markdown code fence (```json ... ```) if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a model reply as JSON after stripping code fences.
pub fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let body = strip_code_fences(raw);
    serde_json::from_str(body)
        .map_err(|e| AppError::LLM(format!("Could not parse model reply as JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_with_language() {
        let raw = "```json\n[{\"id\": \"t1\"}]\n```";
        assert_eq!(strip_code_fences(raw), "[{\"id\": \"t1\"}]");
    }

    #[test]
    fn test_strip_code_fences_plain() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_parse_json_reply_error_is_llm() {
        let result: Result<Vec<String>> = parse_json_reply("no json here");
        assert!(matches!(result, Err(AppError::LLM(_))));
    }
}
