use crate::agents::TaskSplitter;
use crate::llm::{parse_json_reply, LLMClient};
use crate::types::{AppError, Result, SplitTask};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You break research requests into small, independent research tasks.";

/// Semantic task splitter that asks an LLM for a JSON task list.
pub struct LlmTaskSplitter {
    llm: Arc<dyn LLMClient>,
}

/// One entry of the model's reply. Ids may come back as numbers.
#[derive(Deserialize)]
struct RawTask {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    text: String,
}

impl LlmTaskSplitter {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn prompt(text: &str) -> String {
        format!(
            r#"Split the following request into small, independent research tasks.
Return only a JSON array of objects with keys "id" and "text".

Request:
{}"#,
            text
        )
    }

    /// Parse a model reply into split entries.
    pub fn parse_reply(reply: &str) -> Result<Vec<SplitTask>> {
        let raw: Vec<RawTask> = parse_json_reply(reply)?;
        raw.into_iter()
            .map(|entry| {
                let id = match entry.id {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    Some(other) => {
                        return Err(AppError::LLM(format!("Unsupported task id: {}", other)))
                    }
                };
                Ok(SplitTask {
                    id,
                    text: entry.text,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TaskSplitter for LlmTaskSplitter {
    async fn split_into_tasks(&self, text: &str) -> Result<Vec<SplitTask>> {
        let reply = self
            .llm
            .generate_with_system(SYSTEM_PROMPT, &Self::prompt(text))
            .await?;
        Self::parse_reply(&reply)
    }
}
