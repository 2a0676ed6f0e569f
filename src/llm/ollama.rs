use crate::llm::client::LLMClient;
use crate::llm::Endpoint;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    Ollama,
};
use std::time::Duration;

pub struct OllamaClient {
    client: Ollama,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a client for `base_url`. The URL is validated here, not on the
    /// first request.
    pub fn new(base_url: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = Endpoint::parse(base_url)?;
        let model = model.into();
        if model.trim().is_empty() {
            return Err(AppError::InvalidInput("LLM model name is empty".to_string()));
        }

        let url = format!("{}://{}:{}", endpoint.scheme, endpoint.host, endpoint.port);
        let client = Ollama::try_new(url.as_str()).map_err(|e| {
            AppError::InvalidInput(format!("Invalid LLM base URL '{}': {}", base_url, e))
        })?;

        Ok(Self {
            client,
            model,
            timeout,
        })
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = tokio::time::timeout(self.timeout, self.client.send_chat_messages(request))
            .await
            .map_err(|_| {
                AppError::LLM(format!("Ollama request timed out after {:?}", self.timeout))
            })?
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt.to_string())]).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
