//! LLM provider clients
//!
//! - [`LLMClient`] - the trait every provider implements
//! - [`create_client`] - builds the configured provider from `[llm]` settings
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)

/// Core LLM client trait and reply parsing helpers.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{parse_json_reply, strip_code_fences, LLMClient};

#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;

use crate::types::{AppError, Result};
use crate::utils::toml_config::LlmConfig;
use std::sync::Arc;

const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// A parsed `http(s)://host[:port]` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Parse a base URL. A trailing path is ignored and a missing port
    /// defaults to Ollama's.
    pub fn parse(base_url: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            AppError::InvalidInput(format!("Invalid LLM base URL '{}': {}", base_url, reason))
        };

        let (scheme, rest) = base_url
            .trim()
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;
        if scheme != "http" && scheme != "https" {
            return Err(invalid("scheme must be http or https"));
        }

        let authority = rest.split('/').next().unwrap_or_default();
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| invalid("bad port"))?;
                (host, port)
            }
            None => (authority, DEFAULT_OLLAMA_PORT),
        };
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        })
    }
}

/// Build the LLM client described by `config`.
#[cfg(feature = "ollama")]
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LLMClient>> {
    let client = OllamaClient::new(&config.base_url, config.model.clone(), config.timeout())?;
    tracing::info!(model = %config.model, url = %config.base_url, "Created Ollama client");
    Ok(Arc::new(client))
}

#[cfg(not(feature = "ollama"))]
pub fn create_client(_config: &LlmConfig) -> Result<Arc<dyn LLMClient>> {
    Err(AppError::LLM(
        "No LLM provider compiled in. Rebuild with the 'ollama' feature.".to_string(),
    ))
}
