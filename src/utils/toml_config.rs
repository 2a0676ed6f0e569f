//! TOML-based configuration for Quarry
//!
//! All settings live in one file (`quarry.toml`). Every field has a default,
//! so an empty file is a valid configuration. `QUARRY_LLM_URL` and
//! `QUARRY_LLM_MODEL` override the `[llm]` section.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "quarry.toml";

/// Environment variable overriding `llm.base_url`.
pub const ENV_LLM_URL: &str = "QUARRY_LLM_URL";
/// Environment variable overriding `llm.model`.
pub const ENV_LLM_MODEL: &str = "QUARRY_LLM_MODEL";

/// Root configuration structure loaded from quarry.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarryConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Long-term evidence archive
    #[serde(default)]
    pub memory: MemoryConfig,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

// ============= Search Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hits requested per query variation
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Pages kept per task after deduplication
    #[serde(default = "default_max_pages")]
    pub max_pages_per_task: usize,

    /// Fetch page text for each kept page
    #[serde(default = "default_fetch_pages")]
    pub fetch_pages: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_pages_per_task: default_max_pages(),
            fetch_pages: default_fetch_pages(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_max_pages() -> usize {
    6
}

fn default_fetch_pages() -> bool {
    true
}

// ============= Pipeline Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Tasks processed at once. 1 means strictly sequential.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_max_concurrency() -> usize {
    1
}

// ============= Memory Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Archive evidence into the vector index after each run
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_dimension")]
    pub dimension: usize,

    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dimension: default_dimension(),
            index_path: default_index_path(),
        }
    }
}

fn default_dimension() -> usize {
    384
}

fn default_index_path() -> PathBuf {
    PathBuf::from("data/memory.json")
}

// ============= Errors =============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' is set but empty")]
    MissingEnvVar(String),
}

impl QuarryConfig {
    /// Load configuration from a TOML file, apply environment overrides and
    /// validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file and apply environment overrides without validating.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse TOML without overrides or validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `QUARRY_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_LLM_URL) {
            if url.trim().is_empty() {
                return Err(ConfigError::MissingEnvVar(ENV_LLM_URL.to_string()));
            }
            self.llm.base_url = url;
        }
        if let Some(model) = lookup(ENV_LLM_MODEL) {
            if model.trim().is_empty() {
                return Err(ConfigError::MissingEnvVar(ENV_LLM_MODEL.to_string()));
            }
            self.llm.model = model;
        }
        Ok(())
    }

    /// Validate the configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(problems.join("; ")))
        }
    }

    /// Every validation problem, in section order. Empty when valid.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Err(e) = crate::llm::Endpoint::parse(&self.llm.base_url) {
            problems.push(e.to_string());
        }
        if self.llm.model.trim().is_empty() {
            problems.push("llm.model must not be empty".to_string());
        }

        let positive = [
            ("llm.timeout_secs", self.llm.timeout_secs as usize),
            ("search.top_k", self.search.top_k),
            ("search.max_pages_per_task", self.search.max_pages_per_task),
            ("pipeline.max_concurrency", self.pipeline.max_concurrency),
            ("memory.dimension", self.memory.dimension),
        ];
        problems.extend(
            positive
                .into_iter()
                .filter(|(_, value)| *value == 0)
                .map(|(name, _)| format!("{} must be greater than zero", name)),
        );

        if self.pipeline.output_dir.as_os_str().is_empty() {
            problems.push("pipeline.output_dir must not be empty".to_string());
        }

        problems
    }
}

/// Commented configuration written by `quarry init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# Quarry configuration

[logging]
# Filter directive; RUST_LOG takes precedence
level = "info"
json = false

[llm]
# Overridden by QUARRY_LLM_URL / QUARRY_LLM_MODEL
base_url = "http://localhost:11434"
model = "llama3.2"
timeout_secs = 120

[search]
# Hits per query variation
top_k = 5
max_pages_per_task = 6
fetch_pages = true

[pipeline]
output_dir = "reports"
# 1 processes tasks strictly one after another
max_concurrency = 1

[memory]
# Archive claims into a local vector index (needs the local-embeddings feature)
enabled = false
dimension = 384
index_path = "data/memory.json"
"#;
