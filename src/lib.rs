//! # Quarry - research pipeline
//!
//! Quarry splits a free-text research request into independent tasks,
//! gathers evidence for each task from the web, summarizes it and writes a
//! Markdown report. Every stage that touches external content is a
//! constructor-injected collaborator, so the pipeline core runs the same way
//! against Ollama and DuckDuckGo as against test doubles.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use quarry::agents::{LlmEvidenceExtractor, LlmSummarizer, LlmTaskSplitter};
//! use quarry::report::MarkdownReportWriter;
//! use quarry::research::{Collaborators, Orchestrator};
//! use quarry::tools::{DaedraBackend, WebSearcher};
//! use quarry::QuarryConfig;
//! use std::sync::Arc;
//!
//! let config = QuarryConfig::load("quarry.toml")?;
//! let llm = quarry::llm::create_client(&config.llm)?;
//!
//! let orchestrator = Orchestrator::new(Collaborators {
//!     splitter: Some(Arc::new(LlmTaskSplitter::new(llm.clone()))),
//!     searcher: Arc::new(WebSearcher::new(Arc::new(DaedraBackend::new()), config.search.clone())),
//!     extractor: Arc::new(LlmEvidenceExtractor::new(llm.clone())),
//!     summarizer: Arc::new(LlmSummarizer::new(llm)),
//!     renderer: Arc::new(MarkdownReportWriter::new(&config.pipeline.output_dir)),
//! });
//!
//! let run = orchestrator.run("Top Rust parser libraries").await?;
//! println!("{}", run.report);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `local-embeddings` | fastembed embeddings for the long-term evidence archive |
//!
//! ## Modules
//!
//! - [`agents`] - Collaborator traits and LLM-backed implementations
//! - [`research`] - Task segmentation and the pipeline orchestrator
//! - [`memory`] - Per-run store and the long-term evidence archive
//! - [`tools`] - Web search and page fetch
//! - [`report`] - Markdown report rendering
//! - [`llm`] - LLM client implementations
//! - [`types`] - Common types and error handling

/// Pipeline collaborators.
pub mod agents;
/// Command-line interface helpers for the `quarry` binary.
pub mod cli;
/// LLM provider clients.
pub mod llm;
/// Run memory and long-term evidence archive.
pub mod memory;
/// Markdown report rendering.
pub mod report;
/// Task segmentation and pipeline orchestration.
pub mod research;
/// Web search tools.
pub mod tools;
/// Core types and error handling.
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{EvidenceExtractor, Renderer, Searcher, Summarizer, TaskSplitter};
pub use llm::LLMClient;
pub use memory::{Embedder, ShortTermStore};
pub use research::{Collaborators, Orchestrator, TaskSegmenter};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, QuarryConfig};
