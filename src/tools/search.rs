//! Web search for research tasks
//!
//! [`WebSearcher`] turns a task into a few query variations, merges the hits
//! by URL, caps the page count and optionally fetches page text. The raw
//! search and fetch calls go through [`SearchBackend`]; [`DaedraBackend`]
//! uses the daedra crate, which searches DuckDuckGo.

use crate::agents::Searcher;
use crate::types::{AppError, Page, Result};
use crate::utils::toml_config::SearchConfig;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// A single search engine hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Raw search and page fetch.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>>;

    /// Fetch readable page text. `Ok(None)` when the page has no content.
    async fn fetch_text(&self, url: &str) -> Result<Option<String>>;
}

/// Search backend powered by daedra
#[derive(Debug, Default, Clone, Copy)]
pub struct DaedraBackend;

impl DaedraBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchBackend for DaedraBackend {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .map(|r| SearchHit {
                url: r.url.clone(),
                title: r.title.clone(),
                snippet: r.description.clone(),
            })
            .collect())
    }

    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector: None,
        };

        let page = daedra::tools::fetch::fetch_page(&fetch_args)
            .await
            .map_err(|e| AppError::Search(format!("Failed to fetch page: {}", e)))?;

        let content = page.content.trim();
        Ok((!content.is_empty()).then(|| content.to_string()))
    }
}

/// [`Searcher`] that queries a [`SearchBackend`] with several phrasings of
/// the task.
pub struct WebSearcher {
    backend: Arc<dyn SearchBackend>,
    config: SearchConfig,
}

impl WebSearcher {
    pub fn new(backend: Arc<dyn SearchBackend>, config: SearchConfig) -> Self {
        Self { backend, config }
    }

    /// Query strings tried for `task_text`, in order.
    pub fn query_variations(task_text: &str) -> Vec<String> {
        let task = task_text.trim();
        vec![
            task.to_string(),
            format!("{} overview", task),
            format!("{} site:github.com", task),
        ]
    }
}

#[async_trait]
impl Searcher for WebSearcher {
    async fn search_for_task(&self, task_text: &str) -> Result<Vec<Page>> {
        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        let mut failures = 0;
        let queries = Self::query_variations(task_text);

        for query in &queries {
            let hits = match self.backend.search(query, self.config.top_k).await {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Search query failed");
                    failures += 1;
                    continue;
                }
            };

            for hit in hits {
                if hit.url.is_empty() || !seen.insert(hit.url.clone()) {
                    continue;
                }
                pages.push(Page {
                    url: hit.url,
                    title: hit.title,
                    snippet: hit.snippet,
                    text: None,
                });
            }
        }

        if failures == queries.len() {
            return Err(AppError::Search(format!(
                "All {} queries failed for task",
                queries.len()
            )));
        }

        pages.truncate(self.config.max_pages_per_task);

        if self.config.fetch_pages {
            let texts = join_all(pages.iter().map(|p| self.backend.fetch_text(&p.url))).await;
            for (page, text) in pages.iter_mut().zip(texts) {
                page.text = text.unwrap_or_else(|e| {
                    tracing::debug!(url = %page.url, error = %e, "Page fetch failed");
                    None
                });
            }
        }

        tracing::debug!(pages = pages.len(), "Collected search results");
        Ok(pages)
    }
}
