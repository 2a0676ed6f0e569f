//! External content tools
//!
//! - [`search`] - web search and page fetch behind the [`crate::agents::Searcher`] contract

pub mod search;

pub use search::{DaedraBackend, SearchBackend, SearchHit, WebSearcher};
