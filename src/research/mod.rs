//! Research pipeline
//!
//! - [`segmenter::TaskSegmenter`] - turns a request into ordered tasks
//! - [`orchestrator::Orchestrator`] - runs segment, search, extract,
//!   summarize and render for one topic
//!
//! # Usage
//!
//! ```ignore
//! use quarry::research::{Collaborators, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(Collaborators {
//!     splitter: Some(splitter),
//!     searcher,
//!     extractor,
//!     summarizer,
//!     renderer,
//! })
//! .with_max_concurrency(2);
//!
//! let run = orchestrator.run("Top Rust parser libraries").await?;
//! println!("Report: {}", run.report);
//! ```

pub mod orchestrator;
pub mod segmenter;

pub use orchestrator::{Collaborators, Orchestrator};
pub use segmenter::{SegmentStrategy, TaskSegmenter};
