//! Markdown report rendering
//!
//! [`build_markdown`] lays out the report; [`MarkdownReportWriter`] writes it
//! to `<output_dir>/<slug>.md` as the pipeline's [`Renderer`].

use crate::agents::Renderer;
use crate::types::{AppError, ReportHandle, Result, TaskSummary};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Maximum length of a report file stem, in characters.
pub const MAX_SLUG_CHARS: usize = 60;

/// Build the Markdown report for `topic`.
pub fn build_markdown(topic: &str, summaries: &[TaskSummary], generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(md, "# Research Report: {}\n", topic);
    let _ = writeln!(
        md,
        "_Generated: {}_\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    md.push_str("## Executive Summary\n\n");
    for summary in summaries {
        let _ = writeln!(md, "- {}", summary.summary);
    }

    md.push_str("\n## Findings by Subtask\n");
    for (i, summary) in summaries.iter().enumerate() {
        let title = if summary.task.is_empty() {
            "Unnamed Task"
        } else {
            summary.task.as_str()
        };
        let _ = writeln!(md, "\n### {}. {}\n", i + 1, title);
        let _ = writeln!(md, "**Summary:** {}", summary.summary);

        if !summary.top_claims.is_empty() {
            md.push_str("\n**Top Claims:**\n\n");
            for claim in &summary.top_claims {
                let _ = writeln!(md, "- {}  \n  _source: {}_", claim.claim, claim.source);
            }
        }

        if !summary.uncertainties.is_empty() {
            md.push_str("\n**Uncertainties / To Verify:**\n\n");
            for item in &summary.uncertainties {
                let _ = writeln!(md, "- {}", item);
            }
        }
    }

    md.push_str("\n## Appendix\n\n");
    md.push_str(
        "- **Methodology:** Task decomposition, web search, evidence extraction, summarization, report writing\n",
    );
    md.push_str(
        "- **Limitations:** Limited sources, possible LLM hallucinations, freshness of web data\n",
    );

    md
}

/// File stem for a topic: lowercase, spaces to `_`, other unsafe characters
/// to `_`, at most [`MAX_SLUG_CHARS`] characters.
pub fn slug(topic: &str) -> String {
    let slug: String = topic
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_SLUG_CHARS)
        .collect();

    if slug.is_empty() || slug.chars().all(|c| c == '.') {
        "report".to_string()
    } else {
        slug
    }
}

/// Writes Markdown reports into a directory.
pub struct MarkdownReportWriter {
    output_dir: PathBuf,
}

impl MarkdownReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the report for `topic` is written to.
    pub fn report_path(&self, topic: &str) -> PathBuf {
        self.output_dir.join(format!("{}.md", slug(topic)))
    }
}

#[async_trait]
impl Renderer for MarkdownReportWriter {
    async fn render(&self, topic: &str, summaries: &[TaskSummary]) -> Result<ReportHandle> {
        let markdown = build_markdown(topic, summaries, Utc::now());
        let path = self.report_path(topic);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::Render(format!("Cannot create {}: {}", self.output_dir.display(), e)))?;
        tokio::fs::write(&path, markdown)
            .await
            .map_err(|e| AppError::Render(format!("Cannot write {}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), "Markdown report saved");
        Ok(ReportHandle::File(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClaimRef;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn summary(task: &str, text: &str) -> TaskSummary {
        TaskSummary {
            task_id: String::new(),
            task: task.to_string(),
            summary: text.to_string(),
            top_claims: vec![ClaimRef {
                claim: "nom is widely used".to_string(),
                source: "https://github.com/rust-bakery/nom".to_string(),
            }],
            uncertainties: vec!["download numbers".to_string()],
            degraded: false,
        }
    }

    #[test]
    fn test_build_markdown_sections_in_order() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let md = build_markdown(
            "Rust parsers",
            &[summary("Find libraries", "First."), summary("check GitHub", "Second.")],
            at,
        );

        assert!(md.starts_with("# Research Report: Rust parsers\n"));
        assert!(md.contains("_Generated: 2026-01-02T03:04:05Z_"));
        assert!(md.contains("- First.\n- Second.\n"));
        let first = md.find("### 1. Find libraries").unwrap();
        let second = md.find("### 2. check GitHub").unwrap();
        assert!(first < second);
        assert!(md.contains("_source: https://github.com/rust-bakery/nom_"));
        assert!(md.contains("- download numbers"));
        assert!(md.contains("## Appendix"));
    }

    #[test]
    fn test_build_markdown_skips_empty_sections() {
        let mut s = summary("", "Only text.");
        s.top_claims.clear();
        s.uncertainties.clear();
        let md = build_markdown("t", &[s], Utc::now());
        assert!(md.contains("### 1. Unnamed Task"));
        assert!(!md.contains("**Top Claims:**"));
        assert!(!md.contains("**Uncertainties"));
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Top React Native libraries"), "top_react_native_libraries");
        assert_eq!(slug("a/b\\c:d"), "a_b_c_d");
        assert_eq!(slug(&"x".repeat(100)).len(), MAX_SLUG_CHARS);
        assert_eq!(slug("   "), "report");
        assert_eq!(slug(".."), "report");
    }

    #[tokio::test]
    async fn test_writer_creates_file() {
        let dir = TempDir::new().unwrap();
        let writer = MarkdownReportWriter::new(dir.path().join("reports"));

        let handle = writer
            .render("Rust Parsers", &[summary("Find libraries", "First.")])
            .await
            .unwrap();

        let expected = dir.path().join("reports").join("rust_parsers.md");
        assert_eq!(handle, ReportHandle::File(expected.clone()));
        let content = std::fs::read_to_string(expected).unwrap();
        assert!(content.contains("### 1. Find libraries"));
    }

    #[tokio::test]
    async fn test_writer_reports_render_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();

        let writer = MarkdownReportWriter::new(&blocker);
        let result = writer.render("topic", &[]).await;
        assert!(matches!(result, Err(AppError::Render(_))));
    }
}
