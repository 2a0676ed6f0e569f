//! Colored output helpers for CLI
//!
//! Consistent terminal output for the `quarry` binary. Every helper has a
//! plain-text form for `--no-color` and non-terminal use.

use crate::types::{Task, TaskStatus, TaskSummary};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n  {} {}",
                "quarry".bright_cyan().bold(),
                version.dimmed()
            );
        } else {
            println!("\n  quarry {}", version);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print one task with its id and status
    pub fn task(&self, task: &Task) {
        let status = match task.status {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        };
        if self.colored {
            println!(
                "    {} {} {}",
                format!("{:>4}", task.id).bright_cyan().bold(),
                task.text,
                format!("({})", status).dimmed()
            );
        } else {
            println!("    {:>4} {} ({})", task.id, task.text, status);
        }
    }

    /// Print the headline of a task summary
    pub fn summary(&self, summary: &TaskSummary) {
        let marker = if summary.degraded { " [fallback]" } else { "" };
        if self.colored {
            println!(
                "    {} {}{}",
                format!("{:>4}", summary.task_id).bright_cyan().bold(),
                summary.summary,
                marker.yellow()
            );
        } else {
            println!("    {:>4} {}{}", summary.task_id, summary.summary, marker);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_new() {
        assert!(Output::new().colored);
        assert!(Output::default().colored);
        assert!(!Output::no_color().colored);
    }

    fn sample_summary(degraded: bool) -> TaskSummary {
        TaskSummary {
            task_id: "t1".to_string(),
            task: "Find libraries".to_string(),
            summary: "nom and pest lead.".to_string(),
            top_claims: Vec::new(),
            uncertainties: Vec::new(),
            degraded,
        }
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::no_color(), Output::new()] {
            let mut task = Task::new("t1", "Find libraries");
            output.banner();
            output.success("done");
            output.info("info");
            output.warning("warning");
            output.error("error");
            output.created("config", "quarry.toml");
            output.header("Tasks");
            output.kv("model", "llama3.2");
            output.list_item("item");
            output.task(&task);
            task.status = TaskStatus::Done;
            output.task(&task);
            output.summary(&sample_summary(false));
            output.summary(&sample_summary(true));
            output.hint("hint");
            output.command("quarry run \"topic\"");
        }
    }
}
