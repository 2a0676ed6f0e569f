//! CLI module for Quarry
//!
//! Command-line parsing for the `quarry` binary. Uses clap for arguments and
//! owo-colors for terminal output.

pub mod init;
pub mod output;

use crate::utils::toml_config::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quarry - research pipeline
///
/// Splits a research request into tasks, gathers evidence for each task
/// from the web and writes a Markdown report.
#[derive(Parser, Debug)]
#[command(
    name = "quarry",
    version,
    about = "Quarry - split a research request into tasks, gather evidence, write a report",
    after_help = "EXAMPLES:\n    \
                  quarry init                              # Write a default quarry.toml\n    \
                  quarry run \"Top Rust parser libraries\"   # Run the full pipeline\n    \
                  quarry split --heuristic \"A and B; C\"    # Preview task segmentation offline\n    \
                  quarry --config my.toml config --validate"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the research pipeline for a topic
    Run {
        /// Research topic or request
        topic: String,
    },

    /// Show how a request would be split into tasks
    Split {
        /// Request text to split
        text: String,

        /// Use the offline heuristic instead of the LLM splitter
        #[arg(long)]
        heuristic: bool,
    },

    /// Write a default quarry.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing quarry.toml
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
