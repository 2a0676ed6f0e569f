//! Init command implementation
//!
//! Writes a commented `quarry.toml` and a `.env.example` into a directory.

use super::output::Output;
use crate::utils::toml_config::{DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_TOML, ENV_LLM_MODEL, ENV_LLM_URL};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Configuration written
    Success(PathBuf),
    /// quarry.toml exists and `force` was not set
    AlreadyExists(PathBuf),
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: &InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Quarry");

    let config_path = config.path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite it");
        return InitResult::AlreadyExists(config_path);
    }

    if let Err(e) = fs::create_dir_all(&config.path) {
        output.error(&format!("Failed to create {}: {}", config.path.display(), e));
        return InitResult::Error(e.to_string());
    }

    if let Err(e) = fs::write(&config_path, DEFAULT_CONFIG_TOML) {
        output.error(&format!("Failed to write {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", &config_path.display().to_string());

    let env_example = config.path.join(".env.example");
    match write_if_missing(&env_example, &generate_env_example(), config.force) {
        Ok(true) => output.created("env", &env_example.display().to_string()),
        Ok(false) => {}
        Err(e) => output.warning(&format!("Failed to create .env.example: {}", e)),
    }

    output.header("Next Steps");
    output.info("Start Ollama and pull the configured model:");
    output.command("ollama serve");
    output.command("ollama pull llama3.2");
    output.info("Run a research topic:");
    output.command("quarry run \"Top Rust parser libraries\"");

    InitResult::Success(config_path)
}

/// Write `content` unless `path` exists and `force` is false. Returns whether
/// the file was written.
fn write_if_missing(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_env_example() -> String {
    format!(
        r#"# Quarry Environment Variables
# Copy this file to .env and adjust as needed.

# Optional: Logging filter (overrides [logging].level)
RUST_LOG=info,quarry=debug

# Optional: Override the [llm] section
# {}=http://localhost:11434
# {}=llama3.2
"#,
        ENV_LLM_URL, ENV_LLM_MODEL
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::QuarryConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_parseable_config() {
        let dir = TempDir::new().unwrap();
        let config = InitConfig {
            path: dir.path().join("project"),
            force: false,
        };

        let result = run(&config, &Output::no_color());

        let path = dir.path().join("project").join(DEFAULT_CONFIG_FILE);
        assert_eq!(result, InitResult::Success(path.clone()));
        let parsed = QuarryConfig::parse(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, QuarryConfig::default());
        assert!(dir.path().join("project").join(".env.example").exists());
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "# mine").unwrap();

        let mut config = InitConfig {
            path: dir.path().to_path_buf(),
            force: false,
        };
        assert_eq!(
            run(&config, &Output::no_color()),
            InitResult::AlreadyExists(path.clone())
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        config.force = true;
        assert_eq!(run(&config, &Output::no_color()), InitResult::Success(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG_TOML);
    }
}
