use anyhow::Context;
use quarry::agents::{LlmEvidenceExtractor, LlmSummarizer, LlmTaskSplitter};
use quarry::cli::init::{self, InitConfig, InitResult};
use quarry::cli::output::Output;
use quarry::cli::{Cli, Commands};
use quarry::report::MarkdownReportWriter;
use quarry::research::{Collaborators, Orchestrator, TaskSegmenter};
use quarry::tools::{DaedraBackend, WebSearcher};
use quarry::types::{ReportHandle, RunReport};
use quarry::utils::toml_config::{ConfigError, LoggingConfig, MemoryConfig, QuarryConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Commands::Init { path, force } = &cli.command {
        return match init::run(
            &InitConfig {
                path: path.clone(),
                force: *force,
            },
            &output,
        ) {
            InitResult::Success(_) | InitResult::AlreadyExists(_) => Ok(()),
            InitResult::Error(e) => Err(anyhow::anyhow!(e)),
        };
    }

    if let Commands::Config { validate } = &cli.command {
        return show_config(&cli.config, *validate, &output);
    }

    let config = load_config(&cli.config, &output)?;
    init_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Run { topic } => run_topic(&config, &topic, &output).await,
        Commands::Split { text, heuristic } => split(&config, &text, heuristic, &output).await,
        Commands::Init { .. } | Commands::Config { .. } => Ok(()),
    }
}

/// Load `path`, falling back to defaults when the file does not exist.
fn load_config(path: &Path, output: &Output) -> anyhow::Result<QuarryConfig> {
    match QuarryConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            output.warning(&format!(
                "{} not found, using defaults (run 'quarry init' to create it)",
                path.display()
            ));
            let mut config = QuarryConfig::default();
            config.apply_env_overrides()?;
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Invalid configuration in {}", path.display()))),
    }
}

fn init_logging(config: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

async fn run_topic(config: &QuarryConfig, topic: &str, output: &Output) -> anyhow::Result<()> {
    output.banner();

    let llm = quarry::llm::create_client(&config.llm)?;
    let collaborators = Collaborators {
        splitter: Some(Arc::new(LlmTaskSplitter::new(llm.clone()))),
        searcher: Arc::new(WebSearcher::new(
            Arc::new(DaedraBackend::new()),
            config.search.clone(),
        )),
        extractor: Arc::new(LlmEvidenceExtractor::new(llm.clone())),
        summarizer: Arc::new(LlmSummarizer::new(llm)),
        renderer: Arc::new(MarkdownReportWriter::new(&config.pipeline.output_dir)),
    };

    let mut orchestrator =
        Orchestrator::new(collaborators).with_max_concurrency(config.pipeline.max_concurrency);
    if config.memory.enabled {
        orchestrator = attach_archive(orchestrator, &config.memory, output).await;
    }

    let related = orchestrator.recall(topic, 3).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Recall from archive failed");
        Vec::new()
    });
    if !related.is_empty() {
        output.header("Related evidence from earlier runs");
        for item in &related {
            output.list_item(&format!("{} ({})", item.claim, item.source_url));
        }
    }

    output.header(&format!("Researching: {}", topic));
    let run = orchestrator.run(topic).await?;
    print_run(&run, output);

    let telemetry_dir = match &run.report {
        ReportHandle::File(path) => path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.pipeline.output_dir.clone()),
        ReportHandle::Inline(_) => config.pipeline.output_dir.clone(),
    };
    let telemetry = write_telemetry(&telemetry_dir, &run).await?;
    output.created("telemetry", &telemetry.display().to_string());

    Ok(())
}

#[cfg(feature = "local-embeddings")]
async fn attach_archive(
    orchestrator: Orchestrator,
    config: &MemoryConfig,
    output: &Output,
) -> Orchestrator {
    use quarry::memory::long_term::FastEmbedder;
    use quarry_vector::VectorMemory;

    if config.dimension != FastEmbedder::DIMENSION {
        output.warning(&format!(
            "memory.dimension is {} but the embedding model produces {}; archive disabled",
            config.dimension,
            FastEmbedder::DIMENSION
        ));
        return orchestrator;
    }

    match FastEmbedder::new() {
        Ok(embedder) => {
            let memory = VectorMemory::open(config.dimension, &config.index_path).await;
            if let Some(reason) = memory.unavailable_reason() {
                output.warning(&format!("Evidence archive unavailable: {}", reason));
            }
            orchestrator.with_archive(memory, Arc::new(embedder))
        }
        Err(e) => {
            output.warning(&format!("Embedding model unavailable, archive disabled: {}", e));
            orchestrator
        }
    }
}

#[cfg(not(feature = "local-embeddings"))]
async fn attach_archive(
    orchestrator: Orchestrator,
    _config: &MemoryConfig,
    output: &Output,
) -> Orchestrator {
    output.warning("memory.enabled needs the 'local-embeddings' feature; archive disabled");
    orchestrator
}

fn print_run(run: &RunReport, output: &Output) {
    output.header("Tasks");
    for task in &run.tasks {
        output.task(task);
    }

    output.header("Summaries");
    for summary in &run.summaries {
        output.summary(summary);
    }

    if !run.notes.is_empty() {
        output.header("Notes");
        for note in &run.notes {
            output.warning(note);
        }
    }

    match &run.report {
        ReportHandle::File(path) => output.success(&format!("Report saved to {}", path.display())),
        ReportHandle::Inline(markdown) => {
            output.warning("Report could not be written, printing it instead");
            println!("\n{}", markdown);
        }
    }
}

async fn write_telemetry(dir: &Path, run: &RunReport) -> anyhow::Result<PathBuf> {
    let report = match &run.report {
        ReportHandle::File(path) => path.display().to_string(),
        ReportHandle::Inline(_) => "inline".to_string(),
    };
    let telemetry = serde_json::json!({
        "report": report,
        "tasks_processed": run.tasks.iter().filter(|t| t.is_done()).count(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Cannot create {}", dir.display()))?;
    let path = dir.join("telemetry.json");
    tokio::fs::write(&path, serde_json::to_vec_pretty(&telemetry)?)
        .await
        .with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(path)
}

async fn split(
    config: &QuarryConfig,
    text: &str,
    heuristic: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let segmenter = if heuristic {
        TaskSegmenter::heuristic_only()
    } else {
        let llm = quarry::llm::create_client(&config.llm)?;
        TaskSegmenter::new(Arc::new(LlmTaskSplitter::new(llm)))
    };

    let (tasks, strategy) = segmenter.segment(text).await;
    if tasks.is_empty() {
        anyhow::bail!("Nothing to split: input is blank");
    }

    output.header(&format!("Tasks ({:?})", strategy));
    for task in &tasks {
        output.task(task);
    }
    Ok(())
}

/// Print the configuration as read, and with `validate` report every
/// problem and fail if there are any.
fn show_config(path: &Path, validate: bool, output: &Output) -> anyhow::Result<()> {
    let config = match QuarryConfig::read(path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) => {
            output.warning(&format!("{} not found, showing defaults", path.display()));
            let mut config = QuarryConfig::default();
            config.apply_env_overrides()?;
            config
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("Invalid configuration in {}", path.display())))
        }
    };

    output.header("Configuration");
    output.kv("file", &path.display().to_string());
    output.kv("llm.base_url", &config.llm.base_url);
    output.kv("llm.model", &config.llm.model);
    output.kv("llm.timeout_secs", &config.llm.timeout_secs.to_string());
    output.kv("search.top_k", &config.search.top_k.to_string());
    output.kv(
        "search.max_pages_per_task",
        &config.search.max_pages_per_task.to_string(),
    );
    output.kv("search.fetch_pages", &config.search.fetch_pages.to_string());
    output.kv(
        "pipeline.output_dir",
        &config.pipeline.output_dir.display().to_string(),
    );
    output.kv(
        "pipeline.max_concurrency",
        &config.pipeline.max_concurrency.to_string(),
    );
    output.kv("memory.enabled", &config.memory.enabled.to_string());
    output.kv(
        "memory.index_path",
        &config.memory.index_path.display().to_string(),
    );

    if !validate {
        return Ok(());
    }

    let problems = config.problems();
    if problems.is_empty() {
        output.success("Configuration is valid");
        return Ok(());
    }
    for problem in &problems {
        output.error(problem);
    }
    anyhow::bail!("{} configuration problem(s) in {}", problems.len(), path.display())
}
