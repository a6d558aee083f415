//! CLI entrypoint for fncall-quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use fncall_application::{
    AttemptLogger, GenerationEngine, NoAttemptLogger, NoProgress, QuorumProgressNotifier,
    RunGenerationInput, RunGenerationUseCase,
};
use fncall_domain::{ConfigIssue, EngineKind, IntentSegmenter, Message, Severity};
use fncall_infrastructure::{
    ConfigLoader, FileConfig, JsonlAttemptLogger, ProcessEngine, UnconfiguredEngine, load_catalog,
};
use fncall_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line flags win over every configuration source.
fn apply_cli_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(mode) = cli.mode {
        config.generation.mode = mode.to_string();
    }
    if let Some(attempts) = cli.attempts {
        config.quorum.attempts = attempts;
    }
    if let Some(rule) = cli.rule {
        config.quorum.rule = rule.as_config_str();
    }
    if let Some(workers) = cli.workers {
        config.quorum.workers = workers;
    }
    if let Some(top_k) = cli.top_k {
        config.segmenter.top_k = top_k;
    }
    if let Some(ms) = cli.attempt_timeout_ms {
        config.quorum.attempt_timeout_ms = Some(ms);
    }
    if cli.concurrent_intents {
        config.quorum.concurrent_intents = true;
    }
    if let Some(policy) = cli.cloud_fallback {
        config.generation.cloud_fallback = policy.to_string();
    }
    if let Some(format) = cli.output {
        config.output.format = Some(format.into());
    }
    if cli.quiet {
        config.output.show_progress = false;
    }
    if let Some(path) = &cli.attempt_log {
        config.logging.attempt_log = Some(path.clone());
    }
    if let Some(path) = &cli.log_file {
        config.logging.log_file = Some(path.clone());
    }
}

/// Stderr logging by verbosity, plus an optional non-blocking file layer.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => eprintln!("config error: {}", issue.message),
        }
    }
    if ConfigIssue::has_errors(issues) {
        bail!("Invalid configuration");
    }
    Ok(())
}

fn on_device_engine(config: &FileConfig) -> Arc<dyn GenerationEngine> {
    match config.engine.local.to_process_config() {
        Some(process) => Arc::new(ProcessEngine::new(process)),
        None => Arc::new(UnconfiguredEngine::new(
            EngineKind::OnDevice,
            "no on-device engine; set [engine.local] command",
        )),
    }
}

#[cfg(feature = "cloud")]
fn cloud_engine(config: &FileConfig) -> Result<Option<Arc<dyn GenerationEngine>>> {
    use fncall_infrastructure::GeminiEngine;

    let Some(gemini) = config.engine.cloud.to_gemini_config() else {
        return Ok(None);
    };
    let engine: Arc<dyn GenerationEngine> = Arc::new(GeminiEngine::new(gemini)?);
    Ok(Some(engine))
}

#[cfg(not(feature = "cloud"))]
fn cloud_engine(_config: &FileConfig) -> Result<Option<Arc<dyn GenerationEngine>>> {
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).map_err(|e| anyhow!("{}", e))?
    };
    apply_cli_overrides(&cli, &mut config);

    let _log_guard = init_logging(cli.verbose, config.logging.log_file.as_deref())?;
    info!("Starting fncall-quorum");

    report_issues(&config.validate())?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(query) = cli.query.clone() else {
        bail!("A query is required, e.g. fncall-quorum --tools tools.json \"weather in Paris\"");
    };
    let Some(tools_path) = cli.tools.as_deref() else {
        bail!("--tools <FILE> is required");
    };
    let tools = load_catalog(tools_path)?;

    // === Dependency Injection ===
    let logger: Arc<dyn AttemptLogger> = match &config.logging.attempt_log {
        Some(path) => match JsonlAttemptLogger::new(path) {
            Some(logger) => {
                info!("Attempt log: {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoAttemptLogger),
        },
        None => Arc::new(NoAttemptLogger),
    };

    let cancellation = CancellationToken::new();
    {
        let token = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling in-flight attempts");
                token.cancel();
            }
        });
    }

    let (mode, _) = config.generation.parse_mode();
    let (cloud_fallback, _) = config.generation.parse_cloud_fallback();
    let options = config
        .generation
        .to_options(config.quorum.attempt_timeout());

    let mut use_case = RunGenerationUseCase::new(on_device_engine(&config), options)
        .with_quorum(config.quorum.to_settings())
        .with_segmenter(IntentSegmenter::new(config.segmenter.clone())?)
        .with_cloud_fallback(cloud_fallback)
        .with_logger(logger)
        .with_cancellation(cancellation.clone());
    if let Some(cloud) = cloud_engine(&config)? {
        use_case = use_case.with_cloud(cloud);
    }

    let input = RunGenerationInput::new(vec![Message::user(query)], tools).with_mode(mode);

    // Execute with or without progress reporting
    let progress: Box<dyn QuorumProgressNotifier> = if !config.output.show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };
    let output = use_case
        .execute_with_progress(input, progress.as_ref())
        .await?;

    if cancellation.is_cancelled() {
        warn!("Request was cancelled; the result may be incomplete");
    }

    let rendered = ConsoleFormatter::render(&output, config.output.effective_format());
    println!("{}", rendered.trim_end());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fncall_domain::{CloudFallback, GenerationMode, OutputFormat, QuorumRule};

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["fncall-quorum"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = FileConfig::default();
        config.quorum.attempts = 7;
        apply_cli_overrides(&parse(&["q"]), &mut config);

        assert_eq!(config.quorum.attempts, 7);
        assert_eq!(config.generation.mode, "hybrid");
        assert!(config.output.show_progress);
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = FileConfig::default();
        let cli = parse(&[
            "--mode",
            "cloud",
            "--attempts",
            "5",
            "--rule",
            "75%",
            "--top-k",
            "3",
            "--attempt-timeout-ms",
            "1500",
            "--concurrent-intents",
            "--cloud-fallback",
            "on_empty",
            "--output",
            "full",
            "--quiet",
            "q",
        ]);
        apply_cli_overrides(&cli, &mut config);

        assert_eq!(config.generation.parse_mode().0, GenerationMode::Cloud);
        assert_eq!(config.quorum.attempts, 5);
        assert_eq!(config.quorum.parse_rule().0, QuorumRule::Percentage(75));
        assert_eq!(config.segmenter.top_k, 3);
        assert_eq!(config.quorum.attempt_timeout_ms, Some(1500));
        assert!(config.quorum.concurrent_intents);
        assert_eq!(config.generation.parse_cloud_fallback().0, CloudFallback::OnEmpty);
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.show_progress);
        assert!(!ConfigIssue::has_errors(&config.validate()));
    }

    #[test]
    fn test_unconfigured_local_engine() {
        let engine = on_device_engine(&FileConfig::default());
        assert_eq!(engine.kind(), EngineKind::OnDevice);
    }
}
