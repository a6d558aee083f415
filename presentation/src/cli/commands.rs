//! CLI command definitions

use clap::{Parser, ValueEnum};
use fncall_domain::{CloudFallback, GenerationMode, QuorumRule};
use std::path::PathBuf;

/// Output format for generation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Calls plus source, timing and per-intent outcomes
    Full,
    /// Only the function calls
    Calls,
    /// The combined result as JSON
    Json,
}

impl From<OutputFormat> for fncall_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => fncall_domain::OutputFormat::Full,
            OutputFormat::Calls => fncall_domain::OutputFormat::Calls,
            OutputFormat::Json => fncall_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for fncall-quorum
#[derive(Parser, Debug)]
#[command(name = "fncall-quorum")]
#[command(author, version, about = "Reliable function calls from small models by quorum voting")]
#[command(long_about = r#"
fncall-quorum turns a request into validated function calls.

In hybrid mode (the default) the request is split into intents, each intent
gets the few tools it most likely needs, and the on-device model is asked
several times per intent. The answer that enough attempts agree on wins.

Configuration files are loaded from (in priority order):
1. FNCALL_* environment variables
2. --config <path>     Explicit config file
3. ./fncall.toml       Project-level config
4. ~/.config/fncall-quorum/config.toml   Global config

Example:
  fncall-quorum --tools tools.json "What's the weather in Paris?"
  fncall-quorum -t tools.json --attempts 5 --rule atleast:3 "text Bob and wake me at 7"
  fncall-quorum -t tools.json --mode cloud -o json "play some jazz"
"#)]
pub struct Cli {
    /// The request to answer with function calls
    pub query: Option<String>,

    /// Tool catalog (JSON array of tool schemas)
    #[arg(short, long, value_name = "FILE")]
    pub tools: Option<PathBuf>,

    /// Generation mode: on-device, cloud or hybrid
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<GenerationMode>,

    /// Attempts per intent
    #[arg(short, long, value_name = "N")]
    pub attempts: Option<usize>,

    /// Agreement rule: majority, unanimous, atleast:N, N%
    #[arg(short, long, value_name = "RULE")]
    pub rule: Option<QuorumRule>,

    /// Engine calls allowed in flight at once
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Tools kept per intent
    #[arg(long, value_name = "K")]
    pub top_k: Option<usize>,

    /// Per-attempt time limit in milliseconds
    #[arg(long, value_name = "MS")]
    pub attempt_timeout_ms: Option<u64>,

    /// Resolve intents concurrently
    #[arg(long)]
    pub concurrent_intents: bool,

    /// When to hand a hybrid result to the cloud: never, on_no_quorum, on_empty
    #[arg(long, value_name = "POLICY")]
    pub cloud_fallback: Option<CloudFallback>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append one JSON line per attempt to this file
    #[arg(long, value_name = "PATH")]
    pub attempt_log: Option<PathBuf>,
}
