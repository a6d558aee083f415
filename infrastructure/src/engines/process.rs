//! On-device engine backed by a child process.
//!
//! Every attempt spawns the configured command, writes one JSON request
//! document to its stdin and reads stdout to EOF:
//!
//! ```json
//! {"messages": [{"role": "system", "content": "..."}, ...],
//!  "tools": [{"type": "function", "function": {"name": "...", ...}}],
//!  "force_tools": true, "max_tokens": 256,
//!  "stop_sequences": ["<|im_end|>", "<end_of_turn>"]}
//! ```
//!
//! The child owns the model for the duration of one call. It is killed when
//! the attempt future is dropped, so aborted attempts release the model.

use async_trait::async_trait;
use fncall_application::ports::generation_engine::{
    EngineError, GenerationEngine, GenerationRequest,
};
use fncall_domain::EngineKind;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, trace};

/// Local engine invocation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEngineConfig {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl ProcessEngineConfig {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    messages: &'a [fncall_domain::Message],
    tools: Vec<Value>,
    force_tools: bool,
    max_tokens: u32,
    stop_sequences: &'a [String],
}

/// Encode a request as the document the local runtime reads.
pub fn encode_request(request: &GenerationRequest) -> Result<String, EngineError> {
    let tools = request
        .tools
        .iter()
        .map(|tool| json!({ "type": "function", "function": tool }))
        .collect();
    let wire = WireRequest {
        messages: &request.messages,
        tools,
        force_tools: request.force_tools,
        max_tokens: request.max_tokens,
        stop_sequences: &request.stop_sequences,
    };
    serde_json::to_string(&wire).map_err(|e| EngineError::Io(e.to_string()))
}

/// [`GenerationEngine`] that runs one child process per attempt.
pub struct ProcessEngine {
    config: ProcessEngineConfig,
}

impl ProcessEngine {
    pub fn new(config: ProcessEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessEngineConfig {
        &self.config
    }
}

#[async_trait]
impl GenerationEngine for ProcessEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::OnDevice
    }

    fn name(&self) -> String {
        self.config.command.display().to_string()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, EngineError> {
        let input = encode_request(request)?;

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .envs(&self.config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Spawn(format!("{}: {}", self.config.command.display(), e))
            })?;
        debug!("Spawned {} (pid {:?})", self.config.command.display(), child.id());

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Io("failed to capture stdin".to_string()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Io("failed to capture stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Io("failed to capture stderr".to_string()))?;

        // Write and read concurrently so a chatty child cannot fill a pipe
        // while we are still writing.
        let write = async move {
            stdin.write_all(input.as_bytes()).await?;
            stdin.shutdown().await
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let (written, read_out, read_err) = tokio::join!(
            write,
            stdout.read_to_end(&mut out),
            stderr.read_to_end(&mut err)
        );
        // A child that exits without reading its input closes the pipe; its
        // exit status is the better diagnostic.
        if let Err(e) = written {
            debug!("Writing request to engine failed: {}", e);
        }
        read_out.map_err(|e| EngineError::Io(e.to_string()))?;
        read_err.map_err(|e| EngineError::Io(e.to_string()))?;

        let status = child
            .wait()
            .await
            .map_err(|e| EngineError::Io(e.to_string()))?;
        let stderr = String::from_utf8_lossy(&err).trim().to_string();
        if !status.success() {
            return Err(EngineError::NonZeroExit {
                code: status.code(),
                stderr,
            });
        }

        let text = String::from_utf8_lossy(&out).into_owned();
        trace!("Engine output: {}", text);
        if text.trim().is_empty() {
            return Err(EngineError::EmptyOutput);
        }
        Ok(text)
    }
}
