//! Run Generation use case
//!
//! Answers one request with function calls using one of three strategies:
//!
//! | Mode        | Engine    | Flow                                        |
//! |-------------|-----------|---------------------------------------------|
//! | `on-device` | on-device | one attempt over the full tool set          |
//! | `cloud`     | cloud     | one attempt over the full tool set          |
//! | `hybrid`    | on-device | segment into intents, quorum-vote each one  |
//!
//! A hybrid result may be replaced by a cloud attempt according to the
//! configured [`CloudFallback`] policy.

use crate::config::{GenerationOptions, QuorumSettings};
use crate::ports::attempt_logger::{AttemptEvent, AttemptLogger, NoAttemptLogger};
use crate::ports::generation_engine::{EngineError, GenerationEngine};
use crate::ports::progress::{NoProgress, QuorumProgressNotifier};
use crate::use_cases::generate_attempt::GenerationAdapter;
use crate::use_cases::resolve_intents::QuorumResolver;
use fncall_domain::{
    AttemptResult, CloudFallback, CombinedResult, DomainError, GenerationMode, IntentResolution,
    IntentSegmenter, Message, ToolSet,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that reject a request before any engine is called
///
/// Engine trouble never surfaces here; it degrades the result instead.
#[derive(Error, Debug)]
pub enum RunGenerationError {
    #[error("No tools supplied")]
    NoTools,

    #[error("Invalid quorum settings: {0}")]
    InvalidQuorum(#[from] DomainError),
}

/// Input for the RunGeneration use case
#[derive(Debug, Clone)]
pub struct RunGenerationInput {
    pub messages: Vec<Message>,
    pub tools: ToolSet,
    pub mode: GenerationMode,
}

impl RunGenerationInput {
    pub fn new(messages: Vec<Message>, tools: ToolSet) -> Self {
        Self {
            messages,
            tools,
            mode: GenerationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// One intent as resolved in hybrid mode
#[derive(Debug, Clone)]
pub struct IntentReport {
    pub fragment: Option<String>,
    pub tools: Vec<String>,
    pub resolution: IntentResolution,
}

/// Output of the RunGeneration use case
#[derive(Debug, Clone)]
pub struct RunGenerationOutput {
    pub result: CombinedResult,
    pub mode: GenerationMode,
    /// Per-intent detail; empty outside hybrid mode
    pub intents: Vec<IntentReport>,
    pub cloud_fallback_used: bool,
}

/// Use case for answering a request with validated function calls
pub struct RunGenerationUseCase {
    on_device: Arc<dyn GenerationEngine>,
    cloud: Option<Arc<dyn GenerationEngine>>,
    options: GenerationOptions,
    settings: QuorumSettings,
    segmenter: IntentSegmenter,
    cloud_fallback: CloudFallback,
    logger: Arc<dyn AttemptLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl RunGenerationUseCase {
    pub fn new(on_device: Arc<dyn GenerationEngine>, options: GenerationOptions) -> Self {
        Self {
            on_device,
            cloud: None,
            options,
            settings: QuorumSettings::default(),
            segmenter: IntentSegmenter::default(),
            cloud_fallback: CloudFallback::Never,
            logger: Arc::new(NoAttemptLogger),
            cancellation_token: None,
        }
    }

    pub fn with_cloud(mut self, cloud: Arc<dyn GenerationEngine>) -> Self {
        self.cloud = Some(cloud);
        self
    }

    pub fn with_quorum(mut self, settings: QuorumSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_segmenter(mut self, segmenter: IntentSegmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn with_cloud_fallback(mut self, policy: CloudFallback) -> Self {
        self.cloud_fallback = policy;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn AttemptLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    fn adapter(&self, engine: &Arc<dyn GenerationEngine>) -> Arc<GenerationAdapter> {
        Arc::new(
            GenerationAdapter::new(Arc::clone(engine), self.options.clone())
                .with_logger(Arc::clone(&self.logger)),
        )
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunGenerationInput,
    ) -> Result<RunGenerationOutput, RunGenerationError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunGenerationInput,
        progress: &dyn QuorumProgressNotifier,
    ) -> Result<RunGenerationOutput, RunGenerationError> {
        if input.tools.is_empty() {
            return Err(RunGenerationError::NoTools);
        }

        info!("Generating in {} mode with {} tool(s)", input.mode, input.tools.len());

        let output = match input.mode {
            GenerationMode::OnDevice => {
                let adapter = self.adapter(&self.on_device);
                self.single(&adapter, &input).await
            }
            GenerationMode::Cloud => match &self.cloud {
                Some(cloud) => {
                    let adapter = self.adapter(cloud);
                    self.single(&adapter, &input).await
                }
                None => {
                    warn!("Cloud mode requested but no cloud engine is configured");
                    self.single_failed(&input, EngineError::NotConfigured("cloud".to_string()))
                }
            },
            GenerationMode::Hybrid => self.hybrid(&input, progress).await?,
        };

        info!(
            "Result: {} call(s), source {}, {:.0}ms",
            output.result.function_calls.len(),
            output.result.source,
            output.result.total_time_ms
        );
        self.logger.log(AttemptEvent::new(
            "request_completed",
            json!({
                "mode": output.mode,
                "intents": output.intents.len(),
                "cloud_fallback_used": output.cloud_fallback_used,
                "result": output.result,
            }),
        ));

        Ok(output)
    }

    /// One attempt that races the cancellation token.
    async fn attempt_cancellable(
        &self,
        adapter: &GenerationAdapter,
        messages: &[Message],
        tools: &ToolSet,
    ) -> Result<AttemptResult, EngineError> {
        if self.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        match &self.cancellation_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(EngineError::Cancelled),
                result = adapter.attempt(messages, tools) => result,
            },
            None => adapter.attempt(messages, tools).await,
        }
    }

    async fn single(&self, adapter: &GenerationAdapter, input: &RunGenerationInput) -> RunGenerationOutput {
        let start = Instant::now();
        match self.attempt_cancellable(adapter, &input.messages, &input.tools).await {
            Ok(result) => RunGenerationOutput {
                result: CombinedResult::from_attempt(result),
                mode: input.mode,
                intents: Vec::new(),
                cloud_fallback_used: false,
            },
            Err(e) => {
                if e.is_cancelled() {
                    info!("{} attempt cancelled", adapter.kind());
                } else {
                    warn!("{} attempt failed: {}", adapter.kind(), e);
                }
                RunGenerationOutput {
                    result: CombinedResult::error(start.elapsed().as_secs_f64() * 1000.0),
                    mode: input.mode,
                    intents: Vec::new(),
                    cloud_fallback_used: false,
                }
            }
        }
    }

    fn single_failed(&self, input: &RunGenerationInput, error: EngineError) -> RunGenerationOutput {
        debug!("Returning error result: {}", error);
        RunGenerationOutput {
            result: CombinedResult::error(0.0),
            mode: input.mode,
            intents: Vec::new(),
            cloud_fallback_used: false,
        }
    }

    async fn hybrid(
        &self,
        input: &RunGenerationInput,
        progress: &dyn QuorumProgressNotifier,
    ) -> Result<RunGenerationOutput, RunGenerationError> {
        let threshold = self.settings.threshold()?;

        let intents = self.segmenter.segment(&input.messages, &input.tools);
        info!("Segmented request into {} intent(s)", intents.len());
        for (i, intent) in intents.iter().enumerate() {
            debug!(
                "Intent {}: {:?} → [{}]",
                i + 1,
                intent.label(),
                intent.tools.names().collect::<Vec<_>>().join(", ")
            );
        }
        progress.on_segmented(&intents);

        let mut resolver = QuorumResolver::new(
            self.adapter(&self.on_device),
            self.settings.clone(),
            threshold,
        )
        .with_logger(Arc::clone(&self.logger));
        if let Some(token) = &self.cancellation_token {
            resolver = resolver.with_cancellation(token.clone());
        }

        let resolutions = resolver.resolve_all(&intents, progress).await;
        let mut result = CombinedResult::from_resolutions(&resolutions);

        let reports = intents
            .into_iter()
            .zip(resolutions)
            .map(|(intent, resolution)| IntentReport {
                fragment: intent.fragment,
                tools: intent.tools.names().map(str::to_string).collect(),
                resolution,
            })
            .collect();

        let mut cloud_fallback_used = false;
        if self.wants_cloud_fallback(&result) {
            if let Some(cloud) = &self.cloud {
                info!("Hybrid result is {}; falling back to cloud", result.source);
                progress.on_cloud_fallback(result.source);

                let adapter = self.adapter(cloud);
                match self.attempt_cancellable(&adapter, &input.messages, &input.tools).await {
                    Ok(cloud_result) => {
                        let hybrid_time = result.total_time_ms;
                        result = CombinedResult::from_attempt(cloud_result);
                        result.total_time_ms += hybrid_time;
                        cloud_fallback_used = true;
                    }
                    Err(e) => warn!("Cloud fallback failed, keeping hybrid result: {}", e),
                }
            } else {
                debug!("Cloud fallback wanted but no cloud engine is configured");
            }
        }

        Ok(RunGenerationOutput {
            result,
            mode: input.mode,
            intents: reports,
            cloud_fallback_used,
        })
    }

    fn wants_cloud_fallback(&self, result: &CombinedResult) -> bool {
        if self.is_cancelled() {
            return false;
        }
        match self.cloud_fallback {
            CloudFallback::Never => false,
            CloudFallback::OnNoQuorum => result.source.is_degraded(),
            CloudFallback::OnEmpty => result.is_empty(),
        }
    }
}
