//! Generation adapter
//!
//! One engine call turned into a validated [`AttemptResult`]: prompt
//! preparation, timing, repair, validation, and attempt logging.

use crate::config::GenerationOptions;
use crate::ports::attempt_logger::{AttemptEvent, AttemptLogger, NoAttemptLogger};
use crate::ports::generation_engine::{EngineError, GenerationEngine, GenerationRequest};
use fncall_domain::conversation::with_system_prompt;
use fncall_domain::{
    AttemptResult, EngineKind, Message, RawAttempt, Signature, ToolSet, repair_json,
    validate_output,
};
use serde_json::json;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

/// Runs single generation attempts against one engine.
///
/// Cheap to share: wrap in an `Arc` and call [`attempt`](Self::attempt)
/// from as many tasks as needed.
pub struct GenerationAdapter {
    engine: Arc<dyn GenerationEngine>,
    options: GenerationOptions,
    logger: Arc<dyn AttemptLogger>,
}

impl GenerationAdapter {
    pub fn new(engine: Arc<dyn GenerationEngine>, options: GenerationOptions) -> Self {
        Self {
            engine,
            options,
            logger: Arc::new(NoAttemptLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn AttemptLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn kind(&self) -> EngineKind {
        self.engine.kind()
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    fn build_request(&self, messages: &[Message], tools: &ToolSet) -> GenerationRequest {
        GenerationRequest {
            messages: with_system_prompt(messages, &self.options.system_prompt),
            tools: tools.clone(),
            force_tools: true,
            max_tokens: self.options.max_tokens,
            stop_sequences: self.options.stop_sequences.clone(),
        }
    }

    /// Invoke the engine exactly once and validate its output.
    ///
    /// Engine failures, including hitting the attempt timeout, are returned
    /// as errors; an unusable payload is an `Ok` with no calls.
    pub async fn attempt(
        &self,
        messages: &[Message],
        tools: &ToolSet,
    ) -> Result<AttemptResult, EngineError> {
        let request = self.build_request(messages, tools);
        let start = Instant::now();

        let generated = match self.options.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, self.engine.generate(&request))
                .await
                .unwrap_or(Err(EngineError::Timeout(limit))),
            None => self.engine.generate(&request).await,
        };
        let elapsed = start.elapsed();

        match generated {
            Ok(text) => {
                let raw = RawAttempt::new(text, elapsed, self.kind());
                Ok(self.process(&raw, tools))
            }
            Err(e) => {
                debug!(
                    "{} attempt failed after {:.0}ms: {}",
                    self.engine.name(),
                    elapsed.as_secs_f64() * 1000.0,
                    e
                );
                self.logger.log(AttemptEvent::new(
                    "attempt_failed",
                    json!({
                        "engine": self.kind(),
                        "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
                        "error": e.to_string(),
                    }),
                ));
                Err(e)
            }
        }
    }

    /// Repair and validate raw engine text.
    ///
    /// `total_time_ms` is taken from the payload when it reports a positive
    /// value, otherwise from the measured wall-clock time.
    pub fn process(&self, raw: &RawAttempt, tools: &ToolSet) -> AttemptResult {
        let validated = validate_output(&repair_json(&raw.text), tools);
        let report = &validated.report;
        if report.extracted_fragments {
            debug!("Payload was not valid JSON; recovered {} call fragment(s)", report.candidates);
        }
        if report.dropped_calls > 0 || report.dropped_arguments > 0 {
            debug!(
                "Dropped {} of {} call(s) and {} argument(s) during validation",
                report.dropped_calls, report.candidates, report.dropped_arguments
            );
        }

        let mut result = validated.result.with_engine(raw.engine);
        let elapsed_ms = raw.elapsed.as_secs_f64() * 1000.0;
        if result.total_time_ms.is_nan() || result.total_time_ms <= 0.0 {
            result.total_time_ms = elapsed_ms;
        }

        let signature = Signature::of(&result.function_calls);
        debug!("{} attempt in {:.0}ms: {}", raw.engine, elapsed_ms, signature);
        self.logger.log(AttemptEvent::new(
            "attempt_completed",
            json!({
                "engine": raw.engine,
                "elapsed_ms": elapsed_ms,
                "raw_text": raw.text,
                "signature": signature.as_str(),
                "function_calls": result.function_calls,
                "extracted_fragments": report.extracted_fragments,
                "dropped_calls": report.dropped_calls,
                "dropped_arguments": report.dropped_arguments,
            }),
        ));

        result
    }
}
