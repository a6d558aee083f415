//! Quorum resolution of intents
//!
//! Every intent is attempted `attempts` times through a worker pool shared
//! by the whole request. Completed attempts are tallied by signature; the
//! first signature to reach the threshold wins and the remaining attempts
//! of that intent are aborted.

use crate::config::QuorumSettings;
use crate::ports::attempt_logger::{AttemptEvent, AttemptLogger, NoAttemptLogger};
use crate::ports::progress::QuorumProgressNotifier;
use crate::use_cases::generate_attempt::GenerationAdapter;
use fncall_domain::{Intent, IntentOutcome, IntentResolution, VoteOutcome, VoteTally};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Resolves intents by signature voting.
pub struct QuorumResolver {
    adapter: Arc<GenerationAdapter>,
    settings: QuorumSettings,
    threshold: usize,
    logger: Arc<dyn AttemptLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl QuorumResolver {
    /// `threshold` must already be checked against `settings.attempts`.
    pub fn new(adapter: Arc<GenerationAdapter>, settings: QuorumSettings, threshold: usize) -> Self {
        Self {
            adapter,
            settings,
            threshold,
            logger: Arc::new(NoAttemptLogger),
            cancellation_token: None,
        }
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

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }

    /// Resolve every intent, returning resolutions in intent order.
    ///
    /// The worker pool is created here and dropped on return; no attempt
    /// outlives this call.
    pub async fn resolve_all(
        &self,
        intents: &[Intent],
        progress: &dyn QuorumProgressNotifier,
    ) -> Vec<IntentResolution> {
        let pool = Arc::new(Semaphore::new(self.settings.workers.max(1)));

        if self.settings.concurrent_intents {
            let futures = intents
                .iter()
                .enumerate()
                .map(|(index, intent)| self.resolve_intent(index, intent, Arc::clone(&pool), progress));
            futures::future::join_all(futures).await
        } else {
            let mut resolutions = Vec::with_capacity(intents.len());
            for (index, intent) in intents.iter().enumerate() {
                resolutions.push(self.resolve_intent(index, intent, Arc::clone(&pool), progress).await);
            }
            resolutions
        }
    }

    /// Dispatch, collect, and settle one intent.
    pub async fn resolve_intent(
        &self,
        index: usize,
        intent: &Intent,
        pool: Arc<Semaphore>,
        progress: &dyn QuorumProgressNotifier,
    ) -> IntentResolution {
        if self.is_cancelled() {
            debug!("Intent {} skipped: request cancelled", index + 1);
            return IntentResolution::failed();
        }

        let attempts = self.settings.attempts;
        info!(
            "Intent {}: {} attempt(s) over {} tool(s), need {} in agreement",
            index + 1,
            attempts,
            intent.tools.len(),
            self.threshold
        );
        progress.on_intent_start(index, intent, attempts);

        let mut join_set = JoinSet::new();
        for _ in 0..attempts {
            let adapter = Arc::clone(&self.adapter);
            let pool = Arc::clone(&pool);
            let messages = intent.messages.clone();
            let tools = intent.tools.clone();

            join_set.spawn(async move {
                // A closed pool means the request is being torn down
                let _permit = pool
                    .acquire_owned()
                    .await
                    .map_err(|_| crate::ports::generation_engine::EngineError::Cancelled)?;
                adapter.attempt(&messages, &tools).await
            });
        }

        let mut tally = VoteTally::new(self.threshold);
        let mut cancelled = false;

        loop {
            let joined = if let Some(ref token) = self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    joined = join_set.join_next() => joined,
                }
            } else {
                join_set.join_next().await
            };

            let Some(joined) = joined else {
                break; // All attempts finished
            };

            match joined {
                Ok(Ok(result)) => {
                    progress.on_attempt_complete(index, true);
                    match tally.record(result) {
                        VoteOutcome::QuorumReached { count, .. } => {
                            debug!("Intent {}: quorum reached with {} votes", index + 1, count);
                            break;
                        }
                        VoteOutcome::Counted { count, .. } => {
                            debug!("Intent {}: answer now has {} vote(s)", index + 1, count);
                        }
                        VoteOutcome::Ignored => {}
                    }
                }
                Ok(Err(e)) => {
                    warn!("Intent {}: attempt failed: {}", index + 1, e);
                    progress.on_attempt_complete(index, false);
                    tally.record_failure();
                }
                Err(e) => {
                    warn!("Intent {}: attempt task failed: {}", index + 1, e);
                    progress.on_attempt_complete(index, false);
                    tally.record_failure();
                }
            }
        }

        // Stop stragglers and wait for them so nothing outlives the intent;
        // their results are discarded.
        join_set.abort_all();
        while join_set.join_next().await.is_some() {}

        let resolution = if cancelled && !tally.is_decided() {
            info!("Intent {}: cancelled before resolution", index + 1);
            IntentResolution {
                completed: tally.completed(),
                failed: tally.failed(),
                ..IntentResolution::failed()
            }
        } else {
            tally.finish()
        };

        match resolution.outcome {
            IntentOutcome::Quorum => info!(
                "Intent {}: quorum ({} of {} completed agree)",
                index + 1,
                resolution.agreement,
                resolution.completed
            ),
            IntentOutcome::NoQuorum => warn!(
                "Intent {}: no quorum after {} completed attempt(s), using first completed",
                index + 1,
                resolution.completed
            ),
            IntentOutcome::Failed => warn!(
                "Intent {}: no attempt completed ({} failed)",
                index + 1,
                resolution.failed
            ),
        }

        self.logger.log(AttemptEvent::new(
            "intent_resolved",
            json!({
                "intent": index,
                "fragment": intent.fragment,
                "tools": intent.tools.names().collect::<Vec<_>>(),
                "outcome": resolution.outcome,
                "completed": resolution.completed,
                "failed": resolution.failed,
                "agreement": resolution.agreement,
                "function_calls": resolution.chosen.function_calls,
            }),
        ));
        progress.on_intent_resolved(index, &resolution);

        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationOptions;
    use crate::ports::generation_engine::EngineError;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::test_support::{ScriptedEngine, Step, weather_tools};
    use fncall_domain::{FunctionCall, Message, QuorumRule};
    use std::time::Duration;

    const SF: &str = r#"{"function_calls":[{"name":"get_weather","arguments":{"location":"SF"}}]}"#;
    const LA: &str = r#"{"function_calls":[{"name":"get_weather","arguments":{"location":"LA"}}]}"#;
    const NYC: &str = r#"{"function_calls":[{"name":"get_weather","arguments":{"location":"NYC"}}]}"#;

    fn intent() -> Intent {
        Intent::whole(&[Message::user("weather?")], &weather_tools())
    }

    fn resolver(engine: Arc<ScriptedEngine>, settings: QuorumSettings) -> QuorumResolver {
        let threshold = settings.threshold().unwrap();
        let adapter = Arc::new(GenerationAdapter::new(engine, GenerationOptions::default()));
        QuorumResolver::new(adapter, settings, threshold)
    }

    fn location(resolution: &IntentResolution) -> Option<&str> {
        resolution.chosen.function_calls.first().and_then(|c| c.get_str("location"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_agreeing_of_three() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            Step::ok(SF).after(Duration::from_millis(10)),
            Step::ok(LA).after(Duration::from_millis(20)),
            Step::ok(SF).after(Duration::from_millis(30)),
        ]));
        let resolver = resolver(engine, QuorumSettings::default());

        let resolutions = resolver.resolve_all(&[intent()], &NoProgress).await;

        assert_eq!(resolutions[0].outcome, IntentOutcome::Quorum);
        assert_eq!(
            resolutions[0].chosen.function_calls,
            vec![FunctionCall::new("get_weather").with_arg("location", "SF")]
        );
        assert_eq!(resolutions[0].agreement, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pairwise_distinct_uses_first_completed() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            Step::ok(SF).after(Duration::from_millis(30)),
            Step::ok(LA).after(Duration::from_millis(10)),
            Step::ok(NYC).after(Duration::from_millis(20)),
        ]));
        let resolver = resolver(engine, QuorumSettings::default());

        let resolution = resolver.resolve_all(&[intent()], &NoProgress).await.remove(0);

        assert_eq!(resolution.outcome, IntentOutcome::NoQuorum);
        assert_eq!(location(&resolution), Some("LA"));
        assert_eq!(resolution.completed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_aborts_stragglers() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            Step::ok(SF).after(Duration::from_millis(10)),
            Step::ok(SF).after(Duration::from_millis(20)),
            Step::ok(LA).after(Duration::from_secs(3600)),
        ]));
        let resolver = resolver(engine.clone(), QuorumSettings::default());

        let resolution = resolver.resolve_all(&[intent()], &NoProgress).await.remove(0);

        assert_eq!(resolution.outcome, IntentOutcome::Quorum);
        assert_eq!(location(&resolution), Some("SF"));
        assert_eq!(resolution.completed, 2);
        assert_eq!(engine.started(), 3);
        assert_eq!(engine.finished(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_non_votes() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            Step::fail(EngineError::EmptyOutput).after(Duration::from_millis(5)),
            Step::ok(LA).after(Duration::from_millis(10)),
            Step::fail(EngineError::Transport("reset".into())).after(Duration::from_millis(15)),
        ]));
        let resolver = resolver(engine, QuorumSettings::default());

        let resolution = resolver.resolve_all(&[intent()], &NoProgress).await.remove(0);

        assert_eq!(resolution.outcome, IntentOutcome::NoQuorum);
        assert_eq!(location(&resolution), Some("LA"));
        assert_eq!(resolution.failed, 2);
        assert_eq!(resolution.completed, 1);
    }

    #[tokio::test]
    async fn test_all_failed_is_empty_failed() {
        let engine = Arc::new(ScriptedEngine::new(vec![Step::fail(EngineError::EmptyOutput)]));
        let resolver = resolver(engine, QuorumSettings::default());

        let resolution = resolver.resolve_all(&[intent()], &NoProgress).await.remove(0);

        assert_eq!(resolution.outcome, IntentOutcome::Failed);
        assert!(resolution.chosen.is_empty());
        assert_eq!(resolution.failed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_bounds_concurrency() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            Step::ok(SF).after(Duration::from_millis(10)),
        ]));
        let settings = QuorumSettings::default()
            .with_attempts(5)
            .with_rule(QuorumRule::Unanimous)
            .with_workers(2);
        let resolver = resolver(engine.clone(), settings);

        let resolution = resolver.resolve_all(&[intent()], &NoProgress).await.remove(0);

        assert_eq!(resolution.outcome, IntentOutcome::Quorum);
        assert_eq!(engine.max_in_flight(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_intents_keep_order() {
        let engine = Arc::new(
            ScriptedEngine::new(vec![Step::ok(SF)])
                .route("slow", vec![Step::ok(LA).after(Duration::from_millis(50))])
                .route("fast", vec![Step::ok(NYC).after(Duration::from_millis(1))]),
        );
        let settings = QuorumSettings::default()
            .with_workers(6)
            .with_concurrent_intents(true);
        let resolver = resolver(engine, settings);

        let intents = vec![
            Intent::whole(&[Message::user("slow")], &weather_tools()),
            Intent::whole(&[Message::user("fast")], &weather_tools()),
        ];
        let resolutions = resolver.resolve_all(&intents, &NoProgress).await;

        assert_eq!(location(&resolutions[0]), Some("LA"));
        assert_eq!(location(&resolutions[1]), Some("NYC"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_fails_unresolved_intents() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            Step::ok(SF).after(Duration::from_secs(3600)),
        ]));
        let token = CancellationToken::new();
        let resolver = resolver(engine.clone(), QuorumSettings::default()).with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let intents = vec![intent(), intent()];
        let resolutions = resolver.resolve_all(&intents, &NoProgress).await;
        canceller.await.unwrap();

        assert_eq!(resolutions.len(), 2);
        assert!(resolutions.iter().all(|r| r.outcome == IntentOutcome::Failed));
        assert_eq!(engine.finished(), 0);
        assert_eq!(engine.started(), 3);
    }
}
