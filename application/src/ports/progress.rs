//! Progress notification port
//!
//! Defines the interface for reporting progress while a request is resolved.

use fncall_domain::{Intent, IntentResolution, ResultSource};

/// Callback for progress updates during generation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinners, plain lines, nothing).
pub trait QuorumProgressNotifier: Send + Sync {
    /// Called once the request has been split into intents
    fn on_segmented(&self, _intents: &[Intent]) {}

    /// Called when attempts for an intent are dispatched
    fn on_intent_start(&self, index: usize, intent: &Intent, attempts: usize);

    /// Called when one attempt finishes, successfully or not
    fn on_attempt_complete(&self, index: usize, success: bool);

    /// Called when an intent is settled
    fn on_intent_resolved(&self, index: usize, resolution: &IntentResolution);

    /// Called when the hybrid result is handed to the cloud engine
    fn on_cloud_fallback(&self, _from: ResultSource) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl QuorumProgressNotifier for NoProgress {
    fn on_intent_start(&self, _index: usize, _intent: &Intent, _attempts: usize) {}
    fn on_attempt_complete(&self, _index: usize, _success: bool) {}
    fn on_intent_resolved(&self, _index: usize, _resolution: &IntentResolution) {}
}
