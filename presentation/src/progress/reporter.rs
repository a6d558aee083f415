//! Progress reporting for quorum resolution

use colored::Colorize;
use fncall_application::QuorumProgressNotifier;
use fncall_domain::{Intent, IntentOutcome, IntentResolution, ResultSource};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;

/// Reports progress with one bar per intent, drawn on stderr
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<usize, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn intent_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:20.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn outcome_message(resolution: &IntentResolution) -> String {
        match resolution.outcome {
            IntentOutcome::Quorum => format!(
                "{} ({} agree)",
                resolution.outcome.to_string().green(),
                resolution.agreement
            ),
            IntentOutcome::NoQuorum => resolution.outcome.to_string().yellow().to_string(),
            IntentOutcome::Failed => resolution.outcome.to_string().red().to_string(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuorumProgressNotifier for ProgressReporter {
    fn on_intent_start(&self, index: usize, intent: &Intent, attempts: usize) {
        let pb = self.multi.add(ProgressBar::new(attempts as u64));
        pb.set_style(Self::intent_style());
        pb.set_prefix(format!("Intent {}", index + 1));
        pb.set_message(intent.label().to_string());

        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(index, pb);
        }
    }

    fn on_attempt_complete(&self, index: usize, success: bool) {
        if let Ok(bars) = self.bars.lock()
            && let Some(pb) = bars.get(&index)
        {
            if !success {
                pb.set_message(format!("{} attempt failed", "x".red()));
            }
            pb.inc(1);
        }
    }

    fn on_intent_resolved(&self, index: usize, resolution: &IntentResolution) {
        if let Ok(mut bars) = self.bars.lock()
            && let Some(pb) = bars.remove(&index)
        {
            pb.finish_with_message(Self::outcome_message(resolution));
        }
    }

    fn on_cloud_fallback(&self, from: ResultSource) {
        let _ = self.multi.println(format!(
            "{} {} result, asking the cloud engine",
            "->".cyan(),
            from
        ));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl QuorumProgressNotifier for SimpleProgress {
    fn on_segmented(&self, intents: &[Intent]) {
        eprintln!("{} {} intent(s)", "->".cyan(), intents.len());
    }

    fn on_intent_start(&self, index: usize, intent: &Intent, attempts: usize) {
        eprintln!(
            "{} {} {} ({} attempts)",
            "->".cyan(),
            format!("Intent {}:", index + 1).bold(),
            intent.label(),
            attempts
        );
    }

    fn on_attempt_complete(&self, _index: usize, success: bool) {
        if success {
            eprintln!("  {} attempt", "v".green());
        } else {
            eprintln!("  {} attempt (failed)", "x".red());
        }
    }

    fn on_intent_resolved(&self, _index: usize, resolution: &IntentResolution) {
        eprintln!("  = {}", ProgressReporter::outcome_message(resolution));
    }

    fn on_cloud_fallback(&self, from: ResultSource) {
        eprintln!("{} {} result, asking the cloud engine", "->".cyan(), from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fncall_domain::{Message, ToolSet};

    fn intent() -> Intent {
        Intent::whole(&[Message::user("play jazz")], &ToolSet::default())
    }

    fn resolution(outcome: IntentOutcome) -> IntentResolution {
        IntentResolution {
            outcome,
            completed: 3,
            agreement: 2,
            ..IntentResolution::failed()
        }
    }

    #[test]
    fn test_reporter_tracks_bars_per_intent() {
        let reporter = ProgressReporter::new();
        reporter.on_intent_start(0, &intent(), 3);
        reporter.on_intent_start(1, &intent(), 3);
        reporter.on_attempt_complete(1, true);
        assert_eq!(reporter.bars.lock().unwrap().len(), 2);

        reporter.on_intent_resolved(0, &resolution(IntentOutcome::Quorum));
        let bars = reporter.bars.lock().unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[&1].position(), 1);
    }

    #[test]
    fn test_outcome_message_mentions_agreement() {
        let message = ProgressReporter::outcome_message(&resolution(IntentOutcome::Quorum));
        assert!(message.contains("(2 agree)"));
    }
}
