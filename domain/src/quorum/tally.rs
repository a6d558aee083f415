//! Per-intent vote tally
//!
//! Owned by a single collecting loop; no interior mutability.

use super::resolution::{IntentOutcome, IntentResolution};
use super::signature::Signature;
use crate::attempt::{AttemptResult, EngineKind};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Ballot {
    count: usize,
    /// First attempt seen with this signature
    representative: AttemptResult,
}

/// What recording one completed attempt did to the tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Counted; no signature at the threshold yet
    Counted { signature: Signature, count: usize },
    /// This vote brought its signature to the threshold
    QuorumReached { signature: Signature, count: usize },
    /// The tally was already decided; the vote was discarded
    Ignored,
}

/// Signature-keyed vote counts for one intent.
///
/// # Example
///
/// ```
/// use fncall_domain::attempt::AttemptResult;
/// use fncall_domain::quorum::{IntentOutcome, VoteTally};
/// use fncall_domain::tool::FunctionCall;
///
/// let sf = AttemptResult::new(vec![FunctionCall::new("get_weather").with_arg("location", "SF")]);
/// let other = AttemptResult::new(vec![FunctionCall::new("get_weather").with_arg("location", "LA")]);
///
/// let mut tally = VoteTally::new(2);
/// tally.record(sf.clone());
/// tally.record(other);
/// tally.record(sf.clone());
///
/// let resolution = tally.finish();
/// assert_eq!(resolution.outcome, IntentOutcome::Quorum);
/// assert_eq!(resolution.chosen.function_calls, sf.function_calls);
/// ```
#[derive(Debug, Clone)]
pub struct VoteTally {
    threshold: usize,
    ballots: HashMap<Signature, Ballot>,
    first_completed: Option<Signature>,
    winner: Option<Signature>,
    completed: usize,
    failed: usize,
}

impl VoteTally {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            ballots: HashMap::new(),
            first_completed: None,
            winner: None,
            completed: 0,
            failed: 0,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Record a completed attempt.
    ///
    /// Once a signature has reached the threshold the tally is frozen and
    /// later votes are ignored.
    pub fn record(&mut self, result: AttemptResult) -> VoteOutcome {
        if self.is_decided() {
            return VoteOutcome::Ignored;
        }
        self.completed += 1;

        let signature = Signature::of(&result.function_calls);
        if self.first_completed.is_none() {
            self.first_completed = Some(signature.clone());
        }

        let ballot = self
            .ballots
            .entry(signature.clone())
            .and_modify(|b| b.count += 1)
            .or_insert(Ballot {
                count: 1,
                representative: result,
            });
        let count = ballot.count;

        if count >= self.threshold {
            self.winner = Some(signature.clone());
            VoteOutcome::QuorumReached { signature, count }
        } else {
            VoteOutcome::Counted { signature, count }
        }
    }

    /// Record an attempt that failed; it is not a vote.
    pub fn record_failure(&mut self) {
        if !self.is_decided() {
            self.failed += 1;
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Settle the intent: the winner if one reached the threshold, otherwise
    /// the first completed attempt, otherwise an empty failed result.
    pub fn finish(mut self) -> IntentResolution {
        let (outcome, key) = match (self.winner.take(), self.first_completed.take()) {
            (Some(winner), _) => (IntentOutcome::Quorum, Some(winner)),
            (None, Some(first)) => (IntentOutcome::NoQuorum, Some(first)),
            (None, None) => (IntentOutcome::Failed, None),
        };

        let ballot = key.and_then(|k| self.ballots.remove(&k));
        let (chosen, agreement) = match ballot {
            Some(ballot) => (ballot.representative, ballot.count),
            None => (AttemptResult::empty(EngineKind::OnDevice), 0),
        };

        IntentResolution {
            chosen,
            outcome,
            completed: self.completed,
            failed: self.failed,
            agreement,
        }
    }
}
