//! Advancement decisions driven purely by stage verdicts.

use super::assessment::Verdict;
use super::candidate::{CandidateStage, StageStatus};
use super::registry::Stage;

/// Effect an assessment verdict has on the candidate's progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advancement {
    /// Admit the candidate to the given stage with a Pending ledger row.
    Enter(Stage),
    /// Candidate failed a gating stage; screening ends.
    Disqualify,
    /// Final stage recorded; screening ends successfully.
    Complete,
}

/// The per-candidate state machine. Documentation and medical are hard
/// gates; the point-scored stages always advance; the interview is the only
/// path to completion.
pub fn advancement(stage: Stage, verdict: &Verdict) -> Advancement {
    match verdict {
        Verdict::Fail { .. } => Advancement::Disqualify,
        Verdict::Pass | Verdict::Completed { .. } => match stage.next() {
            Some(next) => Advancement::Enter(next),
            None => Advancement::Complete,
        },
    }
}

/// Ledger status recorded for the assessed stage itself.
pub fn stage_status(verdict: &Verdict) -> StageStatus {
    match verdict {
        Verdict::Pass | Verdict::Completed { .. } => StageStatus::Passed,
        Verdict::Fail { .. } => StageStatus::Failed,
    }
}

/// The stage a candidate currently sits in: the furthest stage entered, with
/// Pending rows taking precedence over already-settled ones.
pub fn current_stage(ledger: &[CandidateStage]) -> Option<Stage> {
    let pending = ledger
        .iter()
        .filter(|entry| entry.status == StageStatus::Pending)
        .map(|entry| entry.stage)
        .max();
    pending.or_else(|| ledger.iter().map(|entry| entry.stage).max())
}
