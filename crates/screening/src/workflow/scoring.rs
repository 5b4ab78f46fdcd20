//! Final score aggregation and per-state ranking.

use super::assessment::Verdict;
use super::candidate::{ApplicationNumber, Candidate, StageStatus, StateCode};
use super::registry::Stage;
use serde::Serialize;
use std::collections::BTreeMap;

/// One candidate's aggregated screening scores. Documentation and medical
/// contribute qualitative gate outcomes only; the three point-scored stages
/// sum to the 0..=100 total (40 + 20 + 40).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub application_number: ApplicationNumber,
    pub candidate_name: String,
    pub chest_number: String,
    pub state: StateCode,
    pub documentation: Option<StageStatus>,
    pub medical: Option<StageStatus>,
    pub physical: Option<u8>,
    pub sand_modelling: Option<u8>,
    pub interview: Option<u8>,
    pub total: u8,
    /// 1-based rank within the candidate's state; `None` until the interview
    /// assessment exists.
    pub rank_within_state: Option<u32>,
}

/// Verdicts recorded so far for one candidate, keyed by stage.
pub type StageVerdicts = BTreeMap<Stage, Verdict>;

fn gate_outcome(verdicts: &StageVerdicts, stage: Stage) -> Option<StageStatus> {
    verdicts.get(&stage).map(|verdict| match verdict {
        Verdict::Pass | Verdict::Completed { .. } => StageStatus::Passed,
        Verdict::Fail { .. } => StageStatus::Failed,
    })
}

fn stage_total(verdicts: &StageVerdicts, stage: Stage) -> Option<u8> {
    verdicts.get(&stage).and_then(Verdict::total)
}

/// Collapses a candidate's verdicts into a score breakdown, rank unassigned.
pub fn breakdown(candidate: &Candidate, verdicts: &StageVerdicts) -> ScoreBreakdown {
    let physical = stage_total(verdicts, Stage::Physical);
    let sand_modelling = stage_total(verdicts, Stage::SandModelling);
    let interview = stage_total(verdicts, Stage::Interview);
    let total = physical.unwrap_or(0) + sand_modelling.unwrap_or(0) + interview.unwrap_or(0);

    ScoreBreakdown {
        application_number: candidate.application_number.clone(),
        candidate_name: candidate.full_name(),
        chest_number: candidate.chest_number.0.clone(),
        state: candidate.state.clone(),
        documentation: gate_outcome(verdicts, Stage::Documentation),
        medical: gate_outcome(verdicts, Stage::Medical),
        physical,
        sand_modelling,
        interview,
        total,
        rank_within_state: None,
    }
}

/// Ranks candidates within each state by total descending. Ties break on
/// ascending application number so the order is deterministic. Candidates
/// without a completed interview assessment are listed but left unranked.
pub fn rank_within_states(mut breakdowns: Vec<ScoreBreakdown>) -> Vec<ScoreBreakdown> {
    breakdowns.sort_by(|a, b| {
        a.state
            .cmp(&b.state)
            .then(b.total.cmp(&a.total))
            .then(a.application_number.cmp(&b.application_number))
    });

    let mut counters: BTreeMap<StateCode, u32> = BTreeMap::new();
    for entry in &mut breakdowns {
        if entry.interview.is_none() {
            entry.rank_within_state = None;
            continue;
        }
        let counter = counters.entry(entry.state.clone()).or_insert(0);
        *counter += 1;
        entry.rank_within_state = Some(*counter);
    }

    breakdowns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::candidate::{
        ChestNumber, JambNumber, ServiceArm, Sex,
    };
    use crate::workflow::candidate::CandidateStatus;
    use chrono::Utc;

    fn candidate(app: &str, state: &str) -> Candidate {
        let state = StateCode(state.to_string());
        Candidate {
            application_number: ApplicationNumber(app.to_string()),
            jamb_number: JambNumber::parse("30445986GF").expect("valid"),
            chest_number: ChestNumber::assign(&state, 1),
            surname: "Bello".to_string(),
            first_name: "Sani".to_string(),
            middle_name: None,
            sex: Sex::Male,
            state,
            first_choice: ServiceArm::Army,
            second_choice: ServiceArm::AirForce,
            profile_image: None,
            status: CandidateStatus::Active,
            registered_at: Utc::now(),
        }
    }

    fn verdicts(physical: u8, sand: u8, interview: Option<u8>) -> StageVerdicts {
        let mut verdicts = StageVerdicts::new();
        verdicts.insert(Stage::Documentation, Verdict::Pass);
        verdicts.insert(Stage::Medical, Verdict::Pass);
        verdicts.insert(Stage::Physical, Verdict::Completed { total: physical });
        verdicts.insert(Stage::SandModelling, Verdict::Completed { total: sand });
        if let Some(total) = interview {
            verdicts.insert(Stage::Interview, Verdict::Completed { total });
        }
        verdicts
    }

    #[test]
    fn breakdown_sums_point_stages_and_keeps_gates_qualitative() {
        let entry = breakdown(&candidate("A-1", "KD"), &verdicts(31, 15, Some(33)));
        assert_eq!(entry.documentation, Some(StageStatus::Passed));
        assert_eq!(entry.medical, Some(StageStatus::Passed));
        assert_eq!(entry.physical, Some(31));
        assert_eq!(entry.sand_modelling, Some(15));
        assert_eq!(entry.interview, Some(33));
        assert_eq!(entry.total, 79);
    }

    #[test]
    fn ranking_is_per_state_descending_with_deterministic_tie_break() {
        let entries = vec![
            breakdown(&candidate("A-2", "KD"), &verdicts(30, 15, Some(30))),
            breakdown(&candidate("A-1", "KD"), &verdicts(30, 15, Some(30))),
            breakdown(&candidate("A-3", "KD"), &verdicts(38, 18, Some(36))),
            breakdown(&candidate("B-1", "LA"), &verdicts(20, 10, Some(25))),
        ];

        let ranked = rank_within_states(entries);
        let kd: Vec<_> = ranked
            .iter()
            .filter(|entry| entry.state.0 == "KD")
            .map(|entry| (entry.application_number.0.as_str(), entry.rank_within_state))
            .collect();
        assert_eq!(
            kd,
            vec![("A-3", Some(1)), ("A-1", Some(2)), ("A-2", Some(3))]
        );
        let la = ranked
            .iter()
            .find(|entry| entry.state.0 == "LA")
            .expect("LA entry present");
        assert_eq!(la.rank_within_state, Some(1));
    }

    #[test]
    fn candidates_without_interview_are_unranked() {
        let ranked = rank_within_states(vec![
            breakdown(&candidate("A-1", "KD"), &verdicts(40, 20, None)),
            breakdown(&candidate("A-2", "KD"), &verdicts(10, 10, Some(10))),
        ]);

        let unranked = ranked
            .iter()
            .find(|entry| entry.application_number.0 == "A-1")
            .expect("entry present");
        assert_eq!(unranked.rank_within_state, None);
        let ranked_entry = ranked
            .iter()
            .find(|entry| entry.application_number.0 == "A-2")
            .expect("entry present");
        assert_eq!(ranked_entry.rank_within_state, Some(1));
    }
}
