//! Screening service composing the registry, verdict functions, progression
//! engine, and score aggregation over a repository boundary.

use super::assessment::{AssessmentPayload, ValidationError, Verdict};
use super::candidate::{
    ActorId, ApplicationNumber, Candidate, CandidateStage, CandidateStatus, ChestNumber,
    StageStatus, StateCode,
};
use super::intake::CandidateIntake;
use super::progression::{self, Advancement};
use super::registry::{Stage, StageRegistry, StageState};
use super::scoring::{self, ScoreBreakdown, StageVerdicts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One persisted stage assessment. The live record is upserted per
/// (candidate, stage); every submission is additionally appended to the
/// immutable history so corrections never erase the original sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub candidate: ApplicationNumber,
    pub stage: Stage,
    pub payload: AssessmentPayload,
    pub verdict: Verdict,
    pub assessed_by: ActorId,
    pub assessed_at: DateTime<Utc>,
}

/// Storage abstraction so the service can be exercised in isolation. Each
/// method is a single atomic operation against the store; `admit_to_stage`
/// in particular must perform its check-then-insert under one lock or
/// transaction, backed by a unique (candidate, stage) constraint.
pub trait ScreeningRepository: Send + Sync {
    /// Persists the candidate together with their opening ledger row as one
    /// atomic operation; a relational adapter wraps both writes in a single
    /// transaction so a failure leaves neither behind.
    fn insert_candidate(
        &self,
        candidate: Candidate,
        opening: CandidateStage,
    ) -> Result<Candidate, RepositoryError>;
    fn fetch_candidate(
        &self,
        id: &ApplicationNumber,
    ) -> Result<Option<Candidate>, RepositoryError>;
    fn candidates(&self) -> Result<Vec<Candidate>, RepositoryError>;
    fn set_candidate_status(
        &self,
        id: &ApplicationNumber,
        status: CandidateStatus,
    ) -> Result<(), RepositoryError>;
    /// Next value of the per-state chest number counter, monotonically
    /// increasing, never reused.
    fn next_chest_sequence(&self, state: &StateCode) -> Result<u32, RepositoryError>;
    /// Inserts a Pending ledger row unless one already exists for the
    /// (candidate, stage) pair. Returns whether a row was inserted.
    fn admit_to_stage(&self, entry: CandidateStage) -> Result<bool, RepositoryError>;
    fn set_stage_status(
        &self,
        id: &ApplicationNumber,
        stage: Stage,
        status: StageStatus,
        actor: &ActorId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
    fn candidate_stage(
        &self,
        id: &ApplicationNumber,
        stage: Stage,
    ) -> Result<Option<CandidateStage>, RepositoryError>;
    fn ledger(&self, id: &ApplicationNumber) -> Result<Vec<CandidateStage>, RepositoryError>;
    fn upsert_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn assessments(
        &self,
        id: &ApplicationNumber,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError>;
    fn append_history(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn history(&self, id: &ApplicationNumber) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Domain errors surfaced to the submitting officer or admin. None of these
/// leave the ledger partially updated: validation and state checks run
/// before any write.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("stage '{stage}' is locked; submissions are rejected until an admin unlocks it")]
    StageLocked { stage: Stage },
    #[error("candidate {candidate} has not been admitted to the '{stage}' stage")]
    NotAdmitted {
        candidate: ApplicationNumber,
        stage: Stage,
    },
    #[error("candidate {candidate} is {status}; no further assessments are accepted")]
    TerminalCandidate {
        candidate: ApplicationNumber,
        status: CandidateStatus,
    },
    #[error("payload is for stage '{found}' but was submitted to '{expected}'")]
    StageMismatch { expected: Stage, found: Stage },
    #[error("candidate {0} not found")]
    CandidateNotFound(ApplicationNumber),
    #[error("a candidate with this {field} is already registered: {value}")]
    DuplicateCandidate { field: &'static str, value: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result of a stage assessment submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentOutcome {
    pub candidate: ApplicationNumber,
    pub stage: Stage,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_to: Option<Stage>,
    pub candidate_status: CandidateStatus,
}

/// Progress view returned to officers and the board.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateProgress {
    pub candidate: Candidate,
    pub current_stage: Option<Stage>,
    pub ledger: Vec<CandidateStage>,
    pub assessments: Vec<AssessmentRecord>,
}

pub struct ScreeningService<R> {
    repository: std::sync::Arc<R>,
    registry: Mutex<StageRegistry>,
}

impl<R> ScreeningService<R>
where
    R: ScreeningRepository + 'static,
{
    pub fn new(repository: std::sync::Arc<R>) -> Self {
        Self::with_registry(repository, StageRegistry::all_active())
    }

    pub fn with_registry(repository: std::sync::Arc<R>, registry: StageRegistry) -> Self {
        Self {
            repository,
            registry: Mutex::new(registry),
        }
    }

    /// Registers a candidate, assigning the chest number from the per-state
    /// counter and admitting them to the documentation stage.
    pub fn register_candidate(
        &self,
        intake: CandidateIntake,
        _actor: &ActorId,
    ) -> Result<Candidate, ScreeningError> {
        let candidate = self.build_candidate(intake)?;
        let application_number = candidate.application_number.clone();
        let opening = CandidateStage::pending(
            application_number.clone(),
            Stage::Documentation,
            candidate.registered_at,
        );
        match self.repository.insert_candidate(candidate, opening) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::Conflict) => Err(ScreeningError::DuplicateCandidate {
                field: "application or JAMB number",
                value: application_number.0,
            }),
            Err(other) => Err(other.into()),
        }
    }

    fn build_candidate(&self, intake: CandidateIntake) -> Result<Candidate, ScreeningError> {
        let validated = intake.validate()?;
        let sequence = self.repository.next_chest_sequence(&validated.state)?;
        let chest_number = ChestNumber::assign(&validated.state, sequence);
        Ok(validated.into_candidate(chest_number, Utc::now()))
    }

    /// Records a stage assessment for a candidate and applies the resulting
    /// progression. Validation and eligibility checks all run before the
    /// first write, so a rejected submission mutates nothing.
    pub fn submit_assessment(
        &self,
        candidate_id: &ApplicationNumber,
        stage: Stage,
        payload: AssessmentPayload,
        actor: &ActorId,
    ) -> Result<AssessmentOutcome, ScreeningError> {
        if payload.stage() != stage {
            return Err(ScreeningError::StageMismatch {
                expected: stage,
                found: payload.stage(),
            });
        }

        // Locking is checked at submission time only; a candidate may sit
        // Pending in a locked stage until it is unlocked.
        if !self.is_stage_active(stage) {
            return Err(ScreeningError::StageLocked { stage });
        }

        let candidate = self
            .repository
            .fetch_candidate(candidate_id)?
            .ok_or_else(|| ScreeningError::CandidateNotFound(candidate_id.clone()))?;
        if candidate.status.is_terminal() {
            return Err(ScreeningError::TerminalCandidate {
                candidate: candidate_id.clone(),
                status: candidate.status,
            });
        }

        if self
            .repository
            .candidate_stage(candidate_id, stage)?
            .is_none()
        {
            return Err(ScreeningError::NotAdmitted {
                candidate: candidate_id.clone(),
                stage,
            });
        }

        let verdict = payload.verdict()?;
        let now = Utc::now();
        let record = AssessmentRecord {
            candidate: candidate_id.clone(),
            stage,
            payload,
            verdict: verdict.clone(),
            assessed_by: actor.clone(),
            assessed_at: now,
        };

        self.repository.upsert_assessment(record.clone())?;
        self.repository.append_history(record)?;
        self.repository.set_stage_status(
            candidate_id,
            stage,
            progression::stage_status(&verdict),
            actor,
            now,
        )?;

        let mut candidate_status = candidate.status;
        let advanced_to = match progression::advancement(stage, &verdict) {
            Advancement::Enter(next) => {
                // Idempotent: a resubmission after advancement finds the row
                // already present and leaves later progress untouched.
                self.repository.admit_to_stage(CandidateStage::pending(
                    candidate_id.clone(),
                    next,
                    now,
                ))?;
                Some(next)
            }
            Advancement::Disqualify => {
                candidate_status = CandidateStatus::Disqualified;
                self.repository
                    .set_candidate_status(candidate_id, candidate_status)?;
                None
            }
            Advancement::Complete => {
                candidate_status = CandidateStatus::Completed;
                self.repository
                    .set_candidate_status(candidate_id, candidate_status)?;
                None
            }
        };

        Ok(AssessmentOutcome {
            candidate: candidate_id.clone(),
            stage,
            total: verdict.total(),
            verdict,
            advanced_to,
            candidate_status,
        })
    }

    /// Flips a stage's active flag and returns the new state. Existing
    /// ledger rows are untouched.
    pub fn toggle_stage(&self, stage: Stage, _actor: &ActorId) -> bool {
        self.registry
            .lock()
            .expect("stage registry mutex poisoned")
            .toggle(stage)
    }

    pub fn is_stage_active(&self, stage: Stage) -> bool {
        self.registry
            .lock()
            .expect("stage registry mutex poisoned")
            .is_active(stage)
    }

    pub fn stage_states(&self) -> Vec<StageState> {
        self.registry
            .lock()
            .expect("stage registry mutex poisoned")
            .snapshot()
    }

    pub fn candidate_progress(
        &self,
        candidate_id: &ApplicationNumber,
    ) -> Result<CandidateProgress, ScreeningError> {
        let candidate = self
            .repository
            .fetch_candidate(candidate_id)?
            .ok_or_else(|| ScreeningError::CandidateNotFound(candidate_id.clone()))?;
        let mut ledger = self.repository.ledger(candidate_id)?;
        ledger.sort_by_key(|entry| entry.stage);
        let assessments = self.repository.assessments(candidate_id)?;

        Ok(CandidateProgress {
            current_stage: progression::current_stage(&ledger),
            candidate,
            ledger,
            assessments,
        })
    }

    /// Append-only audit trail of every submission for a candidate.
    pub fn assessment_history(
        &self,
        candidate_id: &ApplicationNumber,
    ) -> Result<Vec<AssessmentRecord>, ScreeningError> {
        Ok(self.repository.history(candidate_id)?)
    }

    /// Final scores ranked within each state; optionally filtered to one
    /// state. Candidates without an interview assessment appear unranked.
    pub fn final_scores(
        &self,
        state: Option<&StateCode>,
    ) -> Result<Vec<ScoreBreakdown>, ScreeningError> {
        let mut breakdowns = Vec::new();
        for candidate in self.repository.candidates()? {
            if let Some(filter) = state {
                if &candidate.state != filter {
                    continue;
                }
            }
            let verdicts: StageVerdicts = self
                .repository
                .assessments(&candidate.application_number)?
                .into_iter()
                .map(|record| (record.stage, record.verdict))
                .collect();
            breakdowns.push(scoring::breakdown(&candidate, &verdicts));
        }

        Ok(scoring::rank_within_states(breakdowns))
    }
}
