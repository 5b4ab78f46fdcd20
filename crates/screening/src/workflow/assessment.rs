//! Stage assessment payloads and the pure verdict functions over them.
//!
//! Each stage kind has a tagged payload type with a compile-time-checked
//! field set. Verdict derivation never touches the store: validation and
//! outcome are computed from the payload alone, so every rule here is
//! testable in isolation.

use super::registry::Stage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Documents every candidate must present at the documentation desk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    BirthCertificate,
    StateOfOriginCertificate,
    LocalGovernmentAttestation,
    PrimarySchoolCertificate,
    SecondarySchoolCertificate,
    SecondarySchoolTestimonial,
    JambResultSlip,
    JambAdmissionLetter,
    NationalIdCard,
    ParentConsentForm,
    GuarantorForm,
    MedicalHistoryForm,
    PassportPhotographs,
    AcknowledgementSlip,
    IndigeneCertificate,
}

impl DocumentKind {
    /// The full checklist; all fifteen entries gate the documentation stage.
    pub const fn required() -> [Self; 15] {
        [
            Self::BirthCertificate,
            Self::StateOfOriginCertificate,
            Self::LocalGovernmentAttestation,
            Self::PrimarySchoolCertificate,
            Self::SecondarySchoolCertificate,
            Self::SecondarySchoolTestimonial,
            Self::JambResultSlip,
            Self::JambAdmissionLetter,
            Self::NationalIdCard,
            Self::ParentConsentForm,
            Self::GuarantorForm,
            Self::MedicalHistoryForm,
            Self::PassportPhotographs,
            Self::AcknowledgementSlip,
            Self::IndigeneCertificate,
        ]
    }
}

/// Irregularity raised against a candidate's documents. Raising any flag
/// forces a FAIL, so the reason is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFlag {
    pub document: DocumentKind,
    pub reason: String,
}

/// Documentation desk submission. The two confirmations are a deliberate
/// double-check: a PASS is rejected unless both are explicitly true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationResult {
    pub verified: BTreeSet<DocumentKind>,
    #[serde(default)]
    pub flags: Vec<DocumentFlag>,
    pub all_documents_confirmed: bool,
    pub no_flags_confirmed: bool,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Medical tests every candidate undergoes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MedicalTest {
    BloodPressure,
    Vision,
    Hearing,
    Dental,
    UrineAnalysis,
    ChestXray,
}

impl MedicalTest {
    pub const fn required() -> [Self; 6] {
        [
            Self::BloodPressure,
            Self::Vision,
            Self::Hearing,
            Self::Dental,
            Self::UrineAnalysis,
            Self::ChestXray,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BloodPressure => "Blood Pressure",
            Self::Vision => "Vision",
            Self::Hearing => "Hearing",
            Self::Dental => "Dental",
            Self::UrineAnalysis => "Urine Analysis",
            Self::ChestXray => "Chest X-Ray",
        }
    }
}

impl fmt::Display for MedicalTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum TestOutcome {
    Fit,
    Failed { reason: String },
}

/// Medical screening submission: one outcome per required test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalResult {
    pub findings: BTreeMap<MedicalTest, TestOutcome>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Sub-criteria for the three point-scored stages, each scored 0..=10.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    // physical
    Race,
    IndividualObstacle,
    GroupObstacle,
    RopeClimb,
    // sand modelling
    TerrainModel,
    Briefing,
    // board interview
    Bearing,
    Communication,
    GeneralKnowledge,
    Motivation,
}

impl Criterion {
    pub const MAX: u8 = 10;

    pub const fn label(self) -> &'static str {
        match self {
            Self::Race => "Race",
            Self::IndividualObstacle => "Individual Obstacle",
            Self::GroupObstacle => "Group Obstacle",
            Self::RopeClimb => "Rope Climb",
            Self::TerrainModel => "Terrain Model",
            Self::Briefing => "Briefing",
            Self::Bearing => "Bearing",
            Self::Communication => "Communication",
            Self::GeneralKnowledge => "General Knowledge",
            Self::Motivation => "Motivation",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The point-scored stages and their fixed rubrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoredStage {
    Physical,
    SandModelling,
    Interview,
}

impl ScoredStage {
    pub const fn criteria(self) -> &'static [Criterion] {
        match self {
            Self::Physical => &[
                Criterion::Race,
                Criterion::IndividualObstacle,
                Criterion::GroupObstacle,
                Criterion::RopeClimb,
            ],
            Self::SandModelling => &[Criterion::TerrainModel, Criterion::Briefing],
            Self::Interview => &[
                Criterion::Bearing,
                Criterion::Communication,
                Criterion::GeneralKnowledge,
                Criterion::Motivation,
            ],
        }
    }

    /// Declared maximum total: physical 40, sand modelling 20, interview 40.
    pub const fn max_total(self) -> u8 {
        (self.criteria().len() as u8) * Criterion::MAX
    }

    pub const fn stage(self) -> Stage {
        match self {
            Self::Physical => Stage::Physical,
            Self::SandModelling => Stage::SandModelling,
            Self::Interview => Stage::Interview,
        }
    }
}

/// Scores for one point-scored stage, keyed by sub-criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointScores {
    pub scores: BTreeMap<Criterion, u8>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Outcome of a stage assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Verdict {
    Pass,
    Fail { reason: String },
    Completed { total: u8 },
}

impl Verdict {
    pub fn total(&self) -> Option<u8> {
        match self {
            Verdict::Completed { total } => Some(*total),
            _ => None,
        }
    }
}

/// Rejections raised before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a PASS requires the '{which}' confirmation to be checked")]
    MissingConfirmation { which: &'static str },
    #[error("flag on {document:?} is missing a disqualification reason")]
    FlagWithoutReason { document: DocumentKind },
    #[error("failed {test} outcome is missing a disqualification reason")]
    MedicalFailureWithoutReason { test: MedicalTest },
    #[error("no outcome recorded for required test {test}")]
    MissingMedicalTest { test: MedicalTest },
    #[error("score {value} for {criterion} exceeds the maximum of {max}")]
    ScoreOutOfRange {
        criterion: Criterion,
        value: u8,
        max: u8,
    },
    #[error("{criterion} is not part of the {stage:?} rubric")]
    UnknownCriterion {
        criterion: Criterion,
        stage: ScoredStage,
    },
    #[error("no score submitted for {criterion}")]
    MissingCriterion { criterion: Criterion },
    #[error("'{value}' is not a valid JAMB number (expected 8 digits then 2 uppercase letters)")]
    InvalidJambNumber { value: String },
    #[error("required field '{field}' is empty")]
    MissingField { field: &'static str },
}

impl DocumentationResult {
    /// PASS iff every required document is verified, zero flags are raised,
    /// and both officer confirmations are checked. Any flag forces a FAIL
    /// carrying the flag reasons; a flag without a reason never persists.
    pub fn verdict(&self) -> Result<Verdict, ValidationError> {
        if !self.flags.is_empty() {
            for flag in &self.flags {
                if flag.reason.trim().is_empty() {
                    return Err(ValidationError::FlagWithoutReason {
                        document: flag.document,
                    });
                }
            }
            let reason = self
                .flags
                .iter()
                .map(|flag| flag.reason.trim())
                .collect::<Vec<_>>()
                .join("; ");
            return Ok(Verdict::Fail { reason });
        }

        let missing: Vec<DocumentKind> = DocumentKind::required()
            .into_iter()
            .filter(|kind| !self.verified.contains(kind))
            .collect();
        if !missing.is_empty() {
            let reason = format!(
                "missing required documents: {}",
                missing
                    .iter()
                    .map(|kind| format!("{kind:?}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            return Ok(Verdict::Fail { reason });
        }

        if !self.all_documents_confirmed {
            return Err(ValidationError::MissingConfirmation {
                which: "all documents checked",
            });
        }
        if !self.no_flags_confirmed {
            return Err(ValidationError::MissingConfirmation {
                which: "no flags",
            });
        }

        Ok(Verdict::Pass)
    }
}

impl MedicalResult {
    /// PASS iff every required test is present and Fit; any failed test
    /// forces a FAIL and must carry a non-empty reason.
    pub fn verdict(&self) -> Result<Verdict, ValidationError> {
        for test in MedicalTest::required() {
            if !self.findings.contains_key(&test) {
                return Err(ValidationError::MissingMedicalTest { test });
            }
        }

        let mut reasons = Vec::new();
        for (test, outcome) in &self.findings {
            if let TestOutcome::Failed { reason } = outcome {
                if reason.trim().is_empty() {
                    return Err(ValidationError::MedicalFailureWithoutReason { test: *test });
                }
                reasons.push(format!("{}: {}", test.label(), reason.trim()));
            }
        }

        if reasons.is_empty() {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail {
                reason: reasons.join("; "),
            })
        }
    }
}

impl PointScores {
    /// Always Completed: reaching a point-scored stage and submitting a
    /// rubric-complete score sheet is itself the gate. Out-of-range or
    /// off-rubric scores are rejected before anything is written.
    pub fn verdict(&self, stage: ScoredStage) -> Result<Verdict, ValidationError> {
        for (criterion, value) in &self.scores {
            if !stage.criteria().contains(criterion) {
                return Err(ValidationError::UnknownCriterion {
                    criterion: *criterion,
                    stage,
                });
            }
            if *value > Criterion::MAX {
                return Err(ValidationError::ScoreOutOfRange {
                    criterion: *criterion,
                    value: *value,
                    max: Criterion::MAX,
                });
            }
        }

        for criterion in stage.criteria() {
            if !self.scores.contains_key(criterion) {
                return Err(ValidationError::MissingCriterion {
                    criterion: *criterion,
                });
            }
        }

        let total = self.scores.values().sum();
        Ok(Verdict::Completed { total })
    }
}

/// Tagged stage assessment payload; the `stage` tag doubles as the routing
/// discriminant on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage")]
pub enum AssessmentPayload {
    Documentation(DocumentationResult),
    Medical(MedicalResult),
    Physical(PointScores),
    SandModelling(PointScores),
    Interview(PointScores),
}

impl AssessmentPayload {
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Documentation(_) => Stage::Documentation,
            Self::Medical(_) => Stage::Medical,
            Self::Physical(_) => Stage::Physical,
            Self::SandModelling(_) => Stage::SandModelling,
            Self::Interview(_) => Stage::Interview,
        }
    }

    pub fn verdict(&self) -> Result<Verdict, ValidationError> {
        match self {
            Self::Documentation(result) => result.verdict(),
            Self::Medical(result) => result.verdict(),
            Self::Physical(scores) => scores.verdict(ScoredStage::Physical),
            Self::SandModelling(scores) => scores.verdict(ScoredStage::SandModelling),
            Self::Interview(scores) => scores.verdict(ScoredStage::Interview),
        }
    }
}
