//! Candidate identity and the per-stage progress ledger.

use super::registry::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique application number issued at registration; primary key for a
/// candidate throughout screening.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationNumber(pub String);

impl std::fmt::Display for ApplicationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// JAMB registration number, eight digits followed by two uppercase letters
/// (e.g. `30445986GF`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JambNumber(String);

impl JambNumber {
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.len() != 10 {
            return None;
        }
        let digits_ok = value[..8].chars().all(|c| c.is_ascii_digit());
        let suffix_ok = value[8..].chars().all(|c| c.is_ascii_uppercase());
        if digits_ok && suffix_ok {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-state sequential identifier assigned exactly once at intake and never
/// reused, formatted as `<state_code><sequence>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChestNumber(pub String);

impl ChestNumber {
    pub fn assign(state: &StateCode, sequence: u32) -> Self {
        Self(format!("{}{:03}", state.0, sequence))
    }
}

/// Two-letter code of the candidate's state of origin.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateCode(pub String);

/// Identity of the officer or admin performing an operation. Threaded
/// explicitly through every core operation; authentication stays with the
/// session collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceArm {
    Army,
    Navy,
    AirForce,
}

impl ServiceArm {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Army => "Army",
            Self::Navy => "Navy",
            Self::AirForce => "Air Force",
        }
    }
}

/// Overall candidate lifecycle status. Candidates are never hard-deleted;
/// only this status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Active,
    Completed,
    Disqualified,
}

impl CandidateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Disqualified => "Disqualified",
        }
    }

    /// Terminal statuses accept no further stage assessments.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Disqualified)
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub application_number: ApplicationNumber,
    pub jamb_number: JambNumber,
    pub chest_number: ChestNumber,
    pub surname: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub sex: Sex,
    pub state: StateCode,
    pub first_choice: ServiceArm,
    pub second_choice: ServiceArm,
    pub profile_image: Option<String>,
    pub status: CandidateStatus,
    pub registered_at: DateTime<Utc>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.surname, self.first_name, middle),
            None => format!("{} {}", self.surname, self.first_name),
        }
    }
}

/// Status of a candidate within one stage they have entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Passed,
    Failed,
}

impl StageStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Passed => "Passed",
            Self::Failed => "Failed",
        }
    }
}

/// Ledger row recording a candidate's standing within one stage. At most one
/// row exists per (candidate, stage); rows are created Pending by the
/// progression engine and updated when the stage assessment lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStage {
    pub candidate: ApplicationNumber,
    pub stage: Stage,
    pub status: StageStatus,
    pub entered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<ActorId>,
}

impl CandidateStage {
    pub fn pending(candidate: ApplicationNumber, stage: Stage, at: DateTime<Utc>) -> Self {
        Self {
            candidate,
            stage,
            status: StageStatus::Pending,
            entered_at: at,
            updated_at: at,
            updated_by: None,
        }
    }
}
