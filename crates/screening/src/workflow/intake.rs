//! Candidate registration input and bulk roster import.
//!
//! Admins can register candidates one at a time through the API or load a
//! whole roster export in CSV form. Import is best-effort per row: malformed
//! rows are reported with their line number while the rest register.

use super::candidate::{
    ActorId, ApplicationNumber, Candidate, CandidateStatus, ChestNumber, JambNumber, ServiceArm,
    Sex, StateCode,
};
use super::assessment::ValidationError;
use super::service::{ScreeningRepository, ScreeningService};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io;
use std::path::Path;

/// Raw registration input before identity validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CandidateIntake {
    pub application_number: String,
    pub jamb_number: String,
    pub surname: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub sex: Sex,
    pub state: String,
    pub first_choice: ServiceArm,
    pub second_choice: ServiceArm,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Intake that has cleared identity validation; the chest number is assigned
/// by the service from the per-state counter.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedIntake {
    pub(crate) application_number: ApplicationNumber,
    pub(crate) jamb_number: JambNumber,
    pub(crate) surname: String,
    pub(crate) first_name: String,
    pub(crate) middle_name: Option<String>,
    pub(crate) sex: Sex,
    pub(crate) state: StateCode,
    pub(crate) first_choice: ServiceArm,
    pub(crate) second_choice: ServiceArm,
    pub(crate) profile_image: Option<String>,
}

impl CandidateIntake {
    pub(crate) fn validate(self) -> Result<ValidatedIntake, ValidationError> {
        let jamb_number = JambNumber::parse(&self.jamb_number).ok_or_else(|| {
            ValidationError::InvalidJambNumber {
                value: self.jamb_number.clone(),
            }
        })?;

        let application_number = self.application_number.trim().to_string();
        if application_number.is_empty() {
            return Err(ValidationError::MissingField {
                field: "application_number",
            });
        }
        let surname = self.surname.trim().to_string();
        if surname.is_empty() {
            return Err(ValidationError::MissingField { field: "surname" });
        }
        let first_name = self.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(ValidationError::MissingField { field: "first_name" });
        }
        let state = self.state.trim().to_uppercase();
        if state.is_empty() {
            return Err(ValidationError::MissingField { field: "state" });
        }

        Ok(ValidatedIntake {
            application_number: ApplicationNumber(application_number),
            jamb_number,
            surname,
            first_name,
            middle_name: self
                .middle_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            sex: self.sex,
            state: StateCode(state),
            first_choice: self.first_choice,
            second_choice: self.second_choice,
            profile_image: self.profile_image,
        })
    }
}

impl ValidatedIntake {
    pub(crate) fn into_candidate(
        self,
        chest_number: ChestNumber,
        registered_at: DateTime<Utc>,
    ) -> Candidate {
        Candidate {
            application_number: self.application_number,
            jamb_number: self.jamb_number,
            chest_number,
            surname: self.surname,
            first_name: self.first_name,
            middle_name: self.middle_name,
            sex: self.sex,
            state: self.state,
            first_choice: self.first_choice,
            second_choice: self.second_choice,
            profile_image: self.profile_image,
            status: CandidateStatus::Active,
            registered_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to open roster file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to read roster CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Row that failed to register, with its 1-based CSV line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRowError {
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct RosterImportSummary {
    pub registered: Vec<ApplicationNumber>,
    pub rejected: Vec<RosterRowError>,
}

/// CSV roster importer. Expected header:
/// `application_number,jamb_number,surname,first_name,middle_name,sex,state,first_choice,second_choice`.
pub struct RosterImporter;

impl RosterImporter {
    pub fn import_from_path<R, P>(
        service: &ScreeningService<R>,
        path: P,
        actor: &ActorId,
    ) -> Result<RosterImportSummary, RosterImportError>
    where
        R: ScreeningRepository + 'static,
        P: AsRef<Path>,
    {
        let file = std::fs::File::open(path)?;
        Self::import_from_reader(service, file, actor)
    }

    pub fn import_from_reader<R, T>(
        service: &ScreeningService<R>,
        reader: T,
        actor: &ActorId,
    ) -> Result<RosterImportSummary, RosterImportError>
    where
        R: ScreeningRepository + 'static,
        T: io::Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut summary = RosterImportSummary::default();
        for (index, row) in csv_reader.deserialize::<CandidateIntake>().enumerate() {
            // Line 1 is the header row.
            let line = index as u64 + 2;
            let intake = match row {
                Ok(intake) => intake,
                Err(err) => {
                    summary.rejected.push(RosterRowError {
                        line,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            match service.register_candidate(intake, actor) {
                Ok(candidate) => summary.registered.push(candidate.application_number),
                Err(err) => summary.rejected.push(RosterRowError {
                    line,
                    message: err.to_string(),
                }),
            }
        }

        Ok(summary)
    }
}
