//! In-memory repository adapter. Backs the demo CLI, the default server
//! wiring, and the workflow tests; a relational adapter would replace it in
//! production with unique constraints on (candidate, stage) doing the same
//! duplicate suppression.

use super::candidate::{
    ActorId, ApplicationNumber, Candidate, CandidateStage, CandidateStatus, StageStatus, StateCode,
};
use super::registry::Stage;
use super::service::{AssessmentRecord, RepositoryError, ScreeningRepository};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Store {
    candidates: HashMap<ApplicationNumber, Candidate>,
    ledger: HashMap<(ApplicationNumber, Stage), CandidateStage>,
    assessments: HashMap<(ApplicationNumber, Stage), AssessmentRecord>,
    history: Vec<AssessmentRecord>,
    chest_counters: HashMap<StateCode, u32>,
}

/// One mutex over the whole store keeps every repository call atomic,
/// including the check-then-insert in `admit_to_stage`.
#[derive(Default, Clone)]
pub struct InMemoryScreeningRepository {
    store: Arc<Mutex<Store>>,
}

impl ScreeningRepository for InMemoryScreeningRepository {
    fn insert_candidate(
        &self,
        candidate: Candidate,
        opening: CandidateStage,
    ) -> Result<Candidate, RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        let duplicate = store.candidates.contains_key(&candidate.application_number)
            || store
                .candidates
                .values()
                .any(|existing| existing.jamb_number == candidate.jamb_number);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        store
            .candidates
            .insert(candidate.application_number.clone(), candidate.clone());
        store
            .ledger
            .insert((opening.candidate.clone(), opening.stage), opening);
        Ok(candidate)
    }

    fn fetch_candidate(
        &self,
        id: &ApplicationNumber,
    ) -> Result<Option<Candidate>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store.candidates.get(id).cloned())
    }

    fn candidates(&self) -> Result<Vec<Candidate>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store.candidates.values().cloned().collect())
    }

    fn set_candidate_status(
        &self,
        id: &ApplicationNumber,
        status: CandidateStatus,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        let candidate = store
            .candidates
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        candidate.status = status;
        Ok(())
    }

    fn next_chest_sequence(&self, state: &StateCode) -> Result<u32, RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        let counter = store.chest_counters.entry(state.clone()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn admit_to_stage(&self, entry: CandidateStage) -> Result<bool, RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        let key = (entry.candidate.clone(), entry.stage);
        if store.ledger.contains_key(&key) {
            return Ok(false);
        }
        store.ledger.insert(key, entry);
        Ok(true)
    }

    fn set_stage_status(
        &self,
        id: &ApplicationNumber,
        stage: Stage,
        status: StageStatus,
        actor: &ActorId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        let entry = store
            .ledger
            .get_mut(&(id.clone(), stage))
            .ok_or(RepositoryError::NotFound)?;
        entry.status = status;
        entry.updated_at = at;
        entry.updated_by = Some(actor.clone());
        Ok(())
    }

    fn candidate_stage(
        &self,
        id: &ApplicationNumber,
        stage: Stage,
    ) -> Result<Option<CandidateStage>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store.ledger.get(&(id.clone(), stage)).cloned())
    }

    fn ledger(&self, id: &ApplicationNumber) -> Result<Vec<CandidateStage>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store
            .ledger
            .values()
            .filter(|entry| &entry.candidate == id)
            .cloned()
            .collect())
    }

    fn upsert_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        store
            .assessments
            .insert((record.candidate.clone(), record.stage), record);
        Ok(())
    }

    fn assessments(
        &self,
        id: &ApplicationNumber,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store
            .assessments
            .values()
            .filter(|record| &record.candidate == id)
            .cloned()
            .collect())
    }

    fn append_history(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        store.history.push(record);
        Ok(())
    }

    fn history(&self, id: &ApplicationNumber) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store
            .history
            .iter()
            .filter(|record| &record.candidate == id)
            .cloned()
            .collect())
    }
}
