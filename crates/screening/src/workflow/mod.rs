//! Candidate screening workflow: stage registry, intake, per-stage
//! assessments, progression, and score aggregation.

pub mod assessment;
pub mod candidate;
pub mod intake;
pub mod memory;
pub mod progression;
pub mod registry;
pub mod routes;
pub mod scoring;
pub mod service;

pub use assessment::{AssessmentPayload, Verdict};
pub use candidate::{ActorId, ApplicationNumber, Candidate, CandidateStatus};
pub use registry::{Stage, StageRegistry};
pub use routes::screening_router;
pub use service::{AssessmentOutcome, ScreeningError, ScreeningService};
