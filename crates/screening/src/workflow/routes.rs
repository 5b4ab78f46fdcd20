//! HTTP surface for the screening workflow.

use super::assessment::AssessmentPayload;
use super::candidate::{ActorId, ApplicationNumber, StateCode};
use super::intake::CandidateIntake;
use super::registry::Stage;
use super::service::{RepositoryError, ScreeningError, ScreeningRepository, ScreeningService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Router builder exposing the screening endpoints. Actor identity arrives
/// in the request body; authenticating it is the session layer's concern.
/// Application numbers travel as single path segments, so an id containing
/// `/` must be percent-encoded by the caller.
pub fn screening_router<R>(service: Arc<ScreeningService<R>>) -> Router
where
    R: ScreeningRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/screening/candidates",
            post(register_handler::<R>),
        )
        .route(
            "/api/v1/screening/candidates/:application_number/assessments/:stage",
            post(submit_handler::<R>),
        )
        .route(
            "/api/v1/screening/candidates/:application_number/progress",
            get(progress_handler::<R>),
        )
        .route(
            "/api/v1/screening/candidates/:application_number/history",
            get(history_handler::<R>),
        )
        .route("/api/v1/screening/stages", get(stages_handler::<R>))
        .route(
            "/api/v1/screening/stages/:stage/toggle",
            post(toggle_handler::<R>),
        )
        .route("/api/v1/screening/scores", get(scores_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    actor_id: ActorId,
    candidate: CandidateIntake,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    actor_id: ActorId,
    payload: AssessmentPayload,
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    actor_id: ActorId,
}

#[derive(Debug, Deserialize)]
struct ScoreQuery {
    #[serde(default)]
    state: Option<String>,
}

fn error_response(error: ScreeningError) -> Response {
    let status = match &error {
        ScreeningError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ScreeningError::StageLocked { .. }
        | ScreeningError::NotAdmitted { .. }
        | ScreeningError::TerminalCandidate { .. }
        | ScreeningError::StageMismatch { .. }
        | ScreeningError::DuplicateCandidate { .. } => StatusCode::CONFLICT,
        ScreeningError::CandidateNotFound(_) => StatusCode::NOT_FOUND,
        ScreeningError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ScreeningError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ScreeningError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = axum::Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}

fn unknown_stage(raw: &str) -> Response {
    let body = axum::Json(json!({
        "error": format!("unknown stage '{raw}'"),
        "known_stages": Stage::ordered().map(Stage::slug),
    }));
    (StatusCode::NOT_FOUND, body).into_response()
}

async fn register_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    axum::Json(request): axum::Json<RegisterRequest>,
) -> Response
where
    R: ScreeningRepository + 'static,
{
    match service.register_candidate(request.candidate, &request.actor_id) {
        Ok(candidate) => {
            let payload = json!({
                "application_number": candidate.application_number.0,
                "chest_number": candidate.chest_number.0,
                "status": candidate.status,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn submit_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path((application_number, stage)): Path<(String, String)>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    R: ScreeningRepository + 'static,
{
    let Some(stage) = Stage::parse(&stage) else {
        return unknown_stage(&stage);
    };
    let candidate = ApplicationNumber(application_number);

    match service.submit_assessment(&candidate, stage, request.payload, &request.actor_id) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn progress_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(application_number): Path<String>,
) -> Response
where
    R: ScreeningRepository + 'static,
{
    let candidate = ApplicationNumber(application_number);
    match service.candidate_progress(&candidate) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn history_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(application_number): Path<String>,
) -> Response
where
    R: ScreeningRepository + 'static,
{
    let candidate = ApplicationNumber(application_number);
    match service.assessment_history(&candidate) {
        Ok(history) => (StatusCode::OK, axum::Json(history)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn stages_handler<R>(State(service): State<Arc<ScreeningService<R>>>) -> Response
where
    R: ScreeningRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.stage_states())).into_response()
}

async fn toggle_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(stage): Path<String>,
    axum::Json(request): axum::Json<ToggleRequest>,
) -> Response
where
    R: ScreeningRepository + 'static,
{
    let Some(stage) = Stage::parse(&stage) else {
        return unknown_stage(&stage);
    };
    let active = service.toggle_stage(stage, &request.actor_id);
    let payload = json!({ "stage": stage.slug(), "active": active });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

async fn scores_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Query(query): Query<ScoreQuery>,
) -> Response
where
    R: ScreeningRepository + 'static,
{
    let filter = query
        .state
        .map(|state| StateCode(state.trim().to_uppercase()));
    match service.final_scores(filter.as_ref()) {
        Ok(scores) => (StatusCode::OK, axum::Json(scores)).into_response(),
        Err(error) => error_response(error),
    }
}
