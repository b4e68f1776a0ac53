use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{AssessmentId, AssessmentRequest, ScoreInput, SubcategoryId};
use super::repository::{AssessmentRepository, RepositoryError, RubricCatalog};
use super::service::{AssessmentService, AssessmentServiceError};

type SharedService<R, C> = Arc<AssessmentService<R, C>>;

/// Router builder exposing HTTP endpoints for scoring and the assessment lifecycle.
pub fn assessment_router<R, C>(service: SharedService<R, C>) -> Router
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(start_handler::<R, C>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(status_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/scores",
            post(record_score_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/scores/:subcategory_id",
            get(score_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/scorecard",
            get(scorecard_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/complete",
            post(complete_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/submit",
            post(submit_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/approve",
            post(approve_handler::<R, C>),
        )
        .route(
            "/api/v1/portfolio/summary",
            get(portfolio_handler::<R, C>),
        )
        .with_state(service)
}

pub(crate) async fn start_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    axum::Json(request): axum::Json<AssessmentRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    match service.start(request) {
        Ok(assessment) => (StatusCode::CREATED, axum::Json(assessment.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    match service.get(&AssessmentId(assessment_id)) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_score_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(assessment_id): Path<String>,
    axum::Json(input): axum::Json<ScoreInput>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    match service.record_score(&AssessmentId(assessment_id), input) {
        Ok(outcome) => {
            let payload = json!({
                "record": outcome.record,
                "assessment": outcome.assessment.view(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path((assessment_id, subcategory_id)): Path<(String, String)>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    let id = AssessmentId(assessment_id);
    let subcategory_id = SubcategoryId(subcategory_id);
    match service.score(&id, &subcategory_id) {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": format!("no score recorded for '{subcategory_id}'"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scorecard_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    match service.scorecard(&AssessmentId(assessment_id)) {
        Ok(scorecard) => (StatusCode::OK, axum::Json(scorecard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    match service.complete(&AssessmentId(assessment_id)) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    match service.submit(&AssessmentId(assessment_id)) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    match service.approve(&AssessmentId(assessment_id)) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn portfolio_handler<R, C>(State(service): State<SharedService<R, C>>) -> Response
where
    R: AssessmentRepository + 'static,
    C: RubricCatalog + 'static,
{
    match service.portfolio_summary() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

/// HTTP status for a service failure; shared with `AppError` so both surfaces agree.
pub(crate) fn status_for(error: &AssessmentServiceError) -> StatusCode {
    match error {
        AssessmentServiceError::InvalidScore(_) | AssessmentServiceError::MissingRubric(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentServiceError::SubmissionNotAllowed(_)
        | AssessmentServiceError::Transition(_)
        | AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(error: AssessmentServiceError) -> Response {
    let status = status_for(&error);

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
