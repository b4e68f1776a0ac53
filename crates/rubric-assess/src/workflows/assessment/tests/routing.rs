use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::assessment::domain::RubricId;
use crate::workflows::assessment::router::{error_response, score_handler, submit_handler};
use crate::workflows::assessment::{AssessmentService, AssessmentServiceError, MissingRubricError};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn start_body() -> Value {
    json!({
        "application_id": "app-crm",
        "rubric_id": "rubric-split",
        "assessor_id": "assessor-1",
    })
}

fn score_body(category: &str, subcategory: &str, score: u8) -> Value {
    json!({
        "category_id": category,
        "subcategory_id": subcategory,
        "score": score,
    })
}

#[tokio::test]
async fn start_route_returns_created_view() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request("POST", "/api/v1/assessments", start_body()))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["assessment_id"], "assessment-000001");
    assert_eq!(body["status"], "draft");
    assert_eq!(body["progress"], 0);
    assert!(body.get("overall_score").is_none());
}

#[tokio::test]
async fn score_route_rejects_undefined_criteria() {
    let (service, _, _) = build_service();
    let assessment = service
        .start(request_for(&RubricId("rubric-split".to_string())))
        .expect("started");
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/assessments/{}/scores", assessment.id),
            score_body("cat-1", "sub-1a", 8),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("sub-1a"));
}

#[tokio::test]
async fn score_and_scorecard_routes_reflect_progress() {
    let (service, _, _) = build_service();
    let assessment = service
        .start(request_for(&RubricId("rubric-split".to_string())))
        .expect("started");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/assessments/{}/scores", assessment.id),
            score_body("cat-2", "sub-2a", 4),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["record"]["score"], 4);
    assert_eq!(body["record"]["confidence_level"], 3);
    assert_eq!(body["assessment"]["status"], "in_progress");
    assert_eq!(body["assessment"]["progress"], 25);

    let response = router
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/assessments/{}/scorecard", assessment.id),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["progress"], 25);
    assert_eq!(body["overall_score"], 4.0);
    assert_eq!(body["projected_classification"], "important");
    assert!(body.get("degraded").is_none());

    let response = router
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/assessments/{}/scores/sub-2b", assessment.id),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_route_conflicts_until_fully_scored() {
    let (service, _, _) = build_service();
    let assessment = service
        .start(request_for(&RubricId("rubric-split".to_string())))
        .expect("started");
    service
        .record_score(&assessment.id, input("cat-1", "sub-1a", 3))
        .expect("recorded");
    let service = Arc::new(service);

    let response = submit_handler::<MemoryRepository, MemoryCatalog>(
        State(service.clone()),
        Path(assessment.id.0.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    score_all(&service, &assessment.id, [3, 3, 3, 3]);
    let response = submit_handler::<MemoryRepository, MemoryCatalog>(
        State(service.clone()),
        Path(assessment.id.0.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "submitted");
    assert_eq!(body["classification"], "acceptable");
    assert_eq!(body["overall_score"], 3.0);
}

#[tokio::test]
async fn missing_assessments_return_not_found() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/assessments/assessment-404"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn score_handler_surfaces_repository_outage() {
    let service = Arc::new(AssessmentService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryCatalog::default()),
    ));

    let response = score_handler::<UnavailableRepository, MemoryCatalog>(
        State(service),
        Path(("assessment-1".to_string(), "sub-1a".to_string())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn portfolio_route_summarizes_assessments() {
    let (service, _, _) = build_service();
    service
        .start(request_for(&RubricId("rubric-split".to_string())))
        .expect("started");
    service
        .start(request_for(&RubricId("rubric-1".to_string())))
        .expect("started");
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/portfolio/summary"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["finished"], 0);
}

#[tokio::test]
async fn missing_rubric_maps_to_unprocessable() {
    let error = AssessmentServiceError::MissingRubric(MissingRubricError {
        assessment_id: assessment_id(),
        rubric_id: RubricId("rubric-gone".to_string()),
    });

    let response = error_response(error);

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("rubric-gone"));
}
