use super::common::*;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::assignment::{
    assignment_router, AssignmentState, EligibilityMatcher, RosterEligibilityQuery,
};
use crate::workflows::roster::RosterStore;

fn router() -> (Router, RosterStore) {
    let store = RosterStore::new(roster());
    let query = Arc::new(RosterEligibilityQuery::new(store.clone()));
    let state = AssignmentState {
        roster: store.clone(),
        matcher: Arc::new(EligibilityMatcher::new(query, matcher_config())),
    };
    (assignment_router(state), store)
}

fn json_request(method: Method, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

fn eligibility_payload() -> Value {
    json!({
        "job_title": "Accountant",
        "business_function_id": 1,
        "department_id": 10,
        "job_function_id": 1000,
        "position_group_id": 5000,
        "max_results": 2
    })
}

#[tokio::test]
async fn preview_route_accepts_option_shaped_grading_levels() {
    let (router, _) = router();
    let payload = json!({
        "job_title": "Accountant",
        "business_function_name": "Corporate Services",
        "department_name": "finance",
        "job_function_name": "Accounting",
        "position_group_name": "Specialists",
        "grading_levels": [{ "value": "M2", "label": "Manager 2" }, "m2"]
    });

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/job-descriptions/assignment-preview",
            &payload,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["strategy"], "auto_assign_single");
    assert_eq!(body["matched_records"][0]["identifier"], 3);
    assert_eq!(body["requires_manual_selection"], false);
    assert_eq!(body["resolved_criteria"]["grading_levels"], json!(["M2"]));
    assert!(body["evaluated_at"].is_string());
}

#[tokio::test]
async fn preview_route_reports_missing_fields() {
    let (router, _) = router();

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/job-descriptions/assignment-preview",
            &json!({ "job_title": "Accountant" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["strategy"], "no_criteria");
    assert!(body["resolved_criteria"].is_null());
}

#[tokio::test]
async fn eligibility_route_caps_lists_but_reports_totals() {
    let (router, _) = router();

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/job-descriptions/eligibility-preview",
            &eligibility_payload(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["strategy"], "manual_selection_required");
    assert_eq!(body["employees"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["vacancies"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["employee_count"], 2);
    assert_eq!(body["vacancy_count"], 1);
    assert_eq!(body["total_count"], 3);
}

#[tokio::test]
async fn eligibility_route_rejects_non_positive_ids_with_detail() {
    let (router, _) = router();
    let mut payload = eligibility_payload();
    payload["department_id"] = json!(0);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/job-descriptions/eligibility-preview",
            &payload,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["detail"], "department_id must be a positive integer");
}

#[tokio::test]
async fn roster_upload_replaces_snapshot() {
    let (router, store) = router();
    let csv = "identifier,is_vacancy,display_name,department_name,department_id\n\
               11,false,Noor Haddad,Legal,30\n\
               12,true,,Legal,30\n";

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/api/v1/roster")
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from(csv))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["records"], 2);
    assert_eq!(body["employees"], 1);
    assert_eq!(body["vacancies"], 1);
    assert_eq!(store.current().len(), 2);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/roster")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["records"], 2);
}

#[tokio::test]
async fn invalid_roster_upload_keeps_previous_snapshot() {
    let (router, store) = router();

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/api/v1/roster")
                .body(Body::from("identifier,is_vacancy\n9,perhaps\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|text| text.contains("roster error")));
    assert_eq!(store.current().len(), 5);
}
