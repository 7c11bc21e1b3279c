use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::domain::{AssignmentPreview, MatchCriteria};
use super::matcher::EligibilityMatcher;
use super::query::{evaluate_request, EligibilityQuery, EligibilityRequest};
use crate::error::AppError;
use crate::workflows::catalog::SelectOption;
use crate::workflows::roster::{RosterImporter, RosterStore, RosterSummary};

/// Shared handles for the assignment endpoints.
pub struct AssignmentState<Q: ?Sized> {
    pub roster: RosterStore,
    pub matcher: Arc<EligibilityMatcher<Q>>,
}

impl<Q: ?Sized> Clone for AssignmentState<Q> {
    fn clone(&self) -> Self {
        Self {
            roster: self.roster.clone(),
            matcher: self.matcher.clone(),
        }
    }
}

/// Form payload; grading levels may arrive in any supported option shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentPreviewRequest {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub business_function_name: String,
    #[serde(default)]
    pub department_name: String,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub job_function_name: String,
    #[serde(default)]
    pub position_group_name: String,
    #[serde(default)]
    pub grading_levels: Vec<Value>,
}

impl AssignmentPreviewRequest {
    pub fn into_criteria(self) -> MatchCriteria {
        let grading_levels = SelectOption::from_values(&self.grading_levels)
            .into_iter()
            .map(|option| option.value)
            .collect();

        MatchCriteria {
            job_title: self.job_title,
            business_function_name: self.business_function_name,
            department_name: self.department_name,
            unit_name: self.unit_name,
            job_function_name: self.job_function_name,
            position_group_name: self.position_group_name,
            grading_levels,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentPreviewResponse {
    #[serde(flatten)]
    pub preview: AssignmentPreview,
    pub evaluated_at: DateTime<Utc>,
}

/// Router exposing the preview, the eligibility query, and roster maintenance.
pub fn assignment_router<Q>(state: AssignmentState<Q>) -> Router
where
    Q: EligibilityQuery + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/job-descriptions/assignment-preview",
            post(preview_handler::<Q>),
        )
        .route(
            "/api/v1/job-descriptions/eligibility-preview",
            post(eligibility_handler::<Q>),
        )
        .route(
            "/api/v1/roster",
            put(replace_roster_handler::<Q>).get(roster_summary_handler::<Q>),
        )
        .with_state(state)
}

pub(crate) async fn preview_handler<Q>(
    State(state): State<AssignmentState<Q>>,
    Json(payload): Json<AssignmentPreviewRequest>,
) -> Json<AssignmentPreviewResponse>
where
    Q: EligibilityQuery + ?Sized + 'static,
{
    let criteria = payload.into_criteria();
    let roster = state.roster.current();
    let preview = state.matcher.compute_preview(&criteria, &roster).await;

    Json(AssignmentPreviewResponse {
        preview,
        evaluated_at: Utc::now(),
    })
}

pub(crate) async fn eligibility_handler<Q>(
    State(state): State<AssignmentState<Q>>,
    Json(request): Json<EligibilityRequest>,
) -> Response
where
    Q: EligibilityQuery + ?Sized + 'static,
{
    if let Some(detail) = validate_request(&request) {
        let payload = json!({
            "detail": detail,
            "message": "invalid eligibility request",
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    let roster = state.roster.current();
    let response = evaluate_request(&roster, &request);
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn replace_roster_handler<Q>(
    State(state): State<AssignmentState<Q>>,
    body: String,
) -> Result<Json<RosterSummary>, AppError>
where
    Q: EligibilityQuery + ?Sized + 'static,
{
    let snapshot = RosterImporter::from_reader(body.as_bytes())?;
    let snapshot = state.roster.replace(snapshot);
    let summary = snapshot.summary();
    info!(records = summary.records, "roster snapshot replaced");
    Ok(Json(summary))
}

pub(crate) async fn roster_summary_handler<Q>(
    State(state): State<AssignmentState<Q>>,
) -> Json<RosterSummary>
where
    Q: EligibilityQuery + ?Sized + 'static,
{
    Json(state.roster.current().summary())
}

fn validate_request(request: &EligibilityRequest) -> Option<String> {
    let criteria = &request.criteria;
    if criteria.job_title.trim().is_empty() {
        return Some("job_title is required".to_string());
    }

    let ids = [
        ("business_function_id", criteria.business_function_id),
        ("department_id", criteria.department_id),
        ("job_function_id", criteria.job_function_id),
        ("position_group_id", criteria.position_group_id),
    ];
    if let Some((field, _)) = ids.iter().find(|(_, id)| *id == 0) {
        return Some(format!("{field} must be a positive integer"));
    }
    if criteria.unit_id == Some(0) {
        return Some("unit_id must be a positive integer".to_string());
    }
    if request.max_results == 0 {
        return Some("max_results must be at least 1".to_string());
    }
    None
}
