//! Report endpoints: submission, lookup, deletion and the claim workflow.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use resgate_common::AppResult;
use resgate_core::SubmitReportInput;
use resgate_db::entities::{CaseStatus, report};
use serde::Serialize;

use crate::{
    extractors::{AuthOrg, AuthUser, CurrentSession},
    middleware::AppState,
    response::{ActionResponse, ApiResponse},
};

/// Report view returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub city: String,
    pub address: Option<String>,
    pub sighted_at: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub photo_ref: Option<String>,
    pub status: CaseStatus,
    pub reporter_id: Option<String>,
    pub assigned_org_id: Option<String>,
    pub created_at: String,
}

impl From<report::Model> for ReportResponse {
    fn from(report: report::Model) -> Self {
        Self {
            id: report.id,
            title: report.title,
            description: report.description,
            city: report.city,
            address: report.address,
            sighted_at: report.sighted_at.to_string(),
            contact_phone: report.contact_phone,
            contact_email: report.contact_email,
            photo_ref: report.photo_ref,
            status: report.status,
            reporter_id: report.reporter_id,
            assigned_org_id: report.assigned_org_id,
            created_at: report.created_at.to_rfc3339(),
        }
    }
}

/// Submit a report. Works for anonymous and logged-in users alike.
async fn submit(
    CurrentSession(session): CurrentSession,
    State(state): State<AppState>,
    Json(input): Json<SubmitReportInput>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state.case_service.submit_report(input, &session).await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Get one report.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state.case_service.get_report(&id).await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Delete a report. Owner only.
async fn remove(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ActionResponse> {
    state.case_service.delete_report(&id, &user.id).await?;
    Ok(ActionResponse::ok("report deleted"))
}

/// Claim a pending report for the logged-in organization.
async fn claim(
    org: AuthOrg,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ActionResponse> {
    state.workflow_service.claim_report(&id, &org.id).await?;
    Ok(ActionResponse::ok("report claimed"))
}

/// Reject a pending report.
async fn reject(
    org: AuthOrg,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ActionResponse> {
    state.workflow_service.reject_report(&id, &org.id).await?;
    Ok(ActionResponse::ok("report rejected"))
}

/// Finish an in-progress report claimed by the logged-in organization.
async fn finish(
    org: AuthOrg,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ActionResponse> {
    state.workflow_service.finish_report(&id, &org.id).await?;
    Ok(ActionResponse::ok("report finished"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/{id}", get(show).delete(remove))
        .route("/{id}/claim", post(claim))
        .route("/{id}/reject", post(reject))
        .route("/{id}/finish", post(finish))
}
