//! Rescue endpoints: submission, lookup, deletion and the claim workflow.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use resgate_common::AppResult;
use resgate_core::SubmitRescueInput;
use resgate_db::entities::{CaseStatus, rescue};
use serde::Serialize;

use crate::{
    extractors::{AuthOrg, AuthUser, CurrentSession},
    middleware::AppState,
    response::{ActionResponse, ApiResponse},
};

/// Rescue view returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescueResponse {
    pub id: String,
    pub description: String,
    pub author_name: String,
    pub city: String,
    pub cep: Option<String>,
    pub address: Option<String>,
    pub number: Option<String>,
    pub contact_phone: Option<String>,
    pub photo_ref: Option<String>,
    pub status: CaseStatus,
    pub reporter_id: Option<String>,
    pub assigned_org_id: Option<String>,
    pub created_at: String,
}

impl From<rescue::Model> for RescueResponse {
    fn from(rescue: rescue::Model) -> Self {
        Self {
            id: rescue.id,
            description: rescue.description,
            author_name: rescue.author_name,
            city: rescue.city,
            cep: rescue.cep,
            address: rescue.address,
            number: rescue.number,
            contact_phone: rescue.contact_phone,
            photo_ref: rescue.photo_ref,
            status: rescue.status,
            reporter_id: rescue.reporter_id,
            assigned_org_id: rescue.assigned_org_id,
            created_at: rescue.created_at.to_rfc3339(),
        }
    }
}

/// Submit a rescue request. The author name is required even when
/// anonymous.
async fn submit(
    CurrentSession(session): CurrentSession,
    State(state): State<AppState>,
    Json(input): Json<SubmitRescueInput>,
) -> AppResult<ApiResponse<RescueResponse>> {
    let rescue = state.case_service.submit_rescue(input, &session).await?;
    Ok(ApiResponse::ok(rescue.into()))
}

/// Get one rescue.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RescueResponse>> {
    let rescue = state.case_service.get_rescue(&id).await?;
    Ok(ApiResponse::ok(rescue.into()))
}

/// Delete a rescue. Owner only.
async fn remove(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ActionResponse> {
    state.case_service.delete_rescue(&id, &user.id).await?;
    Ok(ActionResponse::ok("rescue deleted"))
}

/// Claim a pending rescue for the logged-in organization.
async fn claim(
    org: AuthOrg,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ActionResponse> {
    state.workflow_service.claim_rescue(&id, &org.id).await?;
    Ok(ActionResponse::ok("rescue claimed"))
}

/// Reject a pending rescue.
async fn reject(
    org: AuthOrg,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ActionResponse> {
    state.workflow_service.reject_rescue(&id, &org.id).await?;
    Ok(ActionResponse::ok("rescue rejected"))
}

/// Finish an in-progress rescue claimed by the logged-in organization.
async fn finish(
    org: AuthOrg,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ActionResponse> {
    state.workflow_service.finish_rescue(&id, &org.id).await?;
    Ok(ActionResponse::ok("rescue finished"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/{id}", get(show).delete(remove))
        .route("/{id}/claim", post(claim))
        .route("/{id}/reject", post(reject))
        .route("/{id}/finish", post(finish))
}
