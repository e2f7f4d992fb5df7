//! Organization endpoints: registration, login, profile, directory and
//! the actionable case queues.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use resgate_common::{AppError, AppResult};
use resgate_core::{RegisterOrgInput, UpdateOrgProfileInput};
use resgate_db::entities::{CaseStatus, organization};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::reports::ReportResponse,
    endpoints::rescues::RescueResponse,
    endpoints::users::{LoginRequest, LogoutResponse, UpdateProfileResponse},
    extractors::{AuthOrg, RawToken},
    middleware::{AppState, SESSION_COOKIE},
    response::ApiResponse,
};

/// Organization view returned by the API. Carries the resolved counters
/// used for reputation display; never the password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cep: Option<String>,
    pub city: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub number: Option<String>,
    pub description: Option<String>,
    pub photo_ref: Option<String>,
    pub reports_resolved: i32,
    pub rescues_resolved: i32,
    pub created_at: String,
}

impl From<organization::Model> for OrgResponse {
    fn from(org: organization::Model) -> Self {
        Self {
            id: org.id,
            name: org.name,
            email: org.email,
            phone: org.phone,
            cep: org.cep,
            city: org.city,
            district: org.district,
            address: org.address,
            number: org.number,
            description: org.description,
            photo_ref: org.photo_ref,
            reports_resolved: org.reports_resolved,
            rescues_resolved: org.rescues_resolved,
            created_at: org.created_at.to_rfc3339(),
        }
    }
}

/// Register a new organization account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterOrgInput>,
) -> AppResult<ApiResponse<OrgResponse>> {
    let org = state.account_service.register_org(input).await?;
    Ok(ApiResponse::ok(org.into()))
}

/// Organization login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgLoginResponse {
    pub token: String,
    pub org: OrgResponse,
}

/// Log in as an organization. An active user session is rejected, not
/// overwritten.
async fn login(
    State(state): State<AppState>,
    RawToken(current): RawToken,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<OrgLoginResponse>)> {
    let (token, org) = state
        .session_service
        .login_org(&req.email, &req.password, current.as_deref())
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .build();

    Ok((
        jar.add(cookie),
        ApiResponse::ok(OrgLoginResponse {
            token,
            org: org.into(),
        }),
    ))
}

/// Log out the organization session.
async fn logout(
    State(state): State<AppState>,
    RawToken(token): RawToken,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<LogoutResponse>)> {
    if let Some(token) = token {
        state.session_service.logout(&token).await?;
    }
    Ok((
        jar.remove(Cookie::from(SESSION_COOKIE)),
        ApiResponse::ok(LogoutResponse { ok: true }),
    ))
}

/// Get the logged-in organization's profile, straight from the store.
async fn me(
    org: AuthOrg,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OrgResponse>> {
    let org = state.account_service.get_org(&org.id).await?;
    Ok(ApiResponse::ok(org.into()))
}

/// Update the logged-in organization's profile.
async fn update(
    org: AuthOrg,
    State(state): State<AppState>,
    Json(input): Json<UpdateOrgProfileInput>,
) -> AppResult<ApiResponse<UpdateProfileResponse>> {
    let changed = state
        .account_service
        .update_org_profile(&org.id, input)
        .await?;
    Ok(ApiResponse::ok(UpdateProfileResponse { changed }))
}

/// Directory query parameters.
#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    /// Case-insensitive substring filter on the organization's city.
    pub city: Option<String>,
}

/// Public organization directory, optionally filtered by city.
async fn directory(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> AppResult<ApiResponse<Vec<OrgResponse>>> {
    let orgs = state
        .directory_service
        .list(query.city.as_deref())
        .await?;
    Ok(ApiResponse::ok(orgs.into_iter().map(Into::into).collect()))
}

/// Queue query parameters.
#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    /// Case status filter; defaults to `pending`.
    pub status: Option<String>,
}

fn parse_status(query: &QueueQuery) -> AppResult<CaseStatus> {
    match query.status.as_deref() {
        None => Ok(CaseStatus::Pending),
        Some(raw) => raw.parse().map_err(AppError::Validation),
    }
}

/// The logged-in organization's report queue. The city scope comes from
/// the organization's stored row.
async fn queue_reports(
    org: AuthOrg,
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let status = parse_status(&query)?;
    let reports = state.case_service.queue_reports(&org.id, status).await?;
    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// The logged-in organization's rescue queue.
async fn queue_rescues(
    org: AuthOrg,
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> AppResult<ApiResponse<Vec<RescueResponse>>> {
    let status = parse_status(&query)?;
    let rescues = state.case_service.queue_rescues(&org.id, status).await?;
    Ok(ApiResponse::ok(
        rescues.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(directory))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/update", post(update))
        .route("/queue/reports", get(queue_reports))
        .route("/queue/rescues", get(queue_rescues))
}
