//! User endpoints: registration, login, profile, own cases.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use resgate_common::AppResult;
use resgate_core::{RegisterUserInput, UpdateUserProfileInput};
use resgate_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::reports::ReportResponse,
    endpoints::rescues::RescueResponse,
    extractors::{AuthUser, RawToken},
    middleware::{AppState, SESSION_COOKIE},
    response::ApiResponse,
};

/// User view returned by the API. The password hash never appears here.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cep: Option<String>,
    pub city: String,
    pub address: Option<String>,
    pub number: Option<String>,
    pub photo_ref: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            cep: user.cep,
            city: user.city,
            address: user.address,
            number: user.number,
            photo_ref: user.photo_ref,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Register a new user account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.account_service.register_user(input).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Log in as a user. The token is returned in the body and set as a
/// cookie; an active organization session is rejected, not overwritten.
async fn login(
    State(state): State<AppState>,
    RawToken(current): RawToken,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<LoginResponse>)> {
    let (token, user) = state
        .session_service
        .login_user(&req.email, &req.password, current.as_deref())
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .build();

    Ok((
        jar.add(cookie),
        ApiResponse::ok(LoginResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Logout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub ok: bool,
}

/// Log out, clearing the whole session at once.
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

/// Get the logged-in user's profile, straight from the store.
async fn me(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.account_service.get_user(&user.id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Result of a profile update: the fields that actually changed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    pub changed: Vec<&'static str>,
}

/// Update the logged-in user's profile. Unchanged and blank fields are
/// skipped; an empty change set is success.
async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateUserProfileInput>,
) -> AppResult<ApiResponse<UpdateProfileResponse>> {
    let changed = state
        .account_service
        .update_user_profile(&user.id, input)
        .await?;
    Ok(ApiResponse::ok(UpdateProfileResponse { changed }))
}

/// List the logged-in user's reports, newest first.
async fn my_reports(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let reports = state.case_service.list_reports_by_owner(&user.id).await?;
    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// List the logged-in user's rescues, newest first.
async fn my_rescues(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<RescueResponse>>> {
    let rescues = state.case_service.list_rescues_by_owner(&user.id).await?;
    Ok(ApiResponse::ok(
        rescues.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/update", post(update))
        .route("/me/reports", get(my_reports))
        .route("/me/rescues", get(my_rescues))
}
