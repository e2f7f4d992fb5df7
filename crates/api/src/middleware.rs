//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use resgate_core::{
    AccountService, AddressService, CaseService, CityCatalog, DirectoryService, SessionService,
    WorkflowService,
};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "resgate_sid";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub session_service: SessionService,
    pub case_service: CaseService,
    pub workflow_service: WorkflowService,
    pub directory_service: DirectoryService,
    pub address_service: AddressService,
    pub city_catalog: CityCatalog,
}

/// The raw session token presented by the client, if any.
///
/// Stored in request extensions by [`session_middleware`] so that login
/// handlers can replace or reject the existing session.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<String>);

/// Session resolution middleware.
///
/// Accepts the token as `Authorization: Bearer <token>` or the
/// [`SESSION_COOKIE`] cookie, resolves it once and stores the resulting
/// `Session` (and the raw token) in request extensions. Unknown tokens
/// resolve to an anonymous session rather than an error.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = bearer_token(&req)
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()));

    let session = match state.session_service.resolve(token.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Session resolution failed");
            resgate_core::Session::Anonymous
        }
    };

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(SessionToken(token));

    next.run(req).await
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(ToString::to_string)
}
