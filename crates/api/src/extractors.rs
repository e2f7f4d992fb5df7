//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use resgate_core::Session;

use crate::middleware::SessionToken;

/// The session attached to the request, whatever its kind.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Absent extension means the middleware did not run; treat as anonymous
        Ok(Self(
            parts
                .extensions
                .get::<Session>()
                .cloned()
                .unwrap_or(Session::Anonymous),
        ))
    }
}

/// The raw session token presented by the client.
#[derive(Debug, Clone)]
pub struct RawToken(pub Option<String>);

impl<S> FromRequestParts<S> for RawToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<SessionToken>()
                .and_then(|t| t.0.clone()),
        ))
    }
}

/// Authenticated user extractor. Rejects anonymous and organization
/// sessions with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account ID.
    pub id: String,
    /// Display snapshot.
    pub name: String,
    /// Display snapshot. Guards re-fetch the store instead of using this.
    pub city: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(Session::User { id, name, city }) => Ok(Self {
                id: id.clone(),
                name: name.clone(),
                city: city.clone(),
            }),
            _ => Err((StatusCode::UNAUTHORIZED, "Unauthorized")),
        }
    }
}

/// Authenticated organization extractor. Rejects anonymous and user
/// sessions with 401.
#[derive(Debug, Clone)]
pub struct AuthOrg {
    /// Account ID.
    pub id: String,
    /// Display snapshot.
    pub name: String,
    /// Display snapshot. Guards re-fetch the store instead of using this.
    pub city: String,
}

impl<S> FromRequestParts<S> for AuthOrg
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(Session::Org { id, name, city }) => Ok(Self {
                id: id.clone(),
                name: name.clone(),
                city: city.clone(),
            }),
            _ => Err((StatusCode::UNAUTHORIZED, "Unauthorized")),
        }
    }
}
