//! HTTP API layer for resgate.
//!
//! This crate provides the JSON API:
//!
//! - **Endpoints**: accounts, cases, the claim workflow, the directory
//! - **Extractors**: session-kind authentication
//! - **Middleware**: session resolution from bearer token or cookie
//!
//! Built on Axum 0.8 with Tower middleware stack. Rendering is external;
//! every handler returns structured JSON.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, SESSION_COOKIE, session_middleware};
