//! API endpoints.

mod meta;
mod orgs;
mod reports;
mod rescues;
mod users;

use axum::Router;

use crate::middleware::AppState;

pub use reports::ReportResponse;
pub use rescues::RescueResponse;
pub use users::UserResponse;

/// Build the API router. Callers nest this under `/api` and attach the
/// session middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/orgs", orgs::router())
        .nest("/reports", reports::router())
        .nest("/rescues", rescues::router())
        .nest("/meta", meta::router())
}
