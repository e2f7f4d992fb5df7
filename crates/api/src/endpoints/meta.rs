//! Meta endpoints: form-population data (cities, postal-code lookup).

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use resgate_common::AppResult;
use resgate_core::Address;

use crate::{middleware::AppState, response::ApiResponse};

/// The city catalog loaded at process start.
async fn cities(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.city_catalog.names().to_vec())
}

/// Resolve a postal code to address fields. Passthrough to the configured
/// provider; no caching.
async fn resolve_cep(
    State(state): State<AppState>,
    Path(cep): Path<String>,
) -> AppResult<ApiResponse<Address>> {
    let address = state.address_service.resolve(&cep).await?;
    Ok(ApiResponse::ok(address))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cities", get(cities))
        .route("/cep/{cep}", get(resolve_cep))
}
