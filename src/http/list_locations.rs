use crate::app_config::ListFormat;
use crate::domain::LocationRecord;
use crate::http::AppState;
use crate::http::api_error::ApiError;
use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
pub struct CountedLocations {
    count: usize,
    locations: Vec<LocationRecord>,
}

impl From<Vec<LocationRecord>> for CountedLocations {
    fn from(locations: Vec<LocationRecord>) -> Self {
        CountedLocations {
            count: locations.len(),
            locations,
        }
    }
}

#[instrument(skip_all)]
pub async fn list_locations(State(state): State<AppState>) -> Result<Response, ApiError> {
    let locations = state.store.list().await?;
    debug!("📖 Listing {} location(s)", locations.len());

    let response = match state.config.routes().list_format() {
        ListFormat::Array => Json(locations).into_response(),
        ListFormat::Counted => Json(CountedLocations::from(locations)).into_response(),
    };
    Ok(response)
}

#[instrument(skip_all)]
pub async fn admin_locations(State(state): State<AppState>) -> Result<Json<CountedLocations>, ApiError> {
    let locations = state.store.list().await?;
    debug!("📖 Listing {} location(s) for admin", locations.len());

    Ok(Json(CountedLocations::from(locations)))
}
