use crate::domain::BoundingBox;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    MalformedPayload(String),
    #[error("location ({latitude}, {longitude}) is outside the accepted area: {bounds}")]
    OutsideBoundingBox { latitude: f64, longitude: f64, bounds: BoundingBox },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MalformedPayload(_) | ApiError::OutsideBoundingBox { .. } => StatusCode::BAD_REQUEST,
            ApiError::Store(err) => {
                match err.path() {
                    Some(path) => error!(path = %path.display(), "🔴 {}", err),
                    None => error!("🔴 {}", err),
                }
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
