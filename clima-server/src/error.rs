use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clima_core::{ForecastError, GeocodeError};

/// HTTP-facing error: either the caller's input was unusable before any
/// upstream call, or an upstream round-trip failed.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Upstream(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("No se pudo obtener el clima: {reason}"),
            )
                .into_response(),
        }
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}
