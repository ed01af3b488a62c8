//! Error types for the weather lookup API

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP endpoints.
///
/// Store write failures are deliberately not represented here: recording a
/// viewed location is best-effort and is absorbed (logged) at the call site.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Neither a place name nor a coordinate pair was supplied
    #[error("Missing query or coordinates.")]
    MissingInput,

    /// A coordinate pair was supplied but could not be parsed as numbers
    #[error("Invalid coordinates.")]
    InvalidCoordinates,

    /// The provider credential is absent from the server environment
    #[error("OPENWEATHER_API_KEY not configured on server.")]
    MissingApiKey,

    /// The provider answered with a non-success status
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// The provider could not be reached or returned an unreadable body
    #[error("Failed to fetch weather data.")]
    Transport(#[from] reqwest::Error),

    /// Reading the recent-location store failed
    #[error("Failed to fetch recent locations.")]
    StoreRead(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingInput | ApiError::InvalidCoordinates => StatusCode::BAD_REQUEST,
            ApiError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Transport(_) | ApiError::StoreRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
