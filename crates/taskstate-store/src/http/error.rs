//! Mapping of classified errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use taskstate_client::wire::ErrorResponse;
use taskstate_core::StateError;

/// Handler error: a [`StateError`] rendered with the status code clients
/// classify it back from.
#[derive(Debug)]
pub struct ApiError(pub StateError);

impl From<StateError> for ApiError {
    fn from(err: StateError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            StateError::NotFound(_) => StatusCode::NOT_FOUND,
            StateError::Conflict(_) => StatusCode::CONFLICT,
            StateError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            StateError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StateError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
