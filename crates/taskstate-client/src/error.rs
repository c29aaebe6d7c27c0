//! Classification of store responses and transport failures.

use std::error::Error as _;

use reqwest::StatusCode;
use taskstate_core::StateError;

use crate::wire::ErrorResponse;

/// Map a response whose status is not the one the operation expects.
pub fn classify_status(status: StatusCode, body: String, resource: &str) -> StateError {
    match status {
        StatusCode::NOT_FOUND => StateError::NotFound(resource.to_string()),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            // Keep the store's own explanation when it sent one.
            match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(detail) => StateError::Conflict(format!("{resource}: {}", detail.error)),
                Err(_) => StateError::Conflict(resource.to_string()),
            }
        }
        _ => StateError::Unexpected {
            status: status.as_u16(),
            body,
        },
    }
}

/// Body of a rejected response. A failed read keeps its reason in place of
/// the body.
pub fn error_body(read: Result<String, reqwest::Error>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => format!("<failed to read response body: {e}>"),
    }
}

/// Map a transport failure. The request may or may not have reached the
/// store, so all of these are `Unreachable`.
pub fn transport_error(err: reqwest::Error, resource: &str) -> StateError {
    let what = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_decode() || err.is_body() {
        "malformed response"
    } else {
        "request failed"
    };

    let mut message = format!("{what} for {resource}: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    StateError::Unreachable(message)
}
