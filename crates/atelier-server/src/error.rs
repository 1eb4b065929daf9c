use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use atelier_shared::constants::MSG_INVALID_REQUEST;
use atelier_shared::protocol::ErrorResponse;
use atelier_shared::{Outcome, SubmissionResult};

#[derive(Debug, Error)]
pub enum ServerError {
    /// User-correctable input problem, surfaced verbatim.
    #[error("{0}")]
    Validation(String),

    /// The mail transport could not be reached or refused delivery.
    #[error("{message}")]
    MailTransport {
        message: String,
        details: Option<String>,
    },

    /// Body could not be decoded at all.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ServerError {
    /// Split a [`SubmissionResult`] into its success message or the
    /// matching error.
    pub fn check_submission(result: SubmissionResult) -> Result<String, Self> {
        match result.outcome {
            Outcome::Success => Ok(result.message),
            Outcome::ValidationError => Err(Self::Validation(result.message)),
            Outcome::TransportError => Err(Self::MailTransport {
                message: result.message,
                details: result.details,
            }),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    details: None,
                },
            ),
            ServerError::MailTransport { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    details,
                },
            ),
            ServerError::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: MSG_INVALID_REQUEST.to_string(),
                    details: Some(reason),
                },
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_message_through() {
        let message = ServerError::check_submission(SubmissionResult::success()).unwrap();
        assert_eq!(message, atelier_shared::constants::MSG_SENT);
    }

    #[test]
    fn test_transport_status() {
        let err = ServerError::check_submission(SubmissionResult::send_failed("550 rejected"))
            .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_request_status() {
        let response = ServerError::BadRequest("EOF".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
