//! HTTP error mapping

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fixbrain_app::AgentError;
use fixbrain_types::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Error returned by a handler, rendered as `{error, code}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn payload_too_large() -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "Request body exceeds the upload limit",
        )
    }

    pub fn missing_field(name: &str) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing_field",
            format!("Missing multipart field: {}", name),
        )
    }
}

fn classify(err: &Error) -> (StatusCode, &'static str) {
    match err {
        Error::InvalidTaskId(_) => (StatusCode::BAD_REQUEST, "invalid_task_id"),
        Error::InvalidImage(_) => (StatusCode::BAD_REQUEST, "invalid_image"),
        Error::TaskNotFound(_) => (StatusCode::NOT_FOUND, "task_not_found"),
        Error::MalformedResponse(_) | Error::InvalidDiagnosis(_) => {
            (StatusCode::BAD_GATEWAY, "invalid_model_output")
        }
        Error::UpstreamStatus { .. } | Error::Http(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
        Error::Io(_) | Error::Json(_) | Error::Config(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}

/// Client-facing text for a server-side failure; the detail only goes to the log
fn server_message(code: &str) -> &'static str {
    match code {
        "invalid_model_output" => "The diagnosis model returned an unusable response",
        "upstream_error" => "The diagnosis model could not be reached",
        _ => "Internal error while processing the request",
    }
}

impl ApiError {
    fn from_error(err: Error, log_detail: bool) -> Self {
        let (status, code) = classify(&err);
        if !status.is_server_error() {
            return Self::new(status, code, err.to_string());
        }
        if log_detail {
            error!(error = %err, code, "request failed");
        }
        Self::new(status, code, server_message(code))
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::from_error(err, true)
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        // The agent has already logged the failure
        Self::from_error(err.into_inner(), false)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::payload_too_large();
        }
        Self::new(err.status(), "invalid_multipart", err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), "invalid_multipart", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidTaskId("../x".into()), StatusCode::BAD_REQUEST),
            (Error::InvalidImage("text/plain".into()), StatusCode::BAD_REQUEST),
            (Error::TaskNotFound("t1".into()), StatusCode::NOT_FOUND),
            (Error::MalformedResponse("prose".into()), StatusCode::BAD_GATEWAY),
            (Error::InvalidDiagnosis("maybe".into()), StatusCode::BAD_GATEWAY),
            (
                Error::UpstreamStatus {
                    status: 500,
                    body: String::new(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_bad_gateway_hides_model_output() {
        let api = ApiError::from(AgentError::Reasoning(Error::MalformedResponse(
            "I think the belt is worn".into(),
        )));
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.code, "invalid_model_output");
        assert!(!api.message.contains("belt"));

        let api = ApiError::from(Error::UpstreamStatus {
            status: 429,
            body: "rate limit for org-abc123".into(),
        });
        assert_eq!(api.code, "upstream_error");
        assert!(!api.message.contains("org-abc123"));
    }

    #[test]
    fn test_storage_failure_hides_detail() {
        let err = AgentError::Storage(Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/srv/data/tasks is read-only",
        )));
        let api = ApiError::from(err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("/srv/data"));
    }
}
