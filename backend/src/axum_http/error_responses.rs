use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// `{error, code}` body with its HTTP status.
#[derive(Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                code: code.to_string(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Use case errors that know their HTTP status and machine-readable code.
pub trait ApiError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    fn code(&self) -> &'static str;

    fn into_error_response(self) -> ErrorResponse
    where
        Self: Sized,
    {
        let status = self.status_code();
        if status.is_server_error() {
            // Internal detail is logged by the use case, never returned.
            return ErrorResponse::internal();
        }
        ErrorResponse::new(status, self.code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum SampleError {
        #[error("name is required")]
        Validation,
        #[error(transparent)]
        Internal(#[from] anyhow::Error),
    }

    impl ApiError for SampleError {
        fn status_code(&self) -> StatusCode {
            match self {
                SampleError::Validation => StatusCode::BAD_REQUEST,
                SampleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        fn code(&self) -> &'static str {
            match self {
                SampleError::Validation => "VALIDATION_ERROR",
                SampleError::Internal(_) => "INTERNAL_ERROR",
            }
        }
    }

    #[test]
    fn client_errors_keep_their_message() {
        let response = SampleError::Validation.into_error_response();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body.error, "name is required");
        assert_eq!(response.body.code, "VALIDATION_ERROR");
    }

    #[test]
    fn internal_errors_are_masked() {
        let response =
            SampleError::Internal(anyhow::anyhow!("connection refused at 10.0.0.3")).into_error_response();
        assert_eq!(response, ErrorResponse::internal());
    }
}
