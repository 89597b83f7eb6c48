//! API error types with structured JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::{SubmissionError, ValidationError};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(ValidationError),
    #[error("Unsupported document type: {0}")]
    UnsupportedDocumentType(String),
    #[error("Payload too large: {size} bytes (limit {max})")]
    PayloadTooLarge { size: usize, max: usize },
    #[error("Request body too large: {0}")]
    BodyTooLarge(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION", e.to_string()),
            ApiError::UnsupportedDocumentType(doc_type) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_DOCUMENT_TYPE",
                format!("Unsupported document type: {doc_type}"),
            ),
            ApiError::PayloadTooLarge { size, max } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                format!("Document is {size} bytes, the limit is {max} bytes"),
            ),
            ApiError::BodyTooLarge(detail) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                detail.clone(),
            ),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation(ValidationError::TooLarge { size, max }) => {
                ApiError::PayloadTooLarge { size, max }
            }
            SubmissionError::Validation(e) => ApiError::Validation(e),
            SubmissionError::UnsupportedDocumentType(
                crate::pipeline::registry::RegistryError::UnsupportedDocumentType(doc_type),
            ) => ApiError::UnsupportedDocumentType(doc_type),
        }
    }
}

/// Body extraction failures keep the JSON error shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BodyTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::registry::RegistryError;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_returns_400() {
        let response = ApiError::Validation(ValidationError::MissingDocument).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
        assert_eq!(json["error"]["message"], "Please upload a PDF document");
    }

    #[tokio::test]
    async fn unsupported_type_returns_400() {
        let err: ApiError = SubmissionError::UnsupportedDocumentType(
            RegistryError::UnsupportedDocumentType("lease".into()),
        )
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "UNSUPPORTED_DOCUMENT_TYPE");
        assert!(json["error"]["message"].as_str().unwrap().contains("lease"));
    }

    #[tokio::test]
    async fn too_large_maps_to_413() {
        let err: ApiError =
            SubmissionError::Validation(ValidationError::TooLarge { size: 10, max: 5 }).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("pdfBase64 is not valid base64".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_returns_500() {
        let response = ApiError::Internal("worker panicked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        // Internal errors hide details from client
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
