//! `POST /api/verify`: run one submission through the pipeline.
//!
//! The PDF arrives as base64 (raw or as a data URL). Validation failures
//! become 4xx errors; an extraction failure is still a 200 with an
//! `Error` verdict in the body.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::{Submission, ValidationError, VerificationResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub document_type: Option<String>,
    /// Base64 PDF, optionally as `data:application/pdf;base64,...`.
    #[serde(default)]
    pub pdf_base64: Option<String>,
    /// Asserted values. Numbers and booleans are accepted and kept as text.
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl VerifyRequest {
    fn has_document_type(&self) -> bool {
        self.document_type
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

pub async fn verify(
    State(ctx): State<ApiContext>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerificationResult>, ApiError> {
    let Json(payload) = payload?;

    let pdf_bytes = match payload
        .pdf_base64
        .as_deref()
        .map(str::trim)
        .filter(|data| !data.is_empty())
    {
        Some(data) => match decode_data_url(data) {
            Ok(bytes) => Some(bytes),
            Err(_) if !payload.has_document_type() => {
                return Err(ApiError::Validation(ValidationError::MissingDocumentType));
            }
            Err(e) => return Err(ApiError::BadRequest(e)),
        },
        None => None,
    };

    let asserted: HashMap<String, String> = payload
        .fields
        .into_iter()
        .filter_map(|(key, value)| field_text(value).map(|text| (key, text)))
        .collect();

    let submission = Submission {
        document_type: payload.document_type,
        pdf_bytes,
        asserted: asserted.into(),
    };

    let pipeline = ctx.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.verify(&submission))
        .await
        .map_err(|e| ApiError::Internal(format!("Verification task failed: {e}")))??;

    tracing::info!(
        verification_id = %result.verification_id,
        status = %result.status,
        "Verification served"
    );
    Ok(Json(result))
}

/// Scalar JSON values as text; null, arrays and objects are dropped.
fn field_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decode a base64 payload, stripping a data-URL prefix if present.
/// Line-wrapped base64 is accepted.
fn decode_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let base64_data = match data_url.find(',') {
        Some(idx) => &data_url[idx + 1..],
        None => data_url,
    };
    let compact: String = base64_data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| format!("pdfBase64 is not valid base64: {e}"))
}
