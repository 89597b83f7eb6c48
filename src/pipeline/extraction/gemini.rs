//! Gemini `generateContent` client for schema-constrained extraction.
//!
//! One blocking request per document: the PDF travels inline as base64,
//! followed by the document type's prompt, with `responseMimeType` set to
//! JSON and the response schema from `build_response_schema`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::parser::parse_extraction_response;
use super::schema::build_response_schema;
use super::types::{ExtractedData, Extractor};
use super::ExtractionError;
use crate::pipeline::registry::DocumentTypeConfig;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const PDF_MIME_TYPE: &str = "application/pdf";
const JSON_MIME_TYPE: &str = "application/json";
const NO_TEXT_MESSAGE: &str = "No valid response text received from the extraction service";

/// Gemini HTTP client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ExtractionError> {
        if api_key.trim().is_empty() {
            return Err(ExtractionError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExtractionError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: &'static str,
    /// Base64-encoded payload.
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: &'static str,
    pub response_schema: Value,
}

/// Response body from `generateContent`. Every level is optional.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Build the single extraction request for a document.
pub fn build_generate_request(
    pdf_bytes: &[u8],
    config: &DocumentTypeConfig,
) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: PDF_MIME_TYPE,
                        data: base64::engine::general_purpose::STANDARD.encode(pdf_bytes),
                    },
                },
                Part::Text {
                    text: config.prompt_template.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: JSON_MIME_TYPE,
            response_schema: build_response_schema(config),
        },
    }
}

/// First candidate's first text part, if it carries anything.
fn first_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.trim().is_empty())
}

impl Extractor for GeminiClient {
    fn extract(
        &self,
        pdf_bytes: &[u8],
        config: &DocumentTypeConfig,
    ) -> Result<ExtractedData, ExtractionError> {
        info!(
            doc_type = %config.document_type,
            model = %self.model,
            pdf_bytes = pdf_bytes.len(),
            "Requesting structured extraction"
        );
        let body = build_generate_request(pdf_bytes, config);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ExtractionError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ExtractionError::Timeout(self.timeout_secs)
                } else {
                    ExtractionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| ExtractionError::Request(format!("Malformed service envelope: {e}")))?;
        let text = first_text(parsed).ok_or_else(|| ExtractionError::Request(NO_TEXT_MESSAGE.into()))?;
        debug!(response_len = text.len(), "Extraction service responded");

        parse_extraction_response(&text, config)
    }
}

/// Mock extractor for testing. Parses a configured response text.
///
/// `unavailable()` simulates a service that returns no usable text.
pub struct MockExtractor {
    response: Option<String>,
    calls: AtomicUsize,
}

impl MockExtractor {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Extractor for MockExtractor {
    fn extract(
        &self,
        _pdf_bytes: &[u8],
        config: &DocumentTypeConfig,
    ) -> Result<ExtractedData, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(text) => parse_extraction_response(text, config),
            None => Err(ExtractionError::Request(NO_TEXT_MESSAGE.into())),
        }
    }
}
