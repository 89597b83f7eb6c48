use serde_json::Value;
use tracing::debug;

use super::schema::PAGE_SUMMARIES_KEY;
use super::types::ExtractedData;
use super::ExtractionError;
use crate::pipeline::registry::DocumentTypeConfig;

/// Literal some models emit instead of null.
const NOT_FOUND_LITERAL: &str = "not found";

/// Parse the service's text response into `ExtractedData`.
///
/// The text must be a JSON object (optionally wrapped in a ```json fence).
/// Every configured field is optional: a missing key, a null, an empty
/// string, or a "Not Found" literal all mean the document did not yield
/// that value. Keys outside the configuration are ignored.
pub fn parse_extraction_response(
    response: &str,
    config: &DocumentTypeConfig,
) -> Result<ExtractedData, ExtractionError> {
    let json_str = strip_code_fence(response.trim());
    let value: Value =
        serde_json::from_str(json_str).map_err(|e| ExtractionError::Parse(e.to_string()))?;
    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ExtractionError::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut extracted = ExtractedData::new();
    for field in config.fields {
        if let Some(text) = object.get(field.key).and_then(field_text) {
            extracted.insert(field.key, text);
        }
    }
    extracted.page_summaries = parse_summaries_lenient(object.get(PAGE_SUMMARIES_KEY));

    let ignored = object
        .keys()
        .filter(|k| k.as_str() != PAGE_SUMMARIES_KEY && config.field(k).is_none())
        .count();
    debug!(
        doc_type = %config.document_type,
        fields_present = extracted.field_count(),
        fields_expected = config.fields.len(),
        page_summaries = extracted.page_summaries.len(),
        ignored_keys = ignored,
        "Parsed extraction response"
    );

    Ok(extracted)
}

/// Scalar values become strings; anything else counts as absent.
fn field_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.is_empty() || text.eq_ignore_ascii_case(NOT_FOUND_LITERAL) {
        None
    } else {
        Some(text)
    }
}

/// Keep string items, skip anything else.
fn parse_summaries_lenient(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => vec![],
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::pipeline::registry::config_for_type;

    fn rental() -> &'static DocumentTypeConfig {
        config_for_type(DocumentType::Rental)
    }

    #[test]
    fn parses_complete_response() {
        let response = r#"{
            "rentAmount": "15000",
            "startDate": "2024-01-01",
            "endDate": "2024-12-31",
            "tenantName": "Asha Rao",
            "landlordName": "Vikram Shah",
            "propertyLocation": "MG Road, Pune",
            "pageSummaries": ["Parties and premises", "Rent and term"]
        }"#;
        let data = parse_extraction_response(response, rental()).unwrap();
        assert_eq!(data.get("rentAmount"), Some("15000"));
        assert_eq!(data.get("propertyLocation"), Some("MG Road, Pune"));
        assert_eq!(data.field_count(), 6);
        assert_eq!(data.page_summaries.len(), 2);
    }

    #[test]
    fn missing_keys_are_absent_not_errors() {
        let data = parse_extraction_response(r#"{"tenantName": "Asha Rao"}"#, rental()).unwrap();
        assert_eq!(data.get("tenantName"), Some("Asha Rao"));
        assert_eq!(data.get("rentAmount"), None);
        assert!(data.page_summaries.is_empty());
    }

    #[test]
    fn null_empty_and_not_found_are_absent() {
        let response = r#"{"rentAmount": null, "startDate": "  ", "endDate": "Not Found"}"#;
        let data = parse_extraction_response(response, rental()).unwrap();
        assert_eq!(data.field_count(), 0);
    }

    #[test]
    fn numbers_are_stringified() {
        let data = parse_extraction_response(r#"{"rentAmount": 15000}"#, rental()).unwrap();
        assert_eq!(data.get("rentAmount"), Some("15000"));
    }

    #[test]
    fn nested_values_are_absent() {
        let data =
            parse_extraction_response(r#"{"tenantName": {"first": "Asha"}}"#, rental()).unwrap();
        assert_eq!(data.get("tenantName"), None);
    }

    #[test]
    fn unknown_keys_ignored() {
        let data = parse_extraction_response(r#"{"cost": "100", "notes": "x"}"#, rental()).unwrap();
        assert_eq!(data.field_count(), 0);
    }

    #[test]
    fn non_string_summaries_skipped() {
        let data =
            parse_extraction_response(r#"{"pageSummaries": ["one", 2, null, "three"]}"#, rental())
                .unwrap();
        assert_eq!(data.page_summaries, vec!["one".to_string(), "three".to_string()]);
    }

    #[test]
    fn fenced_json_accepted() {
        let response = "```json\n{\"rentAmount\": \"15000\"}\n```";
        let data = parse_extraction_response(response, rental()).unwrap();
        assert_eq!(data.get("rentAmount"), Some("15000"));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_extraction_response("I could not read this document.", rental()).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[test]
    fn non_object_json_is_parse_error() {
        for text in ["[1, 2]", "\"text\"", "null", "42"] {
            let err = parse_extraction_response(text, rental()).unwrap_err();
            assert!(matches!(err, ExtractionError::Parse(_)), "accepted {text}");
        }
    }
}
