//! Field matching: compares what the user asserted with what the document says.
//!
//! Two strategies, chosen per field by the registry:
//! - normalized equality for amounts, dates, places and most names
//! - directional name containment for the gift parties, so a document that
//!   spells out extra middle names still matches the user's shorter form

use tracing::debug;

use super::extraction::ExtractedData;
use super::registry::{DocumentTypeConfig, MatchStrategy};
use super::types::{FieldComparison, UserAssertedData};
use crate::models::MatchStatus;

/// Honorific titles ignored when tokenizing person names.
const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "miss"];

/// Trim, lowercase, and drop whitespace, commas, hyphens and periods.
pub fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '-' | '.'))
        .collect()
}

fn name_tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .replace(['.', ','], "")
        .split_whitespace()
        .filter(|w| !HONORIFICS.contains(w))
        .map(str::to_string)
        .collect()
}

/// True when every word of `user_name` appears in `document_name`.
///
/// Directional: "John Smith" matches "John Michael Smith" but not the
/// other way round. A name made only of honorifics never matches.
pub fn is_name_match(user_name: &str, document_name: &str) -> bool {
    let user = name_tokens(user_name);
    if user.is_empty() {
        return false;
    }
    let document = name_tokens(document_name);
    user.iter().all(|word| document.contains(word))
}

/// Compare every configured field, in configuration order.
pub fn compare(
    config: &DocumentTypeConfig,
    user_data: &UserAssertedData,
    extracted: &ExtractedData,
) -> Vec<FieldComparison> {
    config
        .fields
        .iter()
        .map(|field| {
            let user_value = user_data.get(field.key).unwrap_or_default();
            let extracted_value = extracted.get(field.key);

            let matched = match extracted_value {
                _ if user_value.trim().is_empty() => false,
                None => false,
                Some(doc_value) => match field.strategy {
                    MatchStrategy::Normalized => normalize(user_value) == normalize(doc_value),
                    MatchStrategy::PersonName => is_name_match(user_value, doc_value),
                },
            };

            if !matched {
                debug!(
                    doc_type = %config.document_type,
                    field = field.key,
                    extracted_present = extracted_value.is_some(),
                    "Field mismatch"
                );
            }

            FieldComparison {
                field_key: field.key.to_string(),
                field_label: field.label.to_string(),
                user_value: user_value.to_string(),
                extracted_value: extracted_value.map(str::to_string),
                match_status: if matched {
                    MatchStatus::Match
                } else {
                    MatchStatus::Mismatch
                },
            }
        })
        .collect()
}
