use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DocumentType, MatchStatus, VerificationStatus};

/// Field values the user asserts about a document, keyed by field key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserAssertedData(HashMap<String, String>);

impl UserAssertedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for UserAssertedData {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UserAssertedData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Per-field outcome of matching a user assertion against the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldComparison {
    pub field_key: String,
    pub field_label: String,
    pub user_value: String,
    /// `None` when the document did not yield a value ("Not Found").
    pub extracted_value: Option<String>,
    pub match_status: MatchStatus,
}

impl FieldComparison {
    pub fn is_match(&self) -> bool {
        self.match_status == MatchStatus::Match
    }
}

/// The single, finalized output of one verification submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub status: VerificationStatus,
    pub comparisons: Vec<FieldComparison>,
    pub verification_id: String,
    /// PNG page previews in page order, duplicates removed.
    #[serde(with = "base64_images")]
    pub preview_images: Vec<Vec<u8>>,
    pub page_summaries: Vec<String>,
    pub analysis_text: String,
    pub document_type_key: DocumentType,
    pub verdict_reason: Option<String>,
    pub verified_at: DateTime<Utc>,
}

impl VerificationResult {
    pub fn mismatches(&self) -> impl Iterator<Item = &FieldComparison> {
        self.comparisons.iter().filter(|c| !c.is_match())
    }
}

/// Preview images travel as standard base64 strings.
mod base64_images {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(images: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            images
                .iter()
                .map(|img| base64::engine::general_purpose::STANDARD.encode(img)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        let encoded: Vec<String> = Vec::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|s| {
                base64::engine::general_purpose::STANDARD
                    .decode(s)
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
