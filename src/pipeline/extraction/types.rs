use std::collections::BTreeMap;

use super::ExtractionError;
use crate::pipeline::registry::DocumentTypeConfig;

/// Field values and page summaries read from a document by the
/// extraction service.
///
/// Only fields the service actually returned are present. The number of
/// page summaries is whatever the service produced and can differ from
/// the page count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedData {
    values: BTreeMap<String, String>,
    pub page_summaries: Vec<String>,
}

impl ExtractedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_page_summaries(mut self, summaries: Vec<String>) -> Self {
        self.page_summaries = summaries;
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.values.len()
    }
}

/// Structured extraction capability (allows mocking and decoration).
pub trait Extractor {
    fn extract(
        &self,
        pdf_bytes: &[u8],
        config: &DocumentTypeConfig,
    ) -> Result<ExtractedData, ExtractionError>;
}

impl<E: Extractor + ?Sized> Extractor for Box<E> {
    fn extract(
        &self,
        pdf_bytes: &[u8],
        config: &DocumentTypeConfig,
    ) -> Result<ExtractedData, ExtractionError> {
        (**self).extract(pdf_bytes, config)
    }
}
