//! Supported document types and the fields a user can assert for each.

use axum::Json;
use serde::Serialize;

use crate::pipeline::registry::{all_configs, DocumentTypeConfig};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeView {
    pub key: &'static str,
    pub display_name: &'static str,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub key: &'static str,
    pub label: &'static str,
}

impl From<&'static DocumentTypeConfig> for DocumentTypeView {
    fn from(config: &'static DocumentTypeConfig) -> Self {
        Self {
            key: config.key(),
            display_name: config.display_name,
            fields: config
                .fields
                .iter()
                .map(|f| FieldView {
                    key: f.key,
                    label: f.label,
                })
                .collect(),
        }
    }
}

/// `GET /api/document-types`: registry contents in declaration order.
pub async fn list() -> Json<Vec<DocumentTypeView>> {
    Json(all_configs().map(DocumentTypeView::from).collect())
}
