use serde_json::{json, Map, Value};

use crate::pipeline::registry::DocumentTypeConfig;

/// Property every extraction response carries alongside the typed fields.
pub const PAGE_SUMMARIES_KEY: &str = "pageSummaries";

/// JSON schema the extraction service is asked to honour.
///
/// `{type: "object", properties: {...fields, pageSummaries}, required: [...]}`
pub fn build_response_schema(config: &DocumentTypeConfig) -> Value {
    let mut properties = Map::new();
    for (key, schema_type) in config.schema_properties {
        properties.insert((*key).to_string(), json!({ "type": schema_type.as_str() }));
    }
    properties.insert(
        PAGE_SUMMARIES_KEY.to_string(),
        json!({
            "type": "array",
            "items": {
                "type": "string",
                "description": "A brief summary of the content on a single page."
            },
            "description": "An array of strings, where each string is a summary of the corresponding page in the document."
        }),
    );

    let required: Vec<&str> = config
        .required_keys
        .iter()
        .copied()
        .chain(std::iter::once(PAGE_SUMMARIES_KEY))
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::pipeline::registry::{all_configs, config_for_type};

    #[test]
    fn rental_schema_shape() {
        let schema = build_response_schema(config_for_type(DocumentType::Rental));
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["rentAmount"]["type"], "string");
        assert_eq!(schema["properties"]["pageSummaries"]["type"], "array");
        assert_eq!(schema["properties"]["pageSummaries"]["items"]["type"], "string");
    }

    #[test]
    fn page_summaries_always_required() {
        for config in all_configs() {
            let schema = build_response_schema(config);
            let required: Vec<&str> = schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            assert_eq!(required.last(), Some(&PAGE_SUMMARIES_KEY));
            assert_eq!(required.len(), config.required_keys.len() + 1);
            for key in config.required_keys {
                assert!(required.contains(key));
            }
        }
    }

    #[test]
    fn properties_cover_fields_plus_summaries() {
        let config = config_for_type(DocumentType::Gift);
        let schema = build_response_schema(config);
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(properties.len(), config.fields.len() + 1);
        for field in config.fields {
            assert!(properties.contains_key(field.key), "missing {}", field.key);
        }
    }
}
