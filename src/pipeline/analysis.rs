//! Narrative summary of what the document says, one template per type.
//!
//! Templates always use the extracted value, never the user's assertion.

use std::str::FromStr;

use super::types::FieldComparison;
use crate::models::DocumentType;

/// Placeholder for a field the document did not yield.
pub const NOT_FOUND_PLACEHOLDER: &str = "[not found]";

pub const NOT_IMPLEMENTED: &str = "Analysis for this document type has not been implemented.";

fn extracted<'a>(comparisons: &'a [FieldComparison], key: &str) -> &'a str {
    comparisons
        .iter()
        .find(|c| c.field_key == key)
        .and_then(|c| c.extracted_value.as_deref())
        .unwrap_or(NOT_FOUND_PLACEHOLDER)
}

/// Render the analysis sentence for a document-type key.
///
/// Unknown keys get a fixed sentence rather than an error.
pub fn narrate(document_type_key: &str, comparisons: &[FieldComparison]) -> String {
    let Ok(document_type) = DocumentType::from_str(document_type_key) else {
        return NOT_IMPLEMENTED.to_string();
    };
    let get = |key: &str| extracted(comparisons, key);

    match document_type {
        DocumentType::Sales => format!(
            "This appears to be a sales document for a transaction costing {} on {}, \
             involving owner {} and salesperson {} at location {}.",
            get("cost"),
            get("saleDate"),
            get("ownerName"),
            get("salespersonName"),
            get("location"),
        ),
        DocumentType::Gift => format!(
            "This appears to be a gift giving document for a {}, given on {} from {} to {} \
             at location {}.",
            get("giftType"),
            get("giftDate"),
            get("giverName"),
            get("receiverName"),
            get("location"),
        ),
        DocumentType::Rental => format!(
            "This appears to be a rental agreement between the landlord, {}, and the tenant, {}. \
             The agreement, starting on {}, is for the property located at {}. \
             The specified monthly rent is ₹{}.",
            get("landlordName"),
            get("tenantName"),
            get("startDate"),
            get("propertyLocation"),
            get("rentAmount"),
        ),
        DocumentType::Authority => format!(
            "This appears to be a power of authority document granting {} from {} to {}, \
             valid until {}, at location {}.",
            get("authorityType"),
            get("grantorName"),
            get("granteeName"),
            get("validity"),
            get("location"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;

    fn field(key: &str, extracted: Option<&str>) -> FieldComparison {
        FieldComparison {
            field_key: key.into(),
            field_label: key.into(),
            user_value: "anything".into(),
            extracted_value: extracted.map(str::to_string),
            match_status: MatchStatus::Mismatch,
        }
    }

    #[test]
    fn rental_uses_extracted_values() {
        let comparisons = vec![
            field("rentAmount", Some("15000")),
            field("startDate", Some("2024-01-01")),
            field("tenantName", Some("Asha Rao")),
            field("landlordName", Some("Vikram Shah")),
            field("propertyLocation", Some("MG Road, Pune")),
        ];
        assert_eq!(
            narrate("rental", &comparisons),
            "This appears to be a rental agreement between the landlord, Vikram Shah, and the \
             tenant, Asha Rao. The agreement, starting on 2024-01-01, is for the property located \
             at MG Road, Pune. The specified monthly rent is ₹15000."
        );
    }

    #[test]
    fn absent_field_uses_placeholder() {
        let comparisons = vec![field("cost", Some("5,00,000")), field("saleDate", None)];
        let text = narrate("sales", &comparisons);
        assert!(text.contains("costing 5,00,000 on [not found]"));
        assert!(text.contains("owner [not found]"));
    }

    #[test]
    fn empty_comparisons_fill_every_slot() {
        let text = narrate("authority", &[]);
        assert_eq!(text.matches(NOT_FOUND_PLACEHOLDER).count(), 5);
    }

    #[test]
    fn gift_sentence_shape() {
        let comparisons = vec![
            field("giftType", Some("Immovable property")),
            field("giverName", Some("Anil Gupta")),
        ];
        let text = narrate("gift", &comparisons);
        assert!(text.starts_with("This appears to be a gift giving document for a Immovable property"));
        assert!(text.contains("from Anil Gupta to [not found]"));
    }

    #[test]
    fn user_value_never_leaks_into_text() {
        let text = narrate("sales", &[field("cost", None)]);
        assert!(!text.contains("anything"));
    }

    #[test]
    fn unknown_type_is_not_implemented() {
        assert_eq!(narrate("will", &[]), NOT_IMPLEMENTED);
    }
}
