//! Static per-category configuration for the supported legal documents.
//!
//! Each `DocumentTypeConfig` is a `'static` record: the ordered field list,
//! the extraction prompt, and the schema property types sent to the
//! extraction service. Adding a category means adding one record here and
//! one `DocumentType` variant; matching and verdict code never branch on
//! the category.

use std::str::FromStr;

use thiserror::Error;

use crate::models::{DocumentType, SchemaType};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unsupported document type: {0}")]
    UnsupportedDocumentType(String),
}

/// How a user assertion is compared against the extracted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Case, whitespace and punctuation insensitive equality.
    Normalized,
    /// Directional token containment with honorifics ignored.
    PersonName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    pub strategy: MatchStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTypeConfig {
    pub document_type: DocumentType,
    pub display_name: &'static str,
    pub fields: &'static [FieldDef],
    pub prompt_template: &'static str,
    pub schema_properties: &'static [(&'static str, SchemaType)],
    pub required_keys: &'static [&'static str],
}

impl DocumentTypeConfig {
    pub fn key(&self) -> &'static str {
        self.document_type.as_str()
    }

    pub fn field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }
}

const fn normalized(key: &'static str, label: &'static str) -> FieldDef {
    FieldDef {
        key,
        label,
        strategy: MatchStrategy::Normalized,
    }
}

const fn person_name(key: &'static str, label: &'static str) -> FieldDef {
    FieldDef {
        key,
        label,
        strategy: MatchStrategy::PersonName,
    }
}

static SALES: DocumentTypeConfig = DocumentTypeConfig {
    document_type: DocumentType::Sales,
    display_name: "Sales Document",
    fields: &[
        normalized("cost", "Cost"),
        normalized("saleDate", "Sale Date"),
        normalized("ownerName", "Owner Name"),
        normalized("salespersonName", "Salesperson Name"),
        normalized("location", "Location"),
    ],
    prompt_template: "From the attached sales document PDF, extract the following information \
        and return it as a JSON object: cost, sale date (format YYYY-MM-DD), owner name, \
        salesperson name, and location. Also, provide a brief summary for each page of the \
        document. If a value is not found, return null for that key.",
    schema_properties: &[
        ("cost", SchemaType::Text),
        ("saleDate", SchemaType::Text),
        ("ownerName", SchemaType::Text),
        ("salespersonName", SchemaType::Text),
        ("location", SchemaType::Text),
    ],
    required_keys: &["cost", "saleDate", "ownerName", "salespersonName", "location"],
};

static GIFT: DocumentTypeConfig = DocumentTypeConfig {
    document_type: DocumentType::Gift,
    display_name: "Gift Giving Document",
    fields: &[
        normalized("giftDate", "Gift Date"),
        person_name("giverName", "Giver Name"),
        person_name("receiverName", "Receiver Name"),
        normalized("location", "Enter Location where gift is received"),
        normalized("giftType", "Gift Type"),
    ],
    prompt_template: "From the attached gift giving document PDF, extract the following \
        information and return it as a JSON object: gift date (format YYYY-MM-DD), giver name \
        (donor name, which may be in any format), receiver name (donee name, which may be in \
        any format), location (the address following the phrase 'Location of where the gift \
        deed is received/ registered - '), and gift type. If the document contains keywords \
        such as 'apartment' or 'car parking', set gift type to 'Immovable property'. Also, \
        provide a brief summary for each page of the document. If a value is not found, \
        return null for that key.",
    schema_properties: &[
        ("giftDate", SchemaType::Text),
        ("giverName", SchemaType::Text),
        ("receiverName", SchemaType::Text),
        ("location", SchemaType::Text),
        ("giftType", SchemaType::Text),
    ],
    required_keys: &["giftDate", "giverName", "receiverName", "location", "giftType"],
};

static RENTAL: DocumentTypeConfig = DocumentTypeConfig {
    document_type: DocumentType::Rental,
    display_name: "Rental Document",
    fields: &[
        normalized("rentAmount", "Rent Amount"),
        normalized("startDate", "Start Date"),
        normalized("endDate", "End Date"),
        normalized("tenantName", "Tenant Name"),
        normalized("landlordName", "Landlord Name"),
        normalized("propertyLocation", "Property Location"),
    ],
    prompt_template: "From the attached rental agreement PDF, extract the following information \
        and return it as a JSON object: rent amount, start date (format YYYY-MM-DD), end date \
        (format YYYY-MM-DD), tenant name, landlord name, and property location. Also, provide a \
        brief summary for each page of the document. If a value is not found, return null for \
        that key.",
    schema_properties: &[
        ("rentAmount", SchemaType::Text),
        ("startDate", SchemaType::Text),
        ("endDate", SchemaType::Text),
        ("tenantName", SchemaType::Text),
        ("landlordName", SchemaType::Text),
        ("propertyLocation", SchemaType::Text),
    ],
    required_keys: &[
        "rentAmount",
        "startDate",
        "endDate",
        "tenantName",
        "landlordName",
        "propertyLocation",
    ],
};

static AUTHORITY: DocumentTypeConfig = DocumentTypeConfig {
    document_type: DocumentType::Authority,
    display_name: "Power of Authority",
    fields: &[
        normalized("grantorName", "Grantor Name"),
        normalized("granteeName", "Grantee Name"),
        normalized("authorityType", "Authority Type"),
        normalized("validity", "Validity"),
        normalized("location", "Location"),
    ],
    prompt_template: "From the attached power of authority document PDF, extract the following \
        information and return it as a JSON object: grantor name, grantee name, authority type, \
        validity date (format YYYY-MM-DD), and location. Also, provide a brief summary for each \
        page of the document. If a value is not found, return null for that key.",
    schema_properties: &[
        ("grantorName", SchemaType::Text),
        ("granteeName", SchemaType::Text),
        ("authorityType", SchemaType::Text),
        ("validity", SchemaType::Text),
        ("location", SchemaType::Text),
    ],
    required_keys: &["grantorName", "granteeName", "authorityType", "validity", "location"],
};

/// Configuration for a known document type. Infallible.
pub fn config_for_type(document_type: DocumentType) -> &'static DocumentTypeConfig {
    match document_type {
        DocumentType::Sales => &SALES,
        DocumentType::Gift => &GIFT,
        DocumentType::Rental => &RENTAL,
        DocumentType::Authority => &AUTHORITY,
    }
}

/// Look up the configuration for a document-type key (`sales`, `gift`,
/// `rental`, `authority`).
pub fn config_for(key: &str) -> Result<&'static DocumentTypeConfig, RegistryError> {
    DocumentType::from_str(key)
        .map(config_for_type)
        .map_err(|_| RegistryError::UnsupportedDocumentType(key.to_string()))
}

/// All configurations in declaration order.
pub fn all_configs() -> impl Iterator<Item = &'static DocumentTypeConfig> {
    DocumentType::ALL.iter().map(|t| config_for_type(*t))
}

/// Resolve user input to a document type.
///
/// Accepts the key or the display name ("Rental Document"), trimmed and
/// case-insensitive.
pub fn resolve_document_type(input: &str) -> Result<DocumentType, RegistryError> {
    let wanted = input.trim();
    all_configs()
        .find(|c| c.key().eq_ignore_ascii_case(wanted) || c.display_name.eq_ignore_ascii_case(wanted))
        .map(|c| c.document_type)
        .ok_or_else(|| RegistryError::UnsupportedDocumentType(input.to_string()))
}
