pub mod types;
pub mod pdfium;

pub use types::*;
pub use pdfium::*;

use thiserror::Error;

/// Preview rendering failures. Never fatal to a verification run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RasterizationError {
    #[error("PDFium library unavailable: {0}")]
    LibraryUnavailable(String),

    #[error("PDF is password-protected or encrypted")]
    Encrypted,

    #[error("PDF could not be opened: {0}")]
    DocumentLoad(String),

    #[error("Page {page} could not be rendered: {reason}")]
    PageRender { page: usize, reason: String },

    #[error("Page {page} could not be encoded as PNG: {reason}")]
    Encoding { page: usize, reason: String },
}
