//! API endpoint handlers.

pub mod document_types;
pub mod health;
pub mod verify;
