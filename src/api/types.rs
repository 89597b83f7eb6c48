//! Shared state for the HTTP API.

use std::sync::Arc;

use crate::pipeline::VerificationPipeline;

/// Shared context for all API routes.
///
/// The pipeline is immutable and shared across requests; each request
/// runs it on the blocking pool.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Arc<VerificationPipeline>,
}

impl ApiContext {
    pub fn new(pipeline: Arc<VerificationPipeline>) -> Self {
        Self { pipeline }
    }
}
