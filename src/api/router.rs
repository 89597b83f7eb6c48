//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::pipeline::VerificationPipeline;

/// Room for the JSON envelope and asserted fields around the PDF.
const ENVELOPE_OVERHEAD_BYTES: usize = 64 * 1024;

/// Largest request body that can still carry a PDF of `max_pdf_bytes`
/// once base64 encoded.
fn request_body_limit(max_pdf_bytes: usize) -> usize {
    max_pdf_bytes
        .saturating_add(2)
        .saturating_div(3)
        .saturating_mul(4)
        .saturating_add(ENVELOPE_OVERHEAD_BYTES)
}

/// Build the API router.
///
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(pipeline: Arc<VerificationPipeline>) -> Router {
    let body_limit = request_body_limit(pipeline.max_pdf_bytes());
    let ctx = ApiContext::new(pipeline);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/document-types", get(endpoints::document_types::list))
        .route("/verify", post(endpoints::verify::verify))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors);

    Router::new().nest("/api", api)
}
