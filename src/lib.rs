pub mod api; // HTTP surface: /api/health, /api/document-types, /api/verify
pub mod config;
pub mod models;
pub mod pipeline;

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use config::ServiceConfig;
use pipeline::extraction::{ExtractionError, GeminiClient, RetryingExtractor};
use pipeline::rasterize::{PdfRasterizer, PdfiumRenderer};
use pipeline::{UuidGenerator, VerificationPipeline};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Extraction client could not be created: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Async runtime could not be started: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("API server failed: {0}")]
    Server(String),
}

/// Production wiring: PDFium previews, Gemini extraction with retries,
/// random verification ids.
pub fn build_pipeline(config: &ServiceConfig) -> Result<VerificationPipeline, ExtractionError> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or(ExtractionError::MissingApiKey)?;
    let client = GeminiClient::new(&config.api_base, api_key, &config.model, config.timeout_secs)?;
    let extractor = RetryingExtractor::new(client, config.max_retries, config.retry_backoff);

    if let Err(e) = PdfiumRenderer::check_available() {
        tracing::warn!(error = %e, "PDFium unavailable, previews will be empty");
    }
    let rasterizer = PdfRasterizer::new(Box::new(PdfiumRenderer::new()), config.render_scale);

    Ok(
        VerificationPipeline::new(rasterizer, Box::new(extractor), Box::new(UuidGenerator))
            .with_max_pdf_bytes(config.max_pdf_bytes),
    )
}

pub fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServiceConfig::from_env();
    tracing::info!(
        model = %config.model,
        timeout_secs = config.timeout_secs,
        max_retries = config.max_retries,
        render_scale = config.render_scale,
        "Configuration loaded"
    );

    // Built and finally dropped outside the runtime: the blocking HTTP
    // client must not be created or destroyed on an async thread.
    let pipeline = Arc::new(build_pipeline(&config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(serve(Arc::clone(&pipeline), config.bind));
    drop(runtime);
    drop(pipeline);
    outcome
}

async fn serve(pipeline: Arc<VerificationPipeline>, bind: SocketAddr) -> Result<(), StartupError> {
    let mut server = api::start_server_on(pipeline, bind)
        .await
        .map_err(StartupError::Server)?;
    tracing::info!(addr = %server.addr, "Accepting verification requests");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for shutdown signal, stopping");
    }
    server.shutdown();
    server.wait().await;
    Ok(())
}
