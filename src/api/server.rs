//! API server lifecycle: bind → spawn background task → return handle
//! with shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::pipeline::VerificationPipeline;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            tracing::error!("API server task failed: {e}");
        }
    }
}

/// Start the API server on `addr` (port 0 picks an ephemeral port).
///
/// Spawns the axum server in a background tokio task and returns a
/// handle carrying the bound address and a shutdown channel.
pub async fn start_server_on(
    pipeline: Arc<VerificationPipeline>,
    addr: SocketAddr,
) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server on {addr}: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = api_router(pipeline);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    use crate::pipeline::extraction::MockExtractor;
    use crate::pipeline::rasterize::{MockPdfPageRenderer, PdfRasterizer, DEFAULT_RENDER_SCALE};
    use crate::pipeline::SequentialIdGenerator;

    fn test_pipeline() -> Arc<VerificationPipeline> {
        Arc::new(VerificationPipeline::new(
            PdfRasterizer::new(Box::new(MockPdfPageRenderer::new(1)), DEFAULT_RENDER_SCALE),
            Box::new(MockExtractor::unavailable()),
            Box::new(SequentialIdGenerator::new()),
        ))
    }

    fn localhost() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let mut server = start_server_on(test_pipeline(), localhost())
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/api/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn server_has_valid_metadata() {
        let mut server = start_server_on(test_pipeline(), localhost())
            .await
            .expect("server should start");
        assert!(server.addr.to_string().starts_with("127.0.0.1:"));
        server.shutdown();
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = start_server_on(test_pipeline(), localhost()).await.unwrap();
        let err = start_server_on(test_pipeline(), first.addr).await.err().unwrap();
        assert!(err.contains("Failed to bind"));
        first.shutdown();
    }
}
