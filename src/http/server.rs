//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use super::routes;
use crate::admission::AdmissionEngine;
use crate::error::Result;

/// HTTP server for the admission control service.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The admission engine
    engine: Arc<AdmissionEngine>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, engine: Arc<AdmissionEngine>) -> Self {
        Self { addr, engine }
    }

    /// Start the server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let app = routes::router(self.engine);

        info!(addr = %self.addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await.map_err(|e| {
            error!(error = %e, "HTTP server failed");
            e.into()
        })
    }

    /// Start the server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = routes::router(self.engine);

        info!(
            addr = %self.addr,
            "Starting HTTP server with graceful shutdown"
        );

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                e.into()
            })
    }
}
