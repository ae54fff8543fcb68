//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with the logged demo handlers
//! - Wire up middleware (request ID, timeout)
//! - Bind server to listener and shut down on Ctrl+C

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderName, Request, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

use crate::config::ServedLogConfig;
use crate::http::context::{request_id_from_extensions, Context};
use crate::http::decorator::{Logged, RequestLogger};
use crate::http::handler::{handler_fn, Handler};
use crate::http::service::HandlerService;
use crate::http::writer::ResponseWriter;
use crate::observability::sink::EventSink;

/// HTTP server exposing the demo endpoints behind the request logger.
pub struct HttpServer {
    router: Router,
    config: ServedLogConfig,
}

impl HttpServer {
    /// Create a new HTTP server emitting request events to `sink`.
    pub fn new(config: ServedLogConfig, sink: Arc<dyn EventSink>) -> Self {
        let router = Self::build_router(&config, sink);
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServedLogConfig, sink: Arc<dyn EventSink>) -> Router {
        let mut logger = RequestLogger::new(sink, config.app_name.as_str());
        if config.request_id.enabled {
            logger = logger.with_request_id(request_id_from_extensions);
        }

        let limit = config.server.max_body_bytes;
        let router = Router::new()
            .route_service("/ping", Self::mount(&logger, handler_fn(ping), limit))
            .route_service("/hello", Self::mount(&logger, handler_fn(hello), limit))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )));

        if !config.request_id.enabled {
            return router;
        }

        let header = HeaderName::try_from(config.request_id.header.as_str())
            .unwrap_or_else(|_| HeaderName::from_static("x-request-id"));
        router
            .layer(PropagateRequestIdLayer::new(header.clone()))
            .layer(SetRequestIdLayer::new(header, MakeRequestUuid))
    }

    fn mount<H>(logger: &RequestLogger, handler: H, limit: usize) -> HandlerService<Logged<H>>
    where
        H: Handler + 'static,
    {
        HandlerService::new(logger.decorate(handler)).max_body_bytes(limit)
    }

    /// The router, for embedding or testing without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServedLogConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app = %self.config.app_name,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `GET /ping`: 204 with no body.
fn ping(_cx: &Context, w: &mut dyn ResponseWriter, _req: &Request<Bytes>) -> io::Result<()> {
    w.write_status(StatusCode::NO_CONTENT)
}

/// `GET /hello`: a body and no explicit status.
fn hello(_cx: &Context, w: &mut dyn ResponseWriter, req: &Request<Bytes>) -> io::Result<()> {
    w.headers_mut().insert(
        axum::http::header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    w.write_body(b"hello")?;
    if !req.body().is_empty() {
        w.write_body(b", ")?;
        w.write_body(req.body())?;
    }
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
