//! Tower adapter that mounts a [`Handler`] in an axum router.
//!
//! # Responsibilities
//! - Translate an axum request into a [`Context`] and a buffered request
//! - Run the blocking handler off the async executor
//! - Turn the buffered output into an axum response
//!
//! # Design Decisions
//! - Request extensions are copied into the context so accessors such as
//!   [`request_id_from_extensions`](crate::http::request_id_from_extensions)
//!   see what earlier layers inserted
//! - Bodies above `max_body_bytes` are rejected with 413 before the handler runs;
//!   any other body read failure is a 400
//! - Handler errors become a bare 500; the error itself goes to `tracing`

use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use tower::Service;

use crate::http::buffered::BufferedResponse;
use crate::http::context::Context;
use crate::http::handler::Handler;

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// A [`Handler`] exposed as a tower [`Service`].
pub struct HandlerService<H> {
    handler: Arc<H>,
    max_body_bytes: usize,
}

impl<H> HandlerService<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Reject request bodies larger than `limit` bytes.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

impl<H> Clone for HandlerService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl<H> fmt::Debug for HandlerService<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerService")
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl<H> Service<Request<Body>> for HandlerService<H>
where
    H: Handler + 'static,
    H::Error: fmt::Display + Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.handler.clone();
        let limit = self.max_body_bytes;
        Box::pin(async move { Ok(serve(handler, limit, request).await) })
    }
}

async fn serve<H>(handler: Arc<H>, limit: usize, request: Request<Body>) -> Response
where
    H: Handler + 'static,
    H::Error: fmt::Display + Send + 'static,
{
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) if is_length_limit(&e) => {
            tracing::warn!(uri = %parts.uri, limit, "Request body over limit");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
        Err(e) => {
            tracing::warn!(uri = %parts.uri, error = %e, "Failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let cx = Context::new(remote).with_extensions(parts.extensions.clone());
    let request = Request::from_parts(parts, bytes);

    let outcome = tokio::task::spawn_blocking(move || {
        let mut out = BufferedResponse::new();
        handler
            .serve(&cx, &mut out, &request)
            .map(|()| out)
            .map_err(|e| (request.uri().to_string(), e))
    })
    .await;

    match outcome {
        Ok(Ok(out)) => out.into_response(),
        Ok(Err((uri, e))) => {
            tracing::error!(uri = %uri, error = %e, "Handler failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Handler task panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Whether `to_bytes` failed because the body exceeded its limit.
fn is_length_limit(e: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}
