//! Per-request context handed to handlers and correlation-id accessors.

use axum::http::Extensions;
use tower_http::request_id::RequestId;

/// Request-scoped values that do not live on the request itself.
#[derive(Debug, Clone, Default)]
pub struct Context {
    remote_addr: String,
    extensions: Extensions,
}

impl Context {
    /// Create a context for a request that arrived from `remote_addr`.
    pub fn new(remote_addr: impl Into<String>) -> Self {
        Self {
            remote_addr: remote_addr.into(),
            extensions: Extensions::new(),
        }
    }

    /// Replace the context's values with `extensions`.
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Address of the peer, empty when unknown.
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }
}

/// Correlation-id accessor used when none is configured.
pub fn empty_request_id(_cx: &Context) -> String {
    String::new()
}

/// Correlation-id accessor reading the id set by
/// [`tower_http::request_id::SetRequestIdLayer`].
pub fn request_id_from_extensions(cx: &Context) -> String {
    cx.get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or_default()
        .to_string()
}
