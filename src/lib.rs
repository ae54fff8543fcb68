//! Structured request logging for HTTP handlers.
//!
//! Every request served through a [`RequestLogger`]-decorated handler
//! produces a `req_start` event before the handler runs and a `req_served`
//! event, with status and latency, after it returns.
//!
//! ```
//! use std::sync::Arc;
//! use axum::http::StatusCode;
//! use served_log::{handler_fn, MemorySink, RequestLogger};
//!
//! let sink = Arc::new(MemorySink::new());
//! let ping = RequestLogger::new(sink.clone(), "my-app")
//!     .decorate(handler_fn(|_cx, w, _req| w.write_status(StatusCode::NO_CONTENT)));
//! # let _ = ping;
//! ```

pub mod config;
pub mod http;
pub mod observability;

pub use config::ServedLogConfig;
pub use http::{handler_fn, Context, Handler, HandlerService, RequestLogger, ResponseWriter};
pub use observability::{EventSink, Fields, MemorySink, TracingSink};
