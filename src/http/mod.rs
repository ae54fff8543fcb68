//! HTTP request logging subsystem.
//!
//! # Data Flow
//! ```text
//! axum Router
//!     → service.rs (HandlerService: body collection, Context, spawn_blocking)
//!     → decorator.rs (Logged: req_start, timing, req_served)
//!     → writer.rs (StatusCapturingWriter records the first status)
//!     → handler.rs (the wrapped Handler)
//!     → buffered.rs (BufferedResponse → axum Response)
//! ```
//!
//! # Design Decisions
//! - One handler shape for every framework; adapters live in `service.rs`
//! - The correlation id is read through an accessor over [`Context`]
//! - Status defaults to 200 until a handler writes one

pub mod buffered;
pub mod context;
pub mod decorator;
pub mod handler;
pub mod server;
pub mod service;
pub mod writer;

pub use buffered::BufferedResponse;
pub use context::{empty_request_id, request_id_from_extensions, Context};
pub use decorator::{format_latency, Logged, RequestLogger, RequestTimer, REQ_SERVED, REQ_START};
pub use handler::{handler_fn, Handler, HandlerFn};
pub use server::HttpServer;
pub use service::HandlerService;
pub use writer::{CapturedStatus, ResponseWriter, StatusCapturingWriter};
