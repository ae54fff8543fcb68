//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::decorator (req_start / req_served field sets)
//!     → sink.rs (EventSink: tracing, JSON lines, memory)
//!
//! Process wiring:
//!     → logging.rs (tracing-subscriber registry, filter, format)
//! ```
//!
//! # Design Decisions
//! - Sinks are constructed explicitly and passed to the logger
//! - Request ID flows into every request event

pub mod logging;
pub mod sink;

pub use logging::{build_sink, init_logging, LoggingInitError};
pub use sink::{EventSink, FieldValue, Fields, JsonSink, LogEvent, MemorySink, TracingSink};
