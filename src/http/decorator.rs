//! Request logging decorator.
//!
//! # Responsibilities
//! - Emit `req_start` before a request reaches its handler
//! - Capture the status the handler sent through a [`StatusCapturingWriter`]
//! - Emit `req_served` with status and latency once the handler returns
//!
//! # Data Flow
//! ```text
//! request
//!     → req_start {req_id, uri, method, remote}
//!     → handler (via StatusCapturingWriter)
//!     → finalize_if_unset
//!     → req_served {req_id, status, method, uri, remote, latency, app}
//! ```
//!
//! # Design Decisions
//! - The sink is passed in explicitly; there is no process-wide logger
//! - Correlation ids come from a pluggable accessor, empty by default
//! - A failing handler propagates its error and no `req_served` is emitted

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::Request;
use tracing::Level;

use crate::http::context::{empty_request_id, Context};
use crate::http::handler::Handler;
use crate::http::writer::{ResponseWriter, StatusCapturingWriter};
use crate::observability::sink::{EventSink, Fields};

/// Message of the event emitted before the handler runs.
pub const REQ_START: &str = "req_start";

/// Message of the event emitted after the handler returns.
pub const REQ_SERVED: &str = "req_served";

/// Resolves the correlation id for a request.
pub type RequestIdAccessor = Arc<dyn Fn(&Context) -> String + Send + Sync>;

/// Builds logged handlers that share one sink and app name.
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn EventSink>,
    app_name: Arc<str>,
    request_id: RequestIdAccessor,
}

impl RequestLogger {
    /// Logger with no correlation id; `req_id` is always empty.
    pub fn new(sink: Arc<dyn EventSink>, app_name: impl Into<Arc<str>>) -> Self {
        Self {
            sink,
            app_name: app_name.into(),
            request_id: Arc::new(empty_request_id),
        }
    }

    /// Use `accessor` to look up each request's correlation id.
    pub fn with_request_id<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&Context) -> String + Send + Sync + 'static,
    {
        self.request_id = Arc::new(accessor);
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Wrap `handler` so every request it serves is logged.
    pub fn decorate<H: Handler>(&self, handler: H) -> Logged<H> {
        Logged {
            inner: handler,
            logger: self.clone(),
        }
    }
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogger")
            .field("app_name", &self.app_name)
            .finish_non_exhaustive()
    }
}

/// A handler wrapped by [`RequestLogger::decorate`].
#[derive(Clone, Debug)]
pub struct Logged<H> {
    inner: H,
    logger: RequestLogger,
}

impl<H> Logged<H> {
    pub fn get_ref(&self) -> &H {
        &self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: Handler> Handler for Logged<H> {
    type Error = H::Error;

    fn serve(
        &self,
        cx: &Context,
        w: &mut dyn ResponseWriter,
        req: &Request<Bytes>,
    ) -> Result<(), Self::Error> {
        let timer = RequestTimer::start();
        let req_id = (self.logger.request_id)(cx);
        let uri = req.uri().to_string();
        let method = req.method().as_str();
        let remote = cx.remote_addr();

        let fields = Fields::new()
            .with("req_id", req_id.as_str())
            .with("uri", uri.as_str())
            .with("method", method)
            .with("remote", remote);
        self.logger.sink.emit(Level::INFO, &fields, REQ_START);

        let mut capture = StatusCapturingWriter::new(w);
        self.inner.serve(cx, &mut capture, req)?;
        capture.finalize_if_unset();

        let fields = Fields::new()
            .with("req_id", req_id)
            .with("status", capture.status().as_u16())
            .with("method", method)
            .with("uri", uri)
            .with("remote", remote)
            .with("latency", format_latency(timer.elapsed()))
            .with("app", &*self.logger.app_name);
        self.logger.sink.emit(Level::INFO, &fields, REQ_SERVED);

        Ok(())
    }
}

/// Start of a request, used to measure its latency.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Milliseconds with four fractional digits, e.g. `"0.0421 ms"`.
pub fn format_latency(elapsed: Duration) -> String {
    format!("{:6.4} ms", elapsed.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::handler_fn;
    use crate::observability::sink::{FieldValue, MemorySink};
    use axum::http::{HeaderMap, StatusCode};
    use std::io;

    #[derive(Default)]
    struct Discard {
        headers: HeaderMap,
    }

    impl ResponseWriter for Discard {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            &mut self.headers
        }

        fn write_status(&mut self, _status: StatusCode) -> io::Result<()> {
            Ok(())
        }

        fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
    }

    fn get(uri: &str) -> Request<Bytes> {
        Request::builder().uri(uri).body(Bytes::new()).unwrap()
    }

    fn str_field<'a>(fields: &'a Fields, key: &str) -> &'a str {
        fields.get(key).and_then(FieldValue::as_str).unwrap()
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(Duration::ZERO), "0.0000 ms");
        assert_eq!(format_latency(Duration::from_micros(1500)), "1.5000 ms");
        assert_eq!(format_latency(Duration::from_nanos(42_100)), "0.0421 ms");
        assert_eq!(format_latency(Duration::from_secs(2)), "2000.0000 ms");
    }

    #[test]
    fn test_status_set_once_is_reported() {
        let sink = Arc::new(MemorySink::new());
        let logger = RequestLogger::new(sink.clone(), "test-app");
        let handler = logger.decorate(handler_fn(|_cx, w, _req| {
            w.write_status(StatusCode::CREATED)?;
            w.write_body(b"one")?;
            w.write_body(b"two")?;
            Ok::<_, io::Error>(())
        }));

        handler
            .serve(&Context::new("127.0.0.1"), &mut Discard::default(), &get("/items"))
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].message, REQ_SERVED);
        assert_eq!(events[1].fields.get("status"), Some(&FieldValue::Int(201)));
    }

    #[test]
    fn test_silent_handler_reports_ok() {
        let sink = Arc::new(MemorySink::new());
        let handler = RequestLogger::new(sink.clone(), "test-app")
            .decorate(handler_fn(|_cx, _w, _req| Ok::<_, io::Error>(())));

        handler
            .serve(&Context::default(), &mut Discard::default(), &get("/"))
            .unwrap();

        let served = &sink.events()[1];
        assert_eq!(served.fields.get("status"), Some(&FieldValue::Int(200)));
    }

    #[test]
    fn test_request_id_on_both_events() {
        let sink = Arc::new(MemorySink::new());
        let handler = RequestLogger::new(sink.clone(), "test-app")
            .with_request_id(|_cx| "abc123".to_string())
            .decorate(handler_fn(|_cx, _w, _req| Ok::<_, io::Error>(())));

        handler
            .serve(&Context::default(), &mut Discard::default(), &get("/"))
            .unwrap();

        for event in sink.events() {
            assert_eq!(str_field(&event.fields, "req_id"), "abc123");
        }
    }

    #[test]
    fn test_handler_error_skips_served_event() {
        let sink = Arc::new(MemorySink::new());
        let handler = RequestLogger::new(sink.clone(), "test-app").decorate(handler_fn(
            |_cx, w, _req| {
                w.write_status(StatusCode::BAD_GATEWAY)?;
                Err(io::Error::other("upstream reset"))
            },
        ));

        let err = handler
            .serve(&Context::default(), &mut Discard::default(), &get("/"))
            .unwrap_err();
        assert_eq!(err.to_string(), "upstream reset");

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, REQ_START);
    }

    #[test]
    fn test_field_order() {
        let sink = Arc::new(MemorySink::new());
        let handler = RequestLogger::new(sink.clone(), "test-app")
            .decorate(handler_fn(|_cx, _w, _req| Ok::<_, io::Error>(())));
        handler
            .serve(&Context::new("10.0.0.1"), &mut Discard::default(), &get("/a?b=c"))
            .unwrap();

        let events = sink.events();
        let start: Vec<_> = events[0].fields.keys().collect();
        let served: Vec<_> = events[1].fields.keys().collect();
        assert_eq!(start, ["req_id", "uri", "method", "remote"]);
        assert_eq!(
            served,
            ["req_id", "status", "method", "uri", "remote", "latency", "app"]
        );
        assert_eq!(str_field(&events[0].fields, "uri"), "/a?b=c");
        assert_eq!(str_field(&events[1].fields, "app"), "test-app");
    }
}
