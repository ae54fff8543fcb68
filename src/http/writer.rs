//! Response writing and status capture.
//!
//! # Responsibilities
//! - Define the response-writing capability handlers write through
//! - Record the first status code a handler sets
//! - Report the status that was ultimately sent, 200 when never set
//!
//! # Design Decisions
//! - The capturing writer never buffers; every accepted write is forwarded
//! - A second status write is dropped, not forwarded
//! - Writing a body before any status pins the status to 200

use std::io;

use axum::http::{HeaderMap, StatusCode};

/// The capability a handler uses to produce a response.
pub trait ResponseWriter {
    /// Response headers, mutable until the status line is written.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Send the status line.
    fn write_status(&mut self, status: StatusCode) -> io::Result<()>;

    /// Write body bytes, returning how many were accepted.
    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize>;
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for &mut W {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        (**self).write_status(status)
    }

    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write_body(buf)
    }
}

/// Status recorded for a single response.
///
/// `written` goes from false to true at most once; after that `code` is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedStatus {
    code: StatusCode,
    written: bool,
}

impl CapturedStatus {
    pub fn new() -> Self {
        Self {
            code: StatusCode::OK,
            written: false,
        }
    }

    /// Pin `code` if nothing was pinned yet. Returns whether it was recorded.
    fn record(&mut self, code: StatusCode) -> bool {
        if self.written {
            return false;
        }
        self.code = code;
        self.written = true;
        true
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn is_written(&self) -> bool {
        self.written
    }
}

impl Default for CapturedStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a [`ResponseWriter`] and remembers the first status it was given.
pub struct StatusCapturingWriter<'a, W: ResponseWriter + ?Sized> {
    inner: &'a mut W,
    captured: CapturedStatus,
}

impl<'a, W: ResponseWriter + ?Sized> StatusCapturingWriter<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            captured: CapturedStatus::new(),
        }
    }

    /// The captured status, whether or not it has been pinned yet.
    pub fn status(&self) -> StatusCode {
        self.captured.code()
    }

    /// Whether a status was pinned by a write or by [`finalize_if_unset`].
    ///
    /// [`finalize_if_unset`]: Self::finalize_if_unset
    pub fn is_written(&self) -> bool {
        self.captured.is_written()
    }

    /// Pin the current status without sending anything. Idempotent.
    pub fn finalize_if_unset(&mut self) {
        let code = self.captured.code();
        self.captured.record(code);
    }

    pub fn captured(&self) -> CapturedStatus {
        self.captured
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for StatusCapturingWriter<'_, W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        if !self.captured.record(status) {
            tracing::warn!(
                first = self.captured.code().as_u16(),
                ignored = status.as_u16(),
                "superfluous write_status"
            );
            return Ok(());
        }
        self.inner.write_status(status)
    }

    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.captured.record(StatusCode::OK) {
            self.inner.write_status(StatusCode::OK)?;
        }
        self.inner.write_body(buf)
    }
}
