//! In-memory response writer used to bridge handlers into axum.

use std::io;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use crate::http::writer::ResponseWriter;

/// Collects status, headers and body, then becomes an axum [`Response`].
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status sent so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(Bytes::from(self.body)));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        if self.status.is_none() {
            self.status = Some(status);
        }
        Ok(())
    }

    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_is_ok() {
        let response = BufferedResponse::new().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_keeps_first_status_and_headers() {
        let mut buf = BufferedResponse::new();
        buf.headers_mut()
            .insert("content-type", "application/json".parse().unwrap());
        buf.write_status(StatusCode::ACCEPTED).unwrap();
        buf.write_status(StatusCode::CONFLICT).unwrap();
        buf.write_body(b"{}").unwrap();
        assert_eq!(buf.body(), b"{}");

        let response = buf.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[test]
    fn test_body_implies_ok() {
        let mut buf = BufferedResponse::new();
        buf.write_body(b"hi").unwrap();
        buf.write_status(StatusCode::NOT_FOUND).unwrap();
        assert_eq!(buf.status(), Some(StatusCode::OK));
    }
}
