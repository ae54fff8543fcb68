//! Shared utilities for request logging tests.

use std::io;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use served_log::observability::{FieldValue, Fields, LogEvent};
use served_log::ResponseWriter;

/// Response writer that remembers everything it was sent.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingWriter {
    pub headers: HeaderMap,
    pub statuses: Vec<StatusCode>,
    pub body: Vec<u8>,
}

impl ResponseWriter for RecordingWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        self.statuses.push(status);
        Ok(())
    }

    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Request as axum would hand it over, including the peer address.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, remote: &str, body: impl Into<Body>) -> Request<Body> {
    let addr: SocketAddr = remote.parse().unwrap();
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap();
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}

#[allow(dead_code)]
pub fn str_field<'a>(fields: &'a Fields, key: &str) -> &'a str {
    fields
        .get(key)
        .and_then(FieldValue::as_str)
        .unwrap_or_else(|| panic!("missing string field {key}"))
}

#[allow(dead_code)]
pub fn int_field(fields: &Fields, key: &str) -> i64 {
    fields
        .get(key)
        .and_then(FieldValue::as_int)
        .unwrap_or_else(|| panic!("missing integer field {key}"))
}

#[allow(dead_code)]
/// Asserts `latency` looks like `"0.0421 ms"`.
pub fn assert_latency(event: &LogEvent) {
    let latency = str_field(&event.fields, "latency");
    let value = latency
        .strip_suffix(" ms")
        .unwrap_or_else(|| panic!("latency without unit: {latency:?}"))
        .trim_start();
    let (whole, frac) = value.split_once('.').expect("fixed-point latency");
    assert!(whole.chars().all(|c| c.is_ascii_digit()), "{latency:?}");
    assert!(frac.len() >= 4, "{latency:?}");
    assert!(frac.chars().all(|c| c.is_ascii_digit()), "{latency:?}");
    assert!(value.parse::<f64>().unwrap() >= 0.0);
}
