//! Structured event sinks.
//!
//! # Responsibilities
//! - Define the capability request events are emitted through
//! - Carry ordered field sets without formatting them
//! - Provide sinks for `tracing`, JSON lines, and in-memory capture
//!
//! # Design Decisions
//! - Sinks are shared across requests, so they are `Send + Sync`
//! - Emission never fails from the caller's point of view

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::Level;

/// A single structured field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            FieldValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Str(_) => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<u16> for FieldValue {
    fn from(n: u16) -> Self {
        FieldValue::Int(n.into())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Str(s) => serializer.serialize_str(s),
            FieldValue::Int(n) => serializer.serialize_i64(*n),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) if s.is_empty() || s.contains(char::is_whitespace) => {
                write!(f, "{:?}", s)
            }
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
        }
    }
}

/// Ordered set of named fields attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(&'static str, FieldValue)>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field, keeping insertion order.
    pub fn with(mut self, key: &'static str, value: impl Into<FieldValue>) -> Self {
        self.0.push((key, value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// The fields whose keys are not in `keys`, order kept.
    pub fn without(&self, keys: &[&str]) -> Fields {
        Fields(
            self.0
                .iter()
                .filter(|(k, _)| !keys.contains(k))
                .cloned()
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

/// Destination for structured request events.
pub trait EventSink: Send + Sync {
    fn emit(&self, level: Level, fields: &Fields, message: &str);
}

/// Keys the request logger emits; each becomes its own `tracing` field.
const REQUEST_KEYS: [&str; 7] = ["req_id", "status", "method", "uri", "remote", "latency", "app"];

/// Routes events into the `tracing` subscriber installed by the process.
///
/// Request keys are recorded as typed `tracing` fields (`status` stays an
/// integer); absent keys are left out. Any other keys are rendered together
/// into an `extra` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! request_event {
    ($level:expr, $fields:expr, $message:expr) => {{
        let fields: &Fields = $fields;
        let str_of = |key: &str| fields.get(key).and_then(FieldValue::as_str);
        let int_of = |key: &str| fields.get(key).and_then(FieldValue::as_int);
        let extra = fields.without(&REQUEST_KEYS);
        let extra = (!extra.is_empty()).then(|| extra.to_string());
        tracing::event!(
            target: "served_log",
            $level,
            req_id = str_of("req_id"),
            status = int_of("status"),
            method = str_of("method"),
            uri = str_of("uri"),
            remote = str_of("remote"),
            latency = str_of("latency"),
            app = str_of("app"),
            extra = extra.as_deref(),
            "{}",
            $message
        )
    }};
}

impl EventSink for TracingSink {
    fn emit(&self, level: Level, fields: &Fields, message: &str) {
        if level == Level::ERROR {
            request_event!(Level::ERROR, fields, message);
        } else if level == Level::WARN {
            request_event!(Level::WARN, fields, message);
        } else if level == Level::INFO {
            request_event!(Level::INFO, fields, message);
        } else if level == Level::DEBUG {
            request_event!(Level::DEBUG, fields, message);
        } else {
            request_event!(Level::TRACE, fields, message);
        }
    }
}

/// Source of the `time` entry written by [`JsonSink`].
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// One JSON object per event, newline-delimited, in the layout of logrus'
/// JSON formatter.
///
/// Output looks like
/// `{"level":"info","msg":"req_start","time":"2026-10-19T12:00:00+00:00","req_id":"",...}`
/// with the fields in emission order.
pub struct JsonSink<W> {
    out: Mutex<W>,
    clock: Clock,
}

impl<W: Write + Send> JsonSink<W> {
    /// Sink stamping events with the system clock.
    pub fn new(out: W) -> Self {
        Self::with_clock(out, Utc::now)
    }

    /// Sink stamping events with `clock`.
    pub fn with_clock<C>(out: W, clock: C) -> Self
    where
        C: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            out: Mutex::new(out),
            clock: Box::new(clock),
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

struct JsonLine<'a> {
    level: Level,
    message: &'a str,
    time: String,
    fields: &'a Fields,
}

impl Serialize for JsonLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 3))?;
        map.serialize_entry("level", &self.level.as_str().to_ascii_lowercase())?;
        map.serialize_entry("msg", self.message)?;
        map.serialize_entry("time", &self.time)?;
        for (k, v) in self.fields.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<W: Write + Send> EventSink for JsonSink<W> {
    fn emit(&self, level: Level, fields: &Fields, message: &str) {
        let line = JsonLine {
            level,
            message,
            time: (self.clock)().to_rfc3339(),
            fields,
        };
        let mut buf = match serde_json::to_vec(&line) {
            Ok(buf) => buf,
            Err(e) => {
                tracing::warn!(error = %e, event = message, "Failed to encode event");
                return;
            }
        };
        buf.push(b'\n');

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = out.write_all(&buf).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, event = message, "Failed to write event");
        }
    }
}

/// An event captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub fields: Fields,
}

/// Keeps every emitted event in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events emitted so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEvent>> {
        match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl EventSink for MemorySink {
    fn emit(&self, level: Level, fields: &Fields, message: &str) {
        self.lock().push(LogEvent {
            level,
            message: message.to_string(),
            fields: fields.clone(),
        });
    }
}
