//! Structured access logging.
//!
//! The pieces here are framework-agnostic building blocks: an ordered field
//! accumulator ([`LogEvent`]), a request body tee ([`TeeBody`]), severity
//! selection, the per-request [`RequestLogger`] handle and the sinks records
//! are written to. The axum middleware that drives them lives in
//! [`crate::api::middleware::access_log`].

mod errors;
mod event;
mod logger;
mod severity;
mod sink;
mod tee;

pub use errors::{RecordedError, RecordedErrors};
pub use event::{EXCLUDED_HEADER_PREFIX, FieldValue, LogEvent, is_excluded_header};
pub use logger::RequestLogger;
pub use severity::Severity;
pub use sink::{ACCESS_LOG_TARGET, LogRecord, LogSink, MemorySink, TracingSink};
pub use tee::{BodyCapture, TeeBody};

/// Message of the record emitted once per request.
pub const ACCESS_LOG_MESSAGE: &str = "HTTP Request processed";

/// Request URI that is never access-logged.
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/healthz";
