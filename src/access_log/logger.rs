//! Per-request logger handle.

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::errors::RecordedError;
use super::event::LogEvent;
use super::severity::Severity;
use super::sink::{LogRecord, LogSink, TracingSink};

#[derive(Debug, Default, Clone)]
struct LoggerState {
    event: LogEvent,
    errors: Vec<RecordedError>,
}

/// Logger bound to a single request.
///
/// Clones share the same accumulated fields, so anything a handler adds is
/// visible to the access log that installed the handle. Use [`child`] to get
/// an independent copy.
///
/// [`child`]: RequestLogger::child
#[derive(Clone)]
pub struct RequestLogger {
    state: Arc<Mutex<LoggerState>>,
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            state: Arc::default(),
            sink,
        }
    }

    /// Detached logger writing through [`TracingSink`].
    pub fn detached() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of this logger. Fields added to the copy never reach the parent.
    pub fn child(&self) -> Self {
        let state = self.lock().clone();
        Self {
            state: Arc::new(Mutex::new(state)),
            sink: Arc::clone(&self.sink),
        }
    }

    pub fn sink(&self) -> Arc<dyn LogSink> {
        Arc::clone(&self.sink)
    }

    /// Runs `f` against the accumulated event.
    pub fn update(&self, f: impl FnOnce(&mut LogEvent)) -> &Self {
        f(&mut self.lock().event);
        self
    }

    pub fn str(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
        self.update(|event| {
            event.str(name, value);
        })
    }

    pub fn int(&self, name: impl Into<String>, value: i64) -> &Self {
        self.update(|event| {
            event.int(name, value);
        })
    }

    pub fn bool(&self, name: impl Into<String>, value: bool) -> &Self {
        self.update(|event| {
            event.bool(name, value);
        })
    }

    pub fn duration(&self, name: impl Into<String>, value: Duration) -> &Self {
        self.update(|event| {
            event.duration(name, value);
        })
    }

    pub fn strs<I, S>(&self, name: impl Into<String>, values: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update(|event| {
            event.strs(name, values);
        })
    }

    /// Records an application error against the request.
    pub fn record_error(&self, error: impl Into<anyhow::Error>) -> &Self {
        self.lock().errors.push(RecordedError::new(error));
        self
    }

    pub fn errors(&self) -> Vec<RecordedError> {
        self.lock().errors.clone()
    }

    /// Current fields.
    pub fn snapshot(&self) -> LogEvent {
        self.lock().event.clone()
    }

    /// Emits one record carrying every accumulated field.
    pub fn log(&self, level: Severity, message: impl Into<String>) {
        let record = LogRecord::new(level, message, self.snapshot());
        self.sink.emit(record);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Severity::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("RequestLogger")
            .field("fields", &state.event.len())
            .field("errors", &state.errors.len())
            .finish()
    }
}

/// Yields the logger installed by the access log, or a detached one when the
/// request did not pass through it.
impl<S> FromRequestParts<S> for RequestLogger
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestLogger>()
            .cloned()
            .unwrap_or_else(RequestLogger::detached))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_log::{FieldValue, MemorySink};
    use axum::http::Request;

    #[test]
    fn test_clones_share_fields() {
        let logger = RequestLogger::new(Arc::new(MemorySink::new()));
        let handle = logger.clone();
        handle.str("user:id", "42");

        assert_eq!(
            logger.snapshot().get("user:id"),
            Some(&FieldValue::Str("42".to_string()))
        );
    }

    #[test]
    fn test_child_does_not_leak_into_parent() {
        let parent = RequestLogger::new(Arc::new(MemorySink::new()));
        parent.str("http:req:method", "GET");

        let child = parent.child();
        child.int("http:res:status", 200);
        child.record_error(anyhow::anyhow!("child only"));

        assert!(child.snapshot().contains("http:req:method"));
        assert!(!parent.snapshot().contains("http:res:status"));
        assert!(parent.errors().is_empty());
    }

    #[test]
    fn test_emits_accumulated_fields() {
        let sink = MemorySink::new();
        let logger = RequestLogger::new(Arc::new(sink.clone()));
        logger.str("job", "reindex").int("batch", 3);

        logger.warn("slow batch");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Severity::Warn);
        assert_eq!(records[0].message, "slow batch");
        assert_eq!(records[0].fields.get("batch"), Some(&FieldValue::Int(3)));
    }

    #[tokio::test]
    async fn test_extractor_prefers_installed_logger() {
        let sink = MemorySink::new();
        let installed = RequestLogger::new(Arc::new(sink.clone()));
        let (mut parts, _) = Request::builder()
            .extension(installed.clone())
            .body(())
            .unwrap()
            .into_parts();

        let extracted = RequestLogger::from_request_parts(&mut parts, &()).await.unwrap();
        extracted.str("from", "handler");

        assert!(installed.snapshot().contains("from"));
    }

    #[tokio::test]
    async fn test_extractor_falls_back_to_detached_logger() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let extracted = RequestLogger::from_request_parts(&mut parts, &()).await.unwrap();

        assert!(extracted.snapshot().is_empty());
    }
}
