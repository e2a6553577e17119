//! Destinations for finalized log records.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::event::{FieldValue, LogEvent};
use super::severity::Severity;

/// Target used by [`TracingSink`] for every record it forwards.
pub const ACCESS_LOG_TARGET: &str = "access_log";

/// A finalized, immutable log record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: Severity,
    pub message: String,
    #[serde(flatten)]
    pub fields: LogEvent,
}

impl LogRecord {
    pub fn new(level: Severity, message: impl Into<String>, fields: LogEvent) -> Self {
        Self {
            level,
            message: message.into(),
            fields,
        }
    }
}

/// Receives finalized records. Writing is entirely up to the implementation.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: LogRecord);
}

/// Fields [`TracingSink`] emits as first-class `tracing` fields.
const PROMOTED_FIELDS: [&str; 5] = [
    "request:id",
    "http:req:method",
    "http:req:requestURI",
    "http:res:status",
    "http:process:duration",
];

/// Forwards records to the `tracing` subscriber.
///
/// Request id, method, URI, status and duration (in milliseconds) become
/// structured fields of the event. Everything else, mostly header groups,
/// travels as one JSON object field named `fields`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: LogRecord) {
        let event = &record.fields;
        let request_id = event.get("request:id").and_then(FieldValue::as_str);
        let method = event.get("http:req:method").and_then(FieldValue::as_str);
        let uri = event.get("http:req:requestURI").and_then(FieldValue::as_str);
        let status = event.get("http:res:status").and_then(FieldValue::as_int);
        let duration_ms = match event.get("http:process:duration") {
            Some(FieldValue::Duration(elapsed)) => Some(elapsed.as_nanos() as f64 / 1_000_000.0),
            _ => None,
        };

        let mut rest = LogEvent::new();
        for (name, value) in event.iter() {
            if !PROMOTED_FIELDS.contains(&name) {
                rest.push(name, value.clone());
            }
        }
        let fields = serde_json::to_string(&rest).unwrap_or_default();
        let message = record.message.as_str();

        macro_rules! forward {
            ($level:expr) => {
                tracing::event!(
                    target: ACCESS_LOG_TARGET,
                    $level,
                    "request:id" = request_id,
                    "http:req:method" = method,
                    "http:req:requestURI" = uri,
                    "http:res:status" = status,
                    "http:process:duration" = duration_ms,
                    fields = %fields,
                    "{}",
                    message
                )
            };
        }

        match record.level {
            Severity::Trace => forward!(tracing::Level::TRACE),
            Severity::Debug => forward!(tracing::Level::DEBUG),
            Severity::Info => forward!(tracing::Level::INFO),
            Severity::Warn => forward!(tracing::Level::WARN),
            Severity::Error => forward!(tracing::Level::ERROR),
        }
    }
}

/// Keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[test]
    fn test_memory_sink_collects_records() {
        let sink = MemorySink::new();
        let mut fields = LogEvent::new();
        fields.str("http:req:method", "GET");

        sink.emit(LogRecord::new(Severity::Info, "first", fields.clone()));
        sink.emit(LogRecord::new(Severity::Warn, "second", fields));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].level, Severity::Warn);
    }

    #[test]
    fn test_record_serializes_flat() {
        let mut fields = LogEvent::new();
        fields.int("http:res:status", 200);
        let record = LogRecord::new(Severity::Info, "HTTP Request processed", fields);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["level"], "info");
        assert_eq!(json["message"], "HTTP Request processed");
        assert_eq!(json["http:res:status"], 200);
    }

    #[derive(Clone, Default)]
    struct CapturedFields(Arc<Mutex<Vec<(String, String)>>>);

    impl Visit for CapturedFields {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0
                .lock()
                .unwrap()
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CapturedFields {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = self.clone();
            event.record(&mut visitor);
        }
    }

    impl CapturedFields {
        fn get(&self, name: &str) -> Option<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.clone())
        }
    }

    #[test]
    fn test_tracing_sink_emits_structured_fields() {
        let captured = CapturedFields::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());

        let mut fields = LogEvent::new();
        fields
            .str("http:req:method", "GET")
            .str("http:req:requestURI", "/api/me")
            .strs("http:req:header:accept", ["text/plain"])
            .duration("http:process:duration", std::time::Duration::from_millis(12))
            .int("http:res:status", 200);

        tracing::subscriber::with_default(subscriber, || {
            TracingSink.emit(LogRecord::new(Severity::Info, "HTTP Request processed", fields));
        });

        assert_eq!(captured.get("http:req:method").as_deref(), Some("\"GET\""));
        assert_eq!(captured.get("http:req:requestURI").as_deref(), Some("\"/api/me\""));
        assert_eq!(captured.get("http:res:status").as_deref(), Some("200"));
        assert_eq!(captured.get("http:process:duration").as_deref(), Some("12.0"));

        let rest = captured.get("fields").unwrap();
        assert!(rest.contains("http:req:header:accept"));
        assert!(!rest.contains("http:res:status"));
    }

    #[test]
    fn test_tracing_sink_without_subscriber_does_not_panic() {
        TracingSink.emit(LogRecord::new(Severity::Error, "boom", LogEvent::new()));
    }
}
