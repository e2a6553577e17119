//! Access-log middleware.
//!
//! Emits exactly one structured record per request once the handler chain
//! returns. Handlers can add fields and errors to that record through the
//! [`RequestLogger`] extractor. Requests for the health-check path are never
//! logged.
//!
//! A panic in a downstream handler unwinds through this middleware and no
//! record is written for that request.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use http_body::Body as _;

use crate::access_log::{
    ACCESS_LOG_MESSAGE, BodyCapture, LogEvent, LogSink, RecordedError, RecordedErrors,
    RequestLogger, Severity, TeeBody, TracingSink,
};
use crate::config::AccessLogConfig;

use super::RequestId;

/// State of [`access_log_middleware`].
#[derive(Clone)]
pub struct AccessLog {
    sink: Arc<dyn LogSink>,
    health_check_path: String,
    include_request_body: bool,
}

impl AccessLog {
    /// Access log writing through [`TracingSink`].
    pub fn new(config: &AccessLogConfig) -> Self {
        Self {
            sink: Arc::new(TracingSink),
            health_check_path: config.health_check_path.clone(),
            include_request_body: config.include_request_body,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn health_check_path(&self) -> &str {
        &self.health_check_path
    }
}

impl std::fmt::Debug for AccessLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessLog")
            .field("health_check_path", &self.health_check_path)
            .field("include_request_body", &self.include_request_body)
            .finish()
    }
}

/// Middleware that writes the access record for every request.
///
/// # Behavior
/// - Reuses a copy of an upstream [`RequestLogger`] if one is installed,
///   so fields added here never leak back to it
/// - Records request fields before delegating and response fields after
/// - Tees the request body so its bytes and trailers can be logged
/// - Picks the record's severity from the status and any recorded errors
///
/// `http:res:size` is known only when the response body reports an exact
/// length or carries `Content-Length`. Streamed bodies without either are
/// logged with a size of -1, since the bytes are written after this
/// middleware has returned.
///
/// # Example
/// ```ignore
/// Router::new()
///     .route("/", get(handler))
///     .layer(middleware::from_fn_with_state(AccessLog::new(&config), access_log_middleware))
/// ```
pub async fn access_log_middleware(
    State(access_log): State<AccessLog>,
    request: Request,
    next: Next,
) -> Response {
    let logger = match request.extensions().get::<RequestLogger>() {
        Some(parent) => parent.child(),
        None => RequestLogger::new(Arc::clone(&access_log.sink)),
    };

    let request_uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    logger.update(|event| record_request(event, &request, &request_uri));

    let capture = BodyCapture::new();
    let (mut parts, body) = request.into_parts();
    parts.extensions.insert(logger.clone());
    parts.extensions.insert(capture.clone());
    let request = Request::from_parts(parts, Body::new(TeeBody::new(body, capture.clone())));

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    if request_uri == access_log.health_check_path {
        return response;
    }

    logger.update(|event| {
        event
            .duration("http:process:duration", elapsed)
            .int("http:res:status", i64::from(response.status().as_u16()))
            .int("http:res:size", response_size(&response))
            .header_group("http:res:header", response.headers(), &[]);

        if let Some(trailers) = capture.trailers() {
            event.header_group("http:req:trailer", &trailers, &[]);
        }
        if access_log.include_request_body && !capture.is_empty() {
            event.str(
                "http:req:body",
                String::from_utf8_lossy(&capture.bytes()).into_owned(),
            );
        }
    });

    let mut errors = logger.errors();
    if let Some(attached) = response.extensions().get::<RecordedErrors>() {
        errors.extend(attached.iter().cloned());
    }
    logger.update(|event| record_errors(event, &errors));

    let severity = Severity::for_response(response.status().as_u16(), !errors.is_empty());
    logger.log(severity, ACCESS_LOG_MESSAGE);

    response
}

fn record_request(event: &mut LogEvent, request: &Request, request_uri: &str) {
    if let Some(RequestId(id)) = request.extensions().get::<RequestId>() {
        event.str("request:id", id.as_str());
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default();

    event
        .str("http:req:host", host)
        .str("http:req:method", request.method().as_str())
        .str("http:req:proto", format!("{:?}", request.version()));

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        event.str("http:req:remoteAddr", addr.to_string());
    }

    event.str("http:req:requestURI", request_uri);

    let transfer_encoding = transfer_encoding(request.headers());
    if !transfer_encoding.is_empty() {
        event.strs("http:req:transferEncoding", transfer_encoding);
    }

    event.header_group("http:req:header", request.headers(), &["host", "transfer-encoding"]);
}

fn transfer_encoding(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::TRANSFER_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Exact body length when known up front, else `Content-Length`, else -1.
///
/// Streamed bodies are sent after the record is emitted, so their written
/// length is never observed here.
fn response_size(response: &Response) -> i64 {
    if let Some(exact) = response.body().size_hint().exact() {
        return i64::try_from(exact).unwrap_or(i64::MAX);
    }
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(-1)
}

fn record_errors(event: &mut LogEvent, errors: &[RecordedError]) {
    let Some((primary, rest)) = errors.split_first() else {
        return;
    };

    event.str("error", primary.message());
    if let Some(stack) = primary.stack() {
        event.str("stack", stack);
    }
    if !rest.is_empty() {
        event.strs("http:res:errors", rest.iter().map(RecordedError::message));
    }
}
