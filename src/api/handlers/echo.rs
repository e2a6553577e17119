//! Echo endpoint.
//!
//! Reads the whole request body, which is what drives the access log's body
//! tee, and sends it back unchanged.

use axum::{
    Router,
    body::Bytes,
    http::{HeaderMap, header},
    response::IntoResponse,
    routing::post,
};

use crate::access_log::RequestLogger;
use crate::state::AppState;

/// Creates the echo route
///
/// # Routes
/// - `POST /echo` - Responds with the request body and content type
pub fn echo_routes() -> Router<AppState> {
    Router::new().route("/echo", post(echo))
}

async fn echo(logger: RequestLogger, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    logger.int("echo:bytes", i64::try_from(body.len()).unwrap_or(i64::MAX));

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| header::HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], body)
}
