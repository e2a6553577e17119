//! Application errors attached to a request for the access log.

use std::backtrace::BacktraceStatus;
use std::fmt;
use std::sync::Arc;

use axum::response::Response;

/// One error recorded while a request was being handled.
#[derive(Clone)]
pub struct RecordedError(Arc<anyhow::Error>);

impl RecordedError {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self(Arc::new(error.into()))
    }

    /// Message including the whole source chain.
    pub fn message(&self) -> String {
        format!("{:#}", self.0)
    }

    /// Rendered backtrace, when one was captured at the error's origin.
    pub fn stack(&self) -> Option<String> {
        let backtrace = self.0.backtrace();
        match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        }
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl fmt::Debug for RecordedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordedError").field(&self.message()).finish()
    }
}

impl fmt::Display for RecordedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.0)
    }
}

/// Errors carried on a response's extensions.
///
/// Handlers that turn a failure into a response attach it here; the access
/// log picks the list up and escalates the record's severity.
#[derive(Debug, Clone, Default)]
pub struct RecordedErrors(Vec<RecordedError>);

impl RecordedErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: RecordedError) {
        self.0.push(error);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordedError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends `error` to the list already on `response`, creating it if needed.
    pub fn attach(response: &mut Response, error: RecordedError) {
        let extensions = response.extensions_mut();
        match extensions.get_mut::<RecordedErrors>() {
            Some(errors) => errors.push(error),
            None => {
                extensions.insert(RecordedErrors(vec![error]));
            }
        }
    }
}

impl IntoIterator for RecordedErrors {
    type Item = RecordedError;
    type IntoIter = std::vec::IntoIter<RecordedError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use axum::body::Body;

    #[test]
    fn test_message_includes_source_chain() {
        let error = Err::<(), _>(std::io::Error::other("disk full"))
            .context("writing upload")
            .unwrap_err();
        let recorded = RecordedError::new(error);

        assert_eq!(recorded.message(), "writing upload: disk full");
        assert_eq!(recorded.to_string(), recorded.message());
    }

    #[test]
    fn test_attach_appends_to_existing_list() {
        let mut response = Response::new(Body::empty());
        RecordedErrors::attach(&mut response, RecordedError::new(anyhow::anyhow!("first")));
        RecordedErrors::attach(&mut response, RecordedError::new(anyhow::anyhow!("second")));

        let errors = response.extensions().get::<RecordedErrors>().unwrap();
        let messages: Vec<_> = errors.iter().map(RecordedError::message).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
