//! Request body tee.
//!
//! [`TeeBody`] wraps an inbound body and hands every frame through unchanged
//! while copying data (and trailers) into a shared [`BodyCapture`]. The
//! capture grows with the body; nothing is truncated.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, ready};

use axum::http::HeaderMap;
use bytes::{Bytes, BytesMut};
use http_body::{Body, Frame, SizeHint};

#[derive(Debug, Default)]
struct CaptureState {
    data: BytesMut,
    trailers: Option<HeaderMap>,
    complete: bool,
}

/// Shared view of everything read through a [`TeeBody`].
#[derive(Debug, Clone, Default)]
pub struct BodyCapture {
    state: Arc<Mutex<CaptureState>>,
}

impl BodyCapture {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bytes read so far.
    pub fn bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.lock().data)
    }

    pub fn len(&self) -> usize {
        self.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trailers, once the consumer has read past the last data frame.
    pub fn trailers(&self) -> Option<HeaderMap> {
        self.lock().trailers.clone()
    }

    /// Whether the consumer reached the end of the stream.
    pub fn is_complete(&self) -> bool {
        self.lock().complete
    }
}

/// Body decorator that copies what it yields into a [`BodyCapture`].
#[derive(Debug)]
pub struct TeeBody<B> {
    inner: B,
    capture: BodyCapture,
}

impl<B> TeeBody<B> {
    pub fn new(inner: B, capture: BodyCapture) -> Self {
        Self { inner, capture }
    }

    pub fn capture(&self) -> &BodyCapture {
        &self.capture
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B> Body for TeeBody<B>
where
    B: Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let frame = ready!(Pin::new(&mut this.inner).poll_frame(cx));

        match &frame {
            Some(Ok(frame)) => {
                let mut state = this.capture.lock();
                if let Some(data) = frame.data_ref() {
                    state.data.extend_from_slice(data);
                } else if let Some(trailers) = frame.trailers_ref() {
                    state.trailers = Some(trailers.clone());
                }
            }
            Some(Err(_)) => {}
            None => this.capture.lock().complete = true,
        }

        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
