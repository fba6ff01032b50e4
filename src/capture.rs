//! Pass-through capture of streamed completions

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::error::Result;
use crate::identity::CanonicalUserId;
use crate::message::{ChunkStream, Exchange, StreamChunk};
use crate::persist::PersistenceWorker;

/// Capture lifecycle of a streamed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    /// Chunks are still being forwarded
    Streaming,

    /// The underlying stream is exhausted and the exchange was dispatched
    Done,

    /// The underlying stream failed; the partial accumulator was discarded
    Errored,
}

/// Stream adapter that forwards every chunk to the caller untouched while
/// accumulating the assistant's reply on the side.
///
/// The values yielded are byte-identical and identically ordered to the
/// underlying stream. Once the stream is exhausted the accumulated exchange
/// is handed to the persistence worker exactly once; re-polling an exhausted
/// stream yields nothing further. A mid-stream error is passed through
/// unchanged and the partial reply is never persisted, and a stream dropped
/// before exhaustion persists nothing.
pub struct CaptureStream {
    inner: ChunkStream,
    state: CaptureState,
    accumulated: String,
    user_content: String,
    user: CanonicalUserId,
    worker: PersistenceWorker,
}

impl CaptureStream {
    /// Wrap a chunk stream, capturing the reply for `user`
    pub fn new(
        inner: ChunkStream,
        user: CanonicalUserId,
        user_content: String,
        worker: PersistenceWorker,
    ) -> Self {
        Self {
            inner,
            state: CaptureState::Streaming,
            accumulated: String::new(),
            user_content,
            user,
            worker,
        }
    }

    fn observe(&mut self, chunk: &StreamChunk) {
        // Capture is a side channel: anything unextractable is ignored and
        // the chunk flows on regardless.
        if let Some(delta) = chunk.content() {
            self.accumulated.push_str(delta);
        }
    }

    fn finish(&mut self) {
        self.state = CaptureState::Done;
        if self.accumulated.is_empty() {
            return;
        }
        let exchange = Exchange::new(
            std::mem::take(&mut self.user_content),
            std::mem::take(&mut self.accumulated),
        );
        self.worker.dispatch(self.user, exchange);
    }
}

impl Stream for CaptureStream {
    type Item = Result<StreamChunk>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.state != CaptureState::Streaming {
            return Poll::Ready(None);
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.observe(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.state = CaptureState::Errored;
                this.accumulated.clear();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
