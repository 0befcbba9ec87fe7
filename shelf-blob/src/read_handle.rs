use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, Take};
use tokio_util::io::ReaderStream;

/// Buffer size for each read off disk
pub(crate) const READ_CHUNK: usize = 64 * 1024;

/// Counts live read handles for one store
#[derive(Debug, Clone, Default)]
pub(crate) struct HandleCounter(Arc<AtomicUsize>);

impl HandleCounter {
    pub(crate) fn live(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Registration of one open descriptor; dropping it is the release.
#[derive(Debug)]
struct Lease {
    counter: HandleCounter,
    name: String,
}

impl Lease {
    fn acquire(counter: &HandleCounter, name: &str) -> Self {
        counter.0.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: counter.clone(),
            name: name.to_string(),
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let remaining = self.counter.0.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!(name = %self.name, remaining, "released read handle");
    }
}

/// A file read bounded to a fixed number of bytes.
///
/// The descriptor lives inside the stream and is closed as soon as the
/// stream ends, fails, or the handle is dropped by its consumer, whichever
/// comes first. Bytes past the window are never read.
#[derive(Debug)]
pub struct ScopedReadHandle {
    stream: Option<ReaderStream<Take<File>>>,
    lease: Option<Lease>,
    len: u64,
}

impl ScopedReadHandle {
    pub(crate) fn new(file: File, len: u64, name: &str, counter: &HandleCounter) -> Self {
        Self {
            stream: Some(ReaderStream::with_capacity(file.take(len), READ_CHUNK)),
            lease: Some(Lease::acquire(counter, name)),
            len,
        }
    }

    /// Number of bytes this handle will yield
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the underlying descriptor has already been released
    pub fn is_released(&self) -> bool {
        self.lease.is_none()
    }

    fn release(&mut self) {
        self.stream = None;
        self.lease = None;
    }
}

impl Stream for ScopedReadHandle {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(stream) = self.stream.as_mut() else {
            return Poll::Ready(None);
        };

        match Pin::new(stream).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(err))) => {
                self.release();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.release();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.stream {
            Some(stream) => stream.size_hint(),
            None => (0, Some(0)),
        }
    }
}
