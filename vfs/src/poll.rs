use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

use crate::error::VfsError;

/// Poll a fetch future once, expecting it to be immediately ready.
///
/// Convenience for synchronous contexts (CLI tools, tests) where the
/// provider does blocking I/O ([`FileSystemProvider`](crate::FileSystemProvider),
/// [`MemoryProvider`](crate::MemoryProvider)) and the future completes on
/// the first poll.
///
/// # Panics
///
/// Panics if the future returns `Poll::Pending`, which indicates a provider
/// that needs a real async runtime.
pub fn poll_now<T, F>(fut: F) -> Result<T, VfsError>
where
    F: Future<Output = Result<T, VfsError>>,
{
    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(val) => val,
        Poll::Pending => panic!("fetch future returned Pending, await it on a runtime instead"),
    }
}
