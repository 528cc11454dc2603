// src/async_impl.rs
//! Implementation of the asynchronous, Future-based read side.
//!
//! Writes stay synchronous. An async reader parked on the channel is woken
//! by writes and by `close` exactly like a parked thread, and it counts as a
//! ready reader for rendezvous writes.

use futures_core::{FusedStream, Stream};

use crate::TypedChannel;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that resolves to the next item of a channel, or to `None` once the
/// channel is closed and drained.
///
/// Dropping a pending `ReadFuture` withdraws it from the channel.
#[must_use = "futures do nothing unless you .await or poll them"]
#[derive(Debug)]
pub struct ReadFuture<'a, T: Send> {
  channel: &'a TypedChannel<T>,
  registration: Option<u64>,
}

impl<'a, T: Send> ReadFuture<'a, T> {
  pub(crate) fn new(channel: &'a TypedChannel<T>) -> Self {
    Self {
      channel,
      registration: None,
    }
  }
}

impl<'a, T: Send> Future for ReadFuture<'a, T> {
  type Output = Option<T>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    this.channel.shared.poll_read(cx, &mut this.registration)
  }
}

impl<'a, T: Send> Drop for ReadFuture<'a, T> {
  fn drop(&mut self) {
    if let Some(id) = self.registration.take() {
      self.channel.shared.cancel_async_read(id);
    }
  }
}

/// An owned stream of the items of a channel, created by
/// [`TypedChannel::stream`]. It ends once the channel is closed and drained.
#[must_use = "streams do nothing unless polled"]
#[derive(Debug)]
pub struct ReadStream<T: Send> {
  channel: TypedChannel<T>,
  registration: Option<u64>,
  terminated: bool,
}

impl<T: Send> ReadStream<T> {
  pub(crate) fn new(channel: TypedChannel<T>) -> Self {
    Self {
      channel,
      registration: None,
      terminated: false,
    }
  }
}

impl<T: Send> Stream for ReadStream<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let this = self.get_mut();
    if this.terminated {
      return Poll::Ready(None);
    }
    match this.channel.shared.poll_read(cx, &mut this.registration) {
      Poll::Ready(Some(item)) => Poll::Ready(Some(item)),
      Poll::Ready(None) => {
        this.terminated = true;
        Poll::Ready(None)
      }
      Poll::Pending => Poll::Pending,
    }
  }
}

impl<T: Send> FusedStream for ReadStream<T> {
  fn is_terminated(&self) -> bool {
    self.terminated
  }
}

impl<T: Send> Drop for ReadStream<T> {
  fn drop(&mut self) {
    if let Some(id) = self.registration.take() {
      self.channel.shared.cancel_async_read(id);
    }
  }
}
