//! A closable, capacity-configurable FIFO channel for coordinating producers
//! and consumers across threads.
//!
//! [`TypedChannel`] wraps a mutex-protected queue with a small set of
//! read/write contracts:
//!
//! - writes: [`try_write`](TypedChannel::try_write) (never blocks),
//!   [`write`](TypedChannel::write) (blocks), and their batch forms
//!   [`try_write_batch`](TypedChannel::try_write_batch) and
//!   [`write_batch`](TypedChannel::write_batch);
//! - reads: [`read`](TypedChannel::read), [`read_available`](TypedChannel::read_available),
//!   [`read_n`](TypedChannel::read_n), [`read_all`](TypedChannel::read_all) and
//!   [`read_all_with_timeout`](TypedChannel::read_all_with_timeout), plus an
//!   async [`read_async`](TypedChannel::read_async) / [`stream`](TypedChannel::stream);
//! - [`close`](TypedChannel::close), the one-time, irreversible end of writing.
//!
//! Reads report termination (closed and drained, or a timeout) through their
//! return values. Writes to a closed channel, and a second close, are
//! programming errors and panic with a [`ClosedChannelViolation`].
//!
//! ```
//! use std::thread;
//!
//! let channel = fibre_typed_channel::with_capacity::<i32>(4);
//! let producer = channel.clone();
//! let handle = thread::spawn(move || {
//!   producer.write_batch([1, 2, 3]);
//!   producer.close();
//! });
//!
//! assert_eq!(channel.read_all(), vec![1, 2, 3]);
//! handle.join().unwrap();
//! ```

pub mod error;
pub mod telemetry;

mod async_impl;
mod backoff;
mod channel;
mod iter;
mod shared;
mod sync_impl;
mod view;

pub use async_impl::{ReadFuture, ReadStream};
pub use channel::TypedChannel;
pub use error::{ClosedChannelViolation, Operation, TryReadError};
pub use iter::{IntoIter, Iter};
pub use view::{Channel, ReadOnlyChannel, WriteOnlyChannel};

/// Creates a rendezvous channel: capacity zero, so every write waits for a
/// reader to take the value.
pub fn new_channel<T: Send>() -> TypedChannel<T> {
  TypedChannel::new(0)
}

/// Creates a channel that buffers up to `capacity` items before writes block.
///
/// A capacity of `0` is the same as [`new_channel`].
pub fn with_capacity<T: Send>(capacity: usize) -> TypedChannel<T> {
  TypedChannel::new(capacity)
}

/// Creates a channel whose writes never block.
///
/// In reality, the channel is bounded by available memory.
pub fn unbounded<T: Send>() -> TypedChannel<T> {
  TypedChannel::new(shared::UNBOUNDED)
}

// Helper function to check if a type is Send + Sync.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}

#[allow(dead_code)]
fn typed_channel_is_send_sync() {
  assert_send_sync::<TypedChannel<String>>();
}
