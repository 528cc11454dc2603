// src/channel.rs

//! The public [`TypedChannel`] handle.

use crate::async_impl::{ReadFuture, ReadStream};
use crate::error::{raise_violation, Operation, TryReadError, TryWriteError};
use crate::iter::Iter;
use crate::shared::{ChannelShared, UNBOUNDED};
use crate::sync_impl::{self, DeadlineRead};
use crate::telemetry;
use crate::view::{ReadOnlyChannel, WriteOnlyChannel};

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on the up-front allocation made by the counted reads.
const PREALLOC_LIMIT: usize = 1024;

/// A closable, FIFO, capacity-configurable channel.
///
/// A `TypedChannel` is a cheap handle: cloning it shares the same underlying
/// channel, and any number of producer and consumer threads may hold clones.
/// Dropping a handle never closes the channel; closing is always explicit.
///
/// # The close contract
///
/// The channel is `Open` until [`close`](Self::close) is called, and then
/// `Closed` forever. Reads keep working after close: they drain whatever is
/// still buffered and then report termination through their return value.
/// Writes do not: any write (or a second `close`) on a closed channel is a
/// programming error and panics with a [`ClosedChannelViolation`] payload.
/// This includes writers that are *blocked* inside [`write`](Self::write) or
/// [`write_batch`](Self::write_batch) when another thread closes the channel.
/// By convention exactly one party, the last producer, closes the channel.
///
/// [`ClosedChannelViolation`]: crate::ClosedChannelViolation
pub struct TypedChannel<T: Send> {
  pub(crate) shared: Arc<ChannelShared<T>>,
}

impl<T: Send> TypedChannel<T> {
  pub(crate) fn new(capacity: usize) -> Self {
    tracing::trace!(
      capacity = ?(if capacity == UNBOUNDED { None } else { Some(capacity) }),
      "typed channel created"
    );
    TypedChannel {
      shared: Arc::new(ChannelShared::new(capacity)),
    }
  }

  // --- Writes ---

  /// Attempts to write `value` without blocking.
  ///
  /// Returns `true` if the value was accepted: there was a free slot in the
  /// buffer, or, for a rendezvous channel, a reader was already waiting for
  /// it. Returns `false` otherwise and leaves the channel untouched; the
  /// value is dropped.
  ///
  /// # Panics
  ///
  /// Panics with a [`ClosedChannelViolation`](crate::ClosedChannelViolation)
  /// if the channel is closed.
  #[track_caller]
  pub fn try_write(&self, value: T) -> bool {
    self.try_write_as(value, Operation::TryWrite)
  }

  #[track_caller]
  fn try_write_as(&self, value: T, operation: Operation) -> bool {
    match self.shared.try_write(value) {
      Ok(()) => true,
      Err(TryWriteError::Full(_)) => false,
      Err(TryWriteError::Closed(_)) => raise_violation(operation),
    }
  }

  /// Writes `value`, blocking the current thread until there is room for it
  /// or, for a rendezvous channel, until a reader takes it.
  ///
  /// # Panics
  ///
  /// Panics with a [`ClosedChannelViolation`](crate::ClosedChannelViolation)
  /// if the channel is closed, including when it is closed while this call
  /// is blocked.
  #[track_caller]
  pub fn write(&self, value: T) {
    self.write_as(value, Operation::Write)
  }

  #[track_caller]
  fn write_as(&self, value: T, operation: Operation) {
    if sync_impl::write_sync(&self.shared, value).is_err() {
      raise_violation(operation);
    }
  }

  /// Calls [`try_write`](Self::try_write) for each value in order, stopping
  /// at the first one that is not accepted.
  ///
  /// Returns how many values were written and whether all of them were. The
  /// batch is not atomic: a `(n, false)` result means the first `n` values
  /// are in the channel and the rest (from the rejected one on) were dropped.
  ///
  /// # Panics
  ///
  /// Panics with a [`ClosedChannelViolation`](crate::ClosedChannelViolation)
  /// if the channel is closed.
  #[track_caller]
  pub fn try_write_batch<I>(&self, values: I) -> (usize, bool)
  where
    I: IntoIterator<Item = T>,
  {
    let mut written = 0;
    for value in values {
      if !self.try_write_as(value, Operation::TryWriteBatch) {
        return (written, false);
      }
      written += 1;
    }
    (written, true)
  }

  /// Writes every value in order, blocking between items as needed.
  ///
  /// # Panics
  ///
  /// Panics with a [`ClosedChannelViolation`](crate::ClosedChannelViolation)
  /// if the channel is closed before the last value is written.
  #[track_caller]
  pub fn write_batch<I>(&self, values: I)
  where
    I: IntoIterator<Item = T>,
  {
    for value in values {
      self.write_as(value, Operation::WriteBatch);
    }
  }

  /// Closes the channel for writing.
  ///
  /// Blocked readers are released: they drain the remaining buffered items
  /// and then observe the end of the channel. Blocked writers are released
  /// too, and each of them panics with a closed-channel violation.
  ///
  /// # Panics
  ///
  /// Panics with a [`ClosedChannelViolation`](crate::ClosedChannelViolation)
  /// if the channel is already closed.
  #[track_caller]
  pub fn close(&self) {
    let Some(released) = self.shared.close() else {
      raise_violation(Operation::Close);
    };

    let readers = released.reader_count();
    let writers = released.writer_count();
    let buffered = released.buffered;
    released.wake_all();

    tracing::trace!(readers, writers, buffered, "typed channel closed");
    if writers > 0 {
      tracing::debug!(
        writers,
        "close released blocked writers; each will raise a closed channel violation"
      );
      #[cfg(feature = "telemetry")]
      telemetry::log_event(
        "close",
        "BlockedWritersReleased",
        Some(format!("{} writer(s)", writers)),
      );
    }
    telemetry::increment_counter("close", "closed");
  }

  // --- Reads ---

  /// Reads the next item, blocking until one is available.
  ///
  /// Returns `None` once the channel is closed and every buffered item has
  /// been read.
  pub fn read(&self) -> Option<T> {
    sync_impl::read_sync(&self.shared)
  }

  /// Attempts to read the next item without blocking.
  ///
  /// On a rendezvous channel this succeeds only if a writer is blocked in
  /// [`write`](Self::write) with an item.
  pub fn try_read(&self) -> Result<T, TryReadError> {
    self.shared.try_read()
  }

  /// Reads what is currently available.
  ///
  /// - On a rendezvous channel nothing can be buffered ahead of a reader, so
  ///   this blocks for exactly one item, like `read_n(1)`.
  /// - On a buffered channel this reads at most as many items as were
  ///   buffered when the call started, and never blocks. Fewer come back if
  ///   other readers got to some of them first.
  ///
  /// The flag is `false` only if the channel turned out closed and drained
  /// before a single item could be read. A buffered channel that is empty at
  /// call time yields `(vec![], true)`, closed or not.
  pub fn read_available(&self) -> (Vec<T>, bool) {
    if self.shared.capacity == 0 {
      return self.read_n(1);
    }

    let snapshot = self.len();
    let mut values = Vec::with_capacity(snapshot.min(PREALLOC_LIMIT));
    while values.len() < snapshot {
      match self.shared.try_read() {
        Ok(value) => values.push(value),
        Err(TryReadError::Empty) => break,
        Err(TryReadError::Closed) => {
          let ok = !values.is_empty();
          return (values, ok);
        }
      }
    }
    (values, true)
  }

  /// Reads exactly `count` items, blocking between them as needed.
  ///
  /// If the channel is closed and drained first, returns the items read so
  /// far with `false`.
  pub fn read_n(&self, count: usize) -> (Vec<T>, bool) {
    let mut values = Vec::with_capacity(count.min(PREALLOC_LIMIT));
    while values.len() < count {
      match self.read() {
        Some(value) => values.push(value),
        None => return (values, false),
      }
    }
    (values, true)
  }

  /// Reads until the channel is closed and drained, returning every item in
  /// order.
  pub fn read_all(&self) -> Vec<T> {
    self.iter().collect()
  }

  /// Reads items as they arrive until `timeout` has elapsed since the call
  /// started, or until the channel is closed and drained, whichever happens
  /// first.
  ///
  /// Returns the items collected and `true` if the timeout ended the call,
  /// `false` if closure did. The deadline is fixed at call entry; receiving
  /// an item does not extend it.
  pub fn read_all_with_timeout(&self, timeout: Duration) -> (Vec<T>, bool) {
    let Some(deadline) = Instant::now().checked_add(timeout) else {
      // A deadline beyond the clock's range never fires.
      return (self.read_all(), false);
    };

    let mut values = Vec::new();
    loop {
      match sync_impl::read_until_sync(&self.shared, deadline) {
        DeadlineRead::Item(value) => values.push(value),
        DeadlineRead::Closed => return (values, false),
        DeadlineRead::TimedOut => {
          tracing::trace!(collected = values.len(), "read_all_with_timeout deadline reached");
          telemetry::increment_counter("read_all_with_timeout", "timed_out");
          return (values, true);
        }
      }
    }
  }

  /// A blocking iterator over the items of this channel. It ends once the
  /// channel is closed and drained.
  pub fn iter(&self) -> Iter<'_, T> {
    Iter::new(self)
  }

  /// Reads the next item asynchronously. Resolves to `None` once the
  /// channel is closed and drained.
  ///
  /// While pending, the future counts as a ready reader, so a rendezvous
  /// [`try_write`](Self::try_write) can hand it an item.
  pub fn read_async(&self) -> ReadFuture<'_, T> {
    ReadFuture::new(self)
  }

  /// An asynchronous stream of the items of this channel.
  pub fn stream(&self) -> ReadStream<T> {
    ReadStream::new(self.clone())
  }

  // --- Views ---

  /// This channel narrowed to its read operations.
  pub fn read_only(&self) -> &dyn ReadOnlyChannel<T> {
    self
  }

  /// This channel narrowed to its write operations.
  pub fn write_only(&self) -> &dyn WriteOnlyChannel<T> {
    self
  }

  // --- Introspection ---

  /// Returns the capacity of the channel. `None` for unbounded channels,
  /// `Some(0)` for rendezvous channels.
  pub fn capacity(&self) -> Option<usize> {
    if self.shared.capacity == UNBOUNDED {
      None
    } else {
      Some(self.shared.capacity)
    }
  }

  /// Returns the number of items currently buffered.
  /// For rendezvous channels, this will usually be 0.
  #[inline]
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  /// Returns `true` if no items are buffered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` if the buffer is full.
  /// Always `false` for unbounded channels, and `true` for rendezvous channels.
  #[inline]
  pub fn is_full(&self) -> bool {
    if self.shared.capacity == UNBOUNDED {
      false
    } else {
      self.len() >= self.shared.capacity
    }
  }

  /// Returns `true` once [`close`](Self::close) has been called. Buffered
  /// items may still be waiting to be read.
  pub fn is_closed(&self) -> bool {
    self.shared.is_closed()
  }
}

impl<T: Send> Clone for TypedChannel<T> {
  fn clone(&self) -> Self {
    TypedChannel {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T: Send> fmt::Debug for TypedChannel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypedChannel")
      .field("capacity", &self.capacity())
      .field("len", &self.len())
      .field("closed", &self.is_closed())
      .finish()
  }
}
