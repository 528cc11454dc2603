//! Implementation of the synchronous, blocking write and read logic.
//!
//! Every function follows the same shape: lock, attempt the non-blocking core,
//! and if that cannot complete, enqueue a waiter before releasing the lock.
//! The thread then waits on its [`WaitState`](crate::shared::WaitState) with
//! the adaptive backoff and loops.

use crate::backoff;
use crate::error::{TryReadError, TryWriteError};
use crate::shared::{ChannelShared, Signal};

use std::time::Instant;

/// The channel was closed before (or while) a blocking write could complete.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct WriteOnClosed;

/// Outcome of a deadline-bounded read.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DeadlineRead<T> {
  Item(T),
  Closed,
  TimedOut,
}

/// The blocking write. Parks until the item is accepted.
///
/// For a rendezvous channel the item is parked together with the thread and
/// the write completes when a reader takes it. If the channel is closed
/// meanwhile the item is dropped and `WriteOnClosed` is returned.
pub(crate) fn write_sync<T: Send>(shared: &ChannelShared<T>, item: T) -> Result<(), WriteOnClosed> {
  let mut current = item;

  loop {
    let mut guard = shared.internal.lock();
    let item = match guard.try_write(shared.capacity, current) {
      Ok(()) => return Ok(()),
      Err(TryWriteError::Closed(_)) => return Err(WriteOnClosed),
      Err(full) => full.into_inner(),
    };

    if shared.capacity == 0 {
      let state = guard.register_sync_writer(Some(item));
      drop(guard);
      backoff::adaptive_wait(|| state.is_signaled());
      return match state.get() {
        Some(Signal::Ready) => Ok(()),
        _ => Err(WriteOnClosed),
      };
    }

    // Buffered: wait for a slot, then retry with the item we still own.
    let state = guard.register_sync_writer(None);
    drop(guard);
    backoff::adaptive_wait(|| state.is_signaled());
    if state.get() == Some(Signal::Closed) {
      return Err(WriteOnClosed);
    }
    current = item;
  }
}

/// The blocking read. Returns `None` once the channel is closed and drained.
pub(crate) fn read_sync<T: Send>(shared: &ChannelShared<T>) -> Option<T> {
  loop {
    let mut guard = shared.internal.lock();
    match guard.try_read(shared.capacity) {
      Ok(item) => return Some(item),
      Err(TryReadError::Closed) => return None,
      Err(TryReadError::Empty) => {}
    }

    let state = guard.register_sync_reader();
    drop(guard);
    backoff::adaptive_wait(|| state.is_signaled());
    // Woken: either an item was handed to us or the channel closed. Both are
    // resolved by the next try_read.
  }
}

/// A blocking read that gives up at `deadline`.
///
/// Every round tries to read before looking at the clock, so whatever is
/// already buffered (or handed to this reader) is taken even when the deadline
/// has passed, and a closed channel is always reported as `Closed`. The
/// deadline only stops the reader from waiting for more.
pub(crate) fn read_until_sync<T: Send>(shared: &ChannelShared<T>, deadline: Instant) -> DeadlineRead<T> {
  loop {
    let mut guard = shared.internal.lock();
    match guard.try_read(shared.capacity) {
      Ok(item) => return DeadlineRead::Item(item),
      Err(TryReadError::Closed) => return DeadlineRead::Closed,
      Err(TryReadError::Empty) => {}
    }

    if Instant::now() >= deadline {
      return DeadlineRead::TimedOut;
    }

    let state = guard.register_sync_reader();
    drop(guard);

    if backoff::adaptive_wait_until(deadline, || state.is_signaled()) {
      continue;
    }

    // Deadline passed. Withdraw, unless a writer or close got to us first; in
    // that case the next round picks up the item or the close.
    shared.internal.lock().deregister_sync_reader(&state);
  }
}
