// src/shared.rs

//! The core shared data structures and logic for the typed channel.
//!
//! All mutable state (the item buffer, the closed flag and the queues of
//! parked waiters) lives in one `parking_lot::Mutex`. Every operation takes
//! the lock, attempts its non-blocking core, and, if it has to wait, enqueues
//! a waiter *under the same lock acquisition*. That makes lost wake-ups
//! impossible: whoever changes the state that a waiter is waiting for must
//! take the lock first, and will find the waiter there.
//!
//! ### Capacity semantics
//!
//! - `capacity > 0`: items are buffered in `queue` up to `capacity`. A write
//!   that finds the buffer full parks in `waiting_sync_writers` and is woken
//!   (to retry) when a read frees a slot.
//! - `capacity == 0` (rendezvous): nothing is buffered on behalf of writers.
//!   A non-blocking write succeeds only by handing its item to a parked
//!   reader, which is popped from its queue and woken; the item travels
//!   through `queue` for the few instructions until that reader picks it up.
//!   A blocking write that finds no reader parks *with its item* in its
//!   waiter slot, and a reader takes the item straight from the slot.
//! - `usize::MAX` marks an unbounded channel.
//!
//! ### Waking
//!
//! Parked threads are woken through a shared [`WaitState`] that records why
//! they were woken (`Ready` or `Closed`), followed by `Thread::unpark`. Async
//! readers are woken through their `Waker`. Async readers are preferred over
//! sync ones when a single reader must be picked, as they are cheaper to wake.

use crate::error::{TryReadError, TryWriteError};

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::{self, Thread};

/// Marks an unbounded channel.
pub(crate) const UNBOUNDED: usize = usize::MAX;

const WAITING: u8 = 0;
const READY: u8 = 1;
const CLOSED: u8 = 2;

/// Why a parked waiter was woken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
  /// The resource the waiter asked for changed: an item arrived, a slot was
  /// freed, or (rendezvous writer) the item was taken.
  Ready,
  /// The channel was closed while the waiter was parked.
  Closed,
}

/// The wake-up flag shared between a parked thread and whoever wakes it.
#[derive(Debug)]
pub(crate) struct WaitState(AtomicU8);

impl WaitState {
  fn new() -> Self {
    WaitState(AtomicU8::new(WAITING))
  }

  fn signal(&self, signal: Signal) {
    let value = match signal {
      Signal::Ready => READY,
      Signal::Closed => CLOSED,
    };
    self.0.store(value, Ordering::Release);
  }

  pub(crate) fn get(&self) -> Option<Signal> {
    match self.0.load(Ordering::Acquire) {
      READY => Some(Signal::Ready),
      CLOSED => Some(Signal::Closed),
      _ => None,
    }
  }

  #[inline]
  pub(crate) fn is_signaled(&self) -> bool {
    self.0.load(Ordering::Acquire) != WAITING
  }
}

/// A parked synchronous thread.
#[derive(Debug)]
pub(crate) struct SyncWaiter<T> {
  /// The handle to the parked thread, used for `unpark()`.
  thread: Thread,
  /// A rendezvous writer's item. `None` for readers and buffered writers.
  item: Option<T>,
  state: Arc<WaitState>,
}

impl<T> SyncWaiter<T> {
  fn wake(&self, signal: Signal) {
    self.state.signal(signal);
    self.thread.unpark();
  }
}

/// A parked async reader, identified so that a dropped future can withdraw it.
#[derive(Debug)]
pub(crate) struct AsyncWaiter {
  id: u64,
  waker: Waker,
}

/// The state behind the channel mutex.
#[derive(Debug)]
pub(crate) struct ChannelInternal<T> {
  /// Buffered items, and for rendezvous channels items in transit to a woken reader.
  queue: VecDeque<T>,
  waiting_sync_writers: VecDeque<SyncWaiter<T>>,
  waiting_sync_readers: VecDeque<SyncWaiter<T>>,
  waiting_async_readers: VecDeque<AsyncWaiter>,
  next_waiter_id: u64,
  closed: bool,
}

/// Waiters released by `close`, woken after the lock is dropped.
#[derive(Debug)]
pub(crate) struct ReleasedWaiters<T> {
  sync_readers: VecDeque<SyncWaiter<T>>,
  async_readers: VecDeque<AsyncWaiter>,
  writers: VecDeque<SyncWaiter<T>>,
  /// Items still buffered at the moment of close; readers will drain them.
  pub(crate) buffered: usize,
}

impl<T> ReleasedWaiters<T> {
  pub(crate) fn reader_count(&self) -> usize {
    self.sync_readers.len() + self.async_readers.len()
  }

  pub(crate) fn writer_count(&self) -> usize {
    self.writers.len()
  }

  /// Wakes everyone. Parked rendezvous writers' items are dropped here: they
  /// were never delivered, and their writers are about to raise a violation.
  pub(crate) fn wake_all(self) {
    for waiter in self.sync_readers {
      waiter.wake(Signal::Closed);
    }
    for waiter in self.async_readers {
      waiter.waker.wake();
    }
    for waiter in self.writers {
      waiter.wake(Signal::Closed);
    }
  }
}

impl<T> ChannelInternal<T> {
  fn has_waiting_reader(&self) -> bool {
    !self.waiting_async_readers.is_empty() || !self.waiting_sync_readers.is_empty()
  }

  /// Wakes one parked reader, async first. Returns `false` if none was parked.
  fn wake_one_reader(&mut self) -> bool {
    if let Some(waiter) = self.waiting_async_readers.pop_front() {
      waiter.waker.wake();
      return true;
    }
    if let Some(waiter) = self.waiting_sync_readers.pop_front() {
      waiter.wake(Signal::Ready);
      return true;
    }
    false
  }

  fn wake_one_writer(&mut self) {
    if let Some(waiter) = self.waiting_sync_writers.pop_front() {
      waiter.wake(Signal::Ready);
    }
  }

  /// The non-blocking write core.
  pub(crate) fn try_write(&mut self, capacity: usize, item: T) -> Result<(), TryWriteError<T>> {
    if self.closed {
      return Err(TryWriteError::Closed(item));
    }

    if capacity == 0 {
      // Rendezvous: only a reader that is already parked makes a write possible.
      if !self.has_waiting_reader() {
        return Err(TryWriteError::Full(item));
      }
      self.queue.push_back(item);
      self.wake_one_reader();
      return Ok(());
    }

    if capacity != UNBOUNDED && self.queue.len() >= capacity {
      return Err(TryWriteError::Full(item));
    }
    self.queue.push_back(item);
    self.wake_one_reader();
    Ok(())
  }

  /// The non-blocking read core. Buffered items come first, then (rendezvous
  /// only) an item held by a parked writer. `Closed` is reported only once
  /// both are exhausted.
  pub(crate) fn try_read(&mut self, capacity: usize) -> Result<T, TryReadError> {
    if let Some(item) = self.queue.pop_front() {
      if capacity > 0 {
        // A slot was freed.
        self.wake_one_writer();
      }
      return Ok(item);
    }

    if capacity == 0 {
      if let Some(mut waiter) = self.waiting_sync_writers.pop_front() {
        match waiter.item.take() {
          Some(item) => {
            waiter.wake(Signal::Ready);
            return Ok(item);
          }
          None => self.waiting_sync_writers.push_front(waiter),
        }
      }
    }

    if self.closed {
      Err(TryReadError::Closed)
    } else {
      Err(TryReadError::Empty)
    }
  }

  /// Parks the calling thread's identity in the writer queue.
  /// `item` is `Some` only for rendezvous writers.
  pub(crate) fn register_sync_writer(&mut self, item: Option<T>) -> Arc<WaitState> {
    let state = Arc::new(WaitState::new());
    self.waiting_sync_writers.push_back(SyncWaiter {
      thread: thread::current(),
      item,
      state: Arc::clone(&state),
    });
    state
  }

  pub(crate) fn register_sync_reader(&mut self) -> Arc<WaitState> {
    let state = Arc::new(WaitState::new());
    self.waiting_sync_readers.push_back(SyncWaiter {
      thread: thread::current(),
      item: None,
      state: Arc::clone(&state),
    });
    state
  }

  /// Withdraws a parked sync reader. Returns `true` if it was still queued,
  /// i.e. nobody has signaled it yet.
  pub(crate) fn deregister_sync_reader(&mut self, state: &Arc<WaitState>) -> bool {
    match self
      .waiting_sync_readers
      .iter()
      .position(|w| Arc::ptr_eq(&w.state, state))
    {
      Some(pos) => {
        self.waiting_sync_readers.remove(pos);
        true
      }
      None => false,
    }
  }

  /// Registers (or refreshes) an async reader's waker. `registration` holds
  /// the waiter id between polls.
  fn register_async_reader(&mut self, registration: &mut Option<u64>, waker: &Waker) {
    if let Some(id) = *registration {
      if let Some(waiter) = self.waiting_async_readers.iter_mut().find(|w| w.id == id) {
        if !waiter.waker.will_wake(waker) {
          waiter.waker = waker.clone();
        }
        return;
      }
    }
    let id = self.next_waiter_id;
    self.next_waiter_id = self.next_waiter_id.wrapping_add(1);
    self.waiting_async_readers.push_back(AsyncWaiter {
      id,
      waker: waker.clone(),
    });
    *registration = Some(id);
  }

  /// Removes an async reader. Returns `true` if it was still queued.
  fn deregister_async_reader(&mut self, id: u64) -> bool {
    match self.waiting_async_readers.iter().position(|w| w.id == id) {
      Some(pos) => {
        self.waiting_async_readers.remove(pos);
        true
      }
      None => false,
    }
  }
}

/// The shared owner of the channel's internal state, wrapped in an `Arc` by
/// every [`TypedChannel`](crate::TypedChannel) handle.
#[derive(Debug)]
pub(crate) struct ChannelShared<T> {
  pub(crate) internal: Mutex<ChannelInternal<T>>,
  pub(crate) capacity: usize,
}

impl<T: Send> ChannelShared<T> {
  /// Creates a new shared core. `UNBOUNDED` gives an unbounded channel.
  pub(crate) fn new(capacity: usize) -> Self {
    ChannelShared {
      internal: Mutex::new(ChannelInternal {
        queue: VecDeque::with_capacity(if capacity == UNBOUNDED { 32 } else { capacity }),
        waiting_sync_writers: VecDeque::new(),
        waiting_sync_readers: VecDeque::new(),
        waiting_async_readers: VecDeque::new(),
        next_waiter_id: 0,
        closed: false,
      }),
      capacity,
    }
  }

  pub(crate) fn try_write(&self, item: T) -> Result<(), TryWriteError<T>> {
    self.internal.lock().try_write(self.capacity, item)
  }

  pub(crate) fn try_read(&self) -> Result<T, TryReadError> {
    self.internal.lock().try_read(self.capacity)
  }

  /// Flips the channel to closed and hands back every parked waiter.
  /// Returns `None` if the channel was already closed.
  pub(crate) fn close(&self) -> Option<ReleasedWaiters<T>> {
    let mut guard = self.internal.lock();
    if guard.closed {
      return None;
    }
    guard.closed = true;
    Some(ReleasedWaiters {
      sync_readers: std::mem::take(&mut guard.waiting_sync_readers),
      async_readers: std::mem::take(&mut guard.waiting_async_readers),
      writers: std::mem::take(&mut guard.waiting_sync_writers),
      buffered: guard.queue.len(),
    })
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.internal.lock().closed
  }

  pub(crate) fn len(&self) -> usize {
    self.internal.lock().queue.len()
  }

  /// Polls for the next item on behalf of an async reader.
  ///
  /// Resolves to `None` once the channel is closed and drained. While
  /// pending, the reader is registered and counts as a ready reader for
  /// rendezvous writes.
  pub(crate) fn poll_read(
    &self,
    cx: &mut Context<'_>,
    registration: &mut Option<u64>,
  ) -> Poll<Option<T>> {
    let mut guard = self.internal.lock();
    let outcome = match guard.try_read(self.capacity) {
      Ok(item) => Some(item),
      Err(TryReadError::Closed) => None,
      Err(TryReadError::Empty) => {
        guard.register_async_reader(registration, cx.waker());
        return Poll::Pending;
      }
    };
    if let Some(id) = registration.take() {
      guard.deregister_async_reader(id);
    }
    Poll::Ready(outcome)
  }

  /// Withdraws an async reader that is going away without being polled to
  /// completion. If it had already been picked to receive an item, the
  /// wake-up is passed on so the item is not stranded.
  pub(crate) fn cancel_async_read(&self, id: u64) {
    let mut guard = self.internal.lock();
    if !guard.deregister_async_reader(id) && !guard.queue.is_empty() {
      guard.wake_one_reader();
    }
  }
}
