// src/error.rs

use core::fmt;

/// The write-side operation that was attempted on a closed channel.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operation {
  /// [`TypedChannel::try_write`](crate::TypedChannel::try_write).
  TryWrite,
  /// [`TypedChannel::write`](crate::TypedChannel::write).
  Write,
  /// [`TypedChannel::try_write_batch`](crate::TypedChannel::try_write_batch).
  TryWriteBatch,
  /// [`TypedChannel::write_batch`](crate::TypedChannel::write_batch).
  WriteBatch,
  /// [`TypedChannel::close`](crate::TypedChannel::close).
  Close,
}

impl Operation {
  pub(crate) fn as_str(&self) -> &'static str {
    match self {
      Operation::TryWrite => "try_write",
      Operation::Write => "write",
      Operation::TryWriteBatch => "try_write_batch",
      Operation::WriteBatch => "write_batch",
      Operation::Close => "close",
    }
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A write or close was attempted on a channel that has already been closed.
///
/// This is a programming error, not a runtime condition: whoever closes a
/// channel must be the last writer, and must close it exactly once. It is
/// never returned as a status. The offending call panics with this value as
/// the panic payload (see [`std::panic::panic_any`]), so tests and supervisors
/// can tell it apart from other panics with `downcast_ref::<ClosedChannelViolation>()`.
///
/// Reads are asymmetric on purpose: reading from a closed channel drains what
/// is buffered and then reports termination through its return value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ClosedChannelViolation {
  /// The operation that hit the closed channel.
  pub operation: Operation,
}

impl std::error::Error for ClosedChannelViolation {}
impl fmt::Display for ClosedChannelViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.operation {
      Operation::Close => write!(f, "close called on an already closed channel"),
      op => write!(f, "{} called on a closed channel", op),
    }
  }
}

/// Error returned by [`TypedChannel::try_read`](crate::TypedChannel::try_read)
/// when an item could not be received immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryReadError {
  /// Nothing is buffered and no writer is parked with an item.
  Empty,
  /// The channel is closed and every buffered item has been read.
  Closed,
}
impl std::error::Error for TryReadError {}
impl fmt::Display for TryReadError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryReadError::Empty => write!(f, "channel empty"),
      TryReadError::Closed => write!(f, "channel closed and drained"),
    }
  }
}

/// Outcome of the non-blocking write core when the item was not accepted.
/// The item is handed back so blocking callers can retry with it.
#[derive(PartialEq, Eq)]
pub(crate) enum TryWriteError<T> {
  /// No free slot, or no ready reader on a rendezvous channel.
  Full(T),
  Closed(T),
}

impl<T> TryWriteError<T> {
  #[inline]
  pub(crate) fn into_inner(self) -> T {
    match self {
      TryWriteError::Full(v) | TryWriteError::Closed(v) => v,
    }
  }
}

impl<T> fmt::Debug for TryWriteError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryWriteError::Full(_) => write!(f, "TryWriteError::Full(..)"),
      TryWriteError::Closed(_) => write!(f, "TryWriteError::Closed(..)"),
    }
  }
}

/// Logs and raises the fatal violation for `operation`.
///
/// Callers must have released the channel lock before calling this.
#[cold]
#[track_caller]
pub(crate) fn raise_violation(operation: Operation) -> ! {
  let violation = ClosedChannelViolation { operation };
  tracing::error!(operation = %operation, "{}", violation);
  crate::telemetry::increment_counter("violation", operation.as_str());
  std::panic::panic_any(violation)
}
