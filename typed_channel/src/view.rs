//! Read-only and write-only views of a channel.
//!
//! These traits restrict which operations a collaborator can call; they add
//! no behavior. Hand a producer a `&dyn WriteOnlyChannel<T>` (or take
//! `impl WriteOnlyChannel<T>`) and it cannot read, and vice versa. Both views
//! forward to the same underlying [`TypedChannel`].

use crate::error::TryReadError;
use crate::TypedChannel;

use std::time::Duration;

/// The producer-side operations of a channel.
pub trait WriteOnlyChannel<T: Send> {
  /// See [`TypedChannel::try_write`].
  fn try_write(&self, value: T) -> bool;
  /// See [`TypedChannel::write`].
  fn write(&self, value: T);
  /// See [`TypedChannel::try_write_batch`].
  fn try_write_batch(&self, values: Vec<T>) -> (usize, bool);
  /// See [`TypedChannel::write_batch`].
  fn write_batch(&self, values: Vec<T>);
  /// See [`TypedChannel::close`].
  fn close(&self);
}

/// The consumer-side operations of a channel.
pub trait ReadOnlyChannel<T: Send> {
  /// See [`TypedChannel::read`].
  fn read(&self) -> Option<T>;
  /// See [`TypedChannel::try_read`].
  fn try_read(&self) -> Result<T, TryReadError>;
  /// See [`TypedChannel::read_available`].
  fn read_available(&self) -> (Vec<T>, bool);
  /// See [`TypedChannel::read_n`].
  fn read_n(&self, count: usize) -> (Vec<T>, bool);
  /// See [`TypedChannel::read_all`].
  fn read_all(&self) -> Vec<T>;
  /// See [`TypedChannel::read_all_with_timeout`].
  fn read_all_with_timeout(&self, timeout: Duration) -> (Vec<T>, bool);
  /// A blocking iterator that ends once the channel is closed and drained.
  /// See [`TypedChannel::iter`].
  fn iter(&self) -> Box<dyn Iterator<Item = T> + '_>;
}

impl<'a, T: Send + 'a> IntoIterator for &'a dyn ReadOnlyChannel<T> {
  type Item = T;
  type IntoIter = Box<dyn Iterator<Item = T> + 'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Both halves. Implemented for anything that is both a reader and a writer.
pub trait Channel<T: Send>: ReadOnlyChannel<T> + WriteOnlyChannel<T> {}

impl<T: Send, C> Channel<T> for C where C: ReadOnlyChannel<T> + WriteOnlyChannel<T> {}

impl<T: Send> WriteOnlyChannel<T> for TypedChannel<T> {
  #[track_caller]
  fn try_write(&self, value: T) -> bool {
    TypedChannel::try_write(self, value)
  }

  #[track_caller]
  fn write(&self, value: T) {
    TypedChannel::write(self, value)
  }

  #[track_caller]
  fn try_write_batch(&self, values: Vec<T>) -> (usize, bool) {
    TypedChannel::try_write_batch(self, values)
  }

  #[track_caller]
  fn write_batch(&self, values: Vec<T>) {
    TypedChannel::write_batch(self, values)
  }

  #[track_caller]
  fn close(&self) {
    TypedChannel::close(self)
  }
}

impl<T: Send> ReadOnlyChannel<T> for TypedChannel<T> {
  fn read(&self) -> Option<T> {
    TypedChannel::read(self)
  }

  fn try_read(&self) -> Result<T, TryReadError> {
    TypedChannel::try_read(self)
  }

  fn read_available(&self) -> (Vec<T>, bool) {
    TypedChannel::read_available(self)
  }

  fn read_n(&self, count: usize) -> (Vec<T>, bool) {
    TypedChannel::read_n(self, count)
  }

  fn read_all(&self) -> Vec<T> {
    TypedChannel::read_all(self)
  }

  fn read_all_with_timeout(&self, timeout: Duration) -> (Vec<T>, bool) {
    TypedChannel::read_all_with_timeout(self, timeout)
  }

  fn iter(&self) -> Box<dyn Iterator<Item = T> + '_> {
    Box::new(TypedChannel::iter(self))
  }
}
