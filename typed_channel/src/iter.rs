//! Blocking iterators over the read side of a channel.

use crate::TypedChannel;

use std::iter::FusedIterator;

/// A borrowing blocking iterator, created by [`TypedChannel::iter`].
///
/// Each call to `next` blocks like [`TypedChannel::read`]. Iteration ends when
/// the channel is closed and drained, and stays ended: nothing can be written
/// after close.
#[derive(Debug)]
pub struct Iter<'a, T: Send> {
  channel: &'a TypedChannel<T>,
}

impl<'a, T: Send> Iter<'a, T> {
  pub(crate) fn new(channel: &'a TypedChannel<T>) -> Self {
    Iter { channel }
  }
}

impl<'a, T: Send> Iterator for Iter<'a, T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.channel.read()
  }
}

impl<'a, T: Send> FusedIterator for Iter<'a, T> {}

/// An owning blocking iterator, created by calling `into_iter` on a
/// [`TypedChannel`] handle.
#[derive(Debug)]
pub struct IntoIter<T: Send> {
  channel: TypedChannel<T>,
}

impl<T: Send> Iterator for IntoIter<T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.channel.read()
  }
}

impl<T: Send> FusedIterator for IntoIter<T> {}

impl<'a, T: Send> IntoIterator for &'a TypedChannel<T> {
  type Item = T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Iter<'a, T> {
    Iter::new(self)
  }
}

impl<T: Send> IntoIterator for TypedChannel<T> {
  type Item = T;
  type IntoIter = IntoIter<T>;

  fn into_iter(self) -> IntoIter<T> {
    IntoIter { channel: self }
  }
}
