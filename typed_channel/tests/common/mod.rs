#![allow(dead_code)]

use fibre_typed_channel::{ClosedChannelViolation, Operation};

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(100);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(3);
pub const ITEMS_LOW: usize = 50;
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;

/// Runs `f` and returns the operation named by the `ClosedChannelViolation`
/// it panicked with, or `None` if it did not panic with one.
pub fn violation_of<R>(f: impl FnOnce() -> R) -> Option<Operation> {
  match panic::catch_unwind(AssertUnwindSafe(f)) {
    Ok(_) => None,
    Err(payload) => payload
      .downcast_ref::<ClosedChannelViolation>()
      .map(|v| v.operation),
  }
}
