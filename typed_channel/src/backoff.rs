use std::thread;
use std::time::Instant;

const SPIN_ROUNDS: usize = 10;
const YIELD_ROUNDS: usize = 20;

/// Emits a CPU instruction that signals the processor that it is in a spin loop.
#[inline(always)]
fn spin_hint() {
  std::hint::spin_loop();
}

/// An adaptive wait strategy that starts with spinning, then yields, then parks.
///
/// Returns only once `cond` holds. The thread is expected to be `unpark`ed by
/// whoever makes `cond` true.
pub(crate) fn adaptive_wait<F>(cond: F)
where
  F: Fn() -> bool,
{
  // 1. Spinning Phase
  for _ in 0..SPIN_ROUNDS {
    if cond() {
      return;
    }
    spin_hint();
  }

  // 2. Yielding Phase
  for _ in 0..YIELD_ROUNDS {
    if cond() {
      return;
    }
    thread::yield_now();
  }

  // 3. Blocking Phase
  while !cond() {
    thread::park();
  }
}

/// Like [`adaptive_wait`], but gives up at `deadline`.
///
/// Returns `true` if `cond` held before the deadline passed, `false` otherwise.
/// The condition is always checked once more after the deadline so a wake-up
/// that raced the clock is not reported as a timeout.
pub(crate) fn adaptive_wait_until<F>(deadline: Instant, cond: F) -> bool
where
  F: Fn() -> bool,
{
  for _ in 0..SPIN_ROUNDS {
    if cond() {
      return true;
    }
    spin_hint();
  }

  for _ in 0..YIELD_ROUNDS {
    if cond() {
      return true;
    }
    if Instant::now() >= deadline {
      return cond();
    }
    thread::yield_now();
  }

  loop {
    if cond() {
      return true;
    }
    let now = Instant::now();
    if now >= deadline {
      return cond();
    }
    // park_timeout may wake spuriously; the loop re-checks both exits.
    thread::park_timeout(deadline - now);
  }
}
