mod common;
use common::*;

use fibre_typed_channel as typed;
use fibre_typed_channel::TryReadError;

use std::thread;

#[test]
fn rendezvous_read_available_returns_one_value_at_a_time() {
  let ch = typed::new_channel();
  let values = vec![1, 2, 3];

  let tx = ch.clone();
  let to_write = values.clone();
  let writer = thread::spawn(move || tx.write_batch(to_write));

  let mut total = 0;
  while total < values.len() {
    let (read, ok) = ch.read_available();
    assert!(ok, "failed to read available values");
    assert_eq!(read.len(), 1, "unbuffered channel should only read 1 value at a time");
    assert_eq!(read[0], values[total]);
    total += 1;
  }
  writer.join().unwrap();
}

#[test]
fn rendezvous_read_available_on_closed_empty_channel_is_not_ok() {
  let ch = typed::new_channel::<i32>();
  ch.close();
  let (read, ok) = ch.read_available();
  assert!(read.is_empty());
  assert!(!ok, "expected read_available to report closure on an empty rendezvous channel");
}

#[test]
fn buffered_read_available_reads_whatever_arrives() {
  let ch = typed::with_capacity(5);
  let values = vec![1, 2, 3];

  let tx = ch.clone();
  let to_write = values.clone();
  let writer = thread::spawn(move || tx.write_batch(to_write));

  let mut received = Vec::new();
  while received.len() < values.len() {
    let (read, ok) = ch.read_available();
    assert!(ok, "failed to read available values");
    received.extend(read);
  }
  assert_eq!(received, values);
  writer.join().unwrap();
}

#[test]
fn buffered_read_available_takes_exactly_the_buffered_items() {
  let ch = typed::with_capacity(4);
  assert_eq!(ch.try_write_batch([1, 2, 3, 4]), (4, true));
  // No reader is pending, nothing else arrives: this must not block.
  assert_eq!(ch.read_available(), (vec![1, 2, 3, 4], true));
  assert!(ch.is_empty());
}

#[test]
fn buffered_read_available_on_closed_empty_channel_is_ok() {
  let ch = typed::with_capacity::<i32>(5);
  ch.close();
  assert_eq!(ch.read_available(), (vec![], true));
}

#[test]
fn buffered_read_available_drains_after_close() {
  let ch = typed::with_capacity(5);
  ch.write_batch([7, 8]);
  ch.close();
  assert_eq!(ch.read_available(), (vec![7, 8], true));
  assert_eq!(ch.read(), None);
}

#[test]
fn read_n_returns_exactly_count_when_available() {
  let ch = typed::with_capacity(8);
  ch.write_batch(1..=5);
  assert_eq!(ch.read_n(3), (vec![1, 2, 3], true));
  assert_eq!(ch.len(), 2);
  assert_eq!(ch.read_n(0), (vec![], true));
}

#[test]
fn read_n_returns_partial_sequence_on_close() {
  let ch = typed::with_capacity(4);
  ch.write_batch([1, 2]);
  ch.close();
  assert_eq!(ch.read_n(3), (vec![1, 2], false));
  assert_eq!(ch.read_n(1), (vec![], false));
}

#[test]
fn read_n_blocks_between_items() {
  let ch = typed::new_channel();
  let tx = ch.clone();
  let writer = thread::spawn(move || {
    for i in 0..ITEMS_LOW {
      tx.write(i);
    }
  });
  let (values, ok) = ch.read_n(ITEMS_LOW);
  assert!(ok);
  assert_eq!(values, (0..ITEMS_LOW).collect::<Vec<_>>());
  writer.join().unwrap();
}

#[test]
fn read_returns_none_once_closed_and_drained() {
  let ch = typed::with_capacity(2);
  ch.write(1);
  ch.close();
  assert!(ch.is_closed());
  assert_eq!(ch.read(), Some(1));
  assert_eq!(ch.read(), None);
  assert_eq!(ch.read(), None);
}

#[test]
fn read_all_waits_for_close() {
  let ch = typed::with_capacity(2);
  let tx = ch.clone();
  let writer = thread::spawn(move || {
    tx.write_batch([1, 2, 3]);
    thread::sleep(SHORT_TIMEOUT);
    tx.write(4);
    tx.close();
  });
  assert_eq!(ch.read_all(), vec![1, 2, 3, 4]);
  writer.join().unwrap();
}

#[test]
fn try_read_reports_empty_and_closed() {
  let ch = typed::with_capacity(2);
  assert_eq!(ch.try_read(), Err(TryReadError::Empty));
  ch.write(1);
  assert_eq!(ch.try_read(), Ok(1));
  ch.close();
  assert_eq!(ch.try_read(), Err(TryReadError::Closed));
}

#[test]
fn rendezvous_try_read_takes_from_blocked_writer() {
  let ch = typed::new_channel();
  assert_eq!(ch.try_read(), Err(TryReadError::Empty));

  let tx = ch.clone();
  let writer = thread::spawn(move || tx.write(42));
  let value = loop {
    match ch.try_read() {
      Ok(v) => break v,
      Err(TryReadError::Empty) => thread::yield_now(),
      Err(TryReadError::Closed) => panic!("channel closed unexpectedly"),
    }
  };
  assert_eq!(value, 42);
  writer.join().unwrap();
}

#[test]
fn iterators_drain_until_close() {
  let ch = typed::with_capacity(8);
  ch.write_batch([1, 2, 3]);
  ch.close();

  let mut seen = Vec::new();
  for item in &ch {
    seen.push(item);
  }
  assert_eq!(seen, vec![1, 2, 3]);
  assert_eq!(ch.iter().next(), None);

  let owned = typed::with_capacity(4);
  owned.write_batch(["a", "b"]);
  owned.close();
  assert_eq!(owned.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn debug_shows_state_without_item_debug() {
  struct Opaque;
  let ch = typed::with_capacity(4);
  ch.write(Opaque);
  let text = format!("{:?}", ch);
  assert!(text.contains("capacity: Some(4)"), "{}", text);
  assert!(text.contains("len: 1"), "{}", text);
  assert!(text.contains("closed: false"), "{}", text);
}
