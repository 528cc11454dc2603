mod common;
use common::*;

use fibre_typed_channel as typed;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::thread;

// --- Helper: N producers, M consumers, close after the producers finish ---
fn run_mpmc_test(num_producers: usize, num_consumers: usize, items_per_producer: usize, capacity: usize) {
  let ch = typed::with_capacity(capacity);
  let total_items_expected = num_producers * items_per_producer;
  let received_items_set = Arc::new(Mutex::new(HashSet::new()));
  let received_count = Arc::new(AtomicUsize::new(0));

  let mut consumer_handles = Vec::new();
  for _ in 0..num_consumers {
    let rx = ch.clone();
    let received_set_clone = Arc::clone(&received_items_set);
    let received_count_clone = Arc::clone(&received_count);
    consumer_handles.push(thread::spawn(move || {
      while let Some(item) = rx.read() {
        assert!(
          received_set_clone.lock().unwrap().insert(item),
          "Duplicate item received!"
        );
        received_count_clone.fetch_add(1, AtomicOrdering::Relaxed);
      }
    }));
  }

  let mut producer_handles = Vec::new();
  for p_id in 0..num_producers {
    let tx = ch.clone();
    producer_handles.push(thread::spawn(move || {
      for i in 0..items_per_producer {
        tx.write(p_id * items_per_producer + i);
      }
    }));
  }

  for handle in producer_handles {
    handle.join().expect("producer thread panicked");
  }
  // Single closer: only after every producer is done.
  ch.close();
  for handle in consumer_handles {
    handle.join().expect("consumer thread panicked");
  }

  assert_eq!(received_count.load(AtomicOrdering::Relaxed), total_items_expected);
  assert_eq!(received_items_set.lock().unwrap().len(), total_items_expected);
}

#[test]
fn one_producer_one_consumer() {
  run_mpmc_test(1, 1, ITEMS_HIGH, 16);
}

#[test]
fn many_producers_one_consumer() {
  run_mpmc_test(4, 1, ITEMS_MEDIUM, 16);
}

#[test]
fn one_producer_many_consumers() {
  run_mpmc_test(1, 4, ITEMS_HIGH, 16);
}

#[test]
fn many_producers_many_consumers_high_contention() {
  run_mpmc_test(4, 4, ITEMS_HIGH, 2);
}

#[test]
fn many_producers_many_consumers_rendezvous() {
  run_mpmc_test(4, 4, ITEMS_MEDIUM, 0);
}

#[test]
fn per_producer_order_is_preserved() {
  let ch = typed::with_capacity(8);
  let num_producers = 4;

  let producers: Vec<_> = (0..num_producers)
    .map(|p_id| {
      let tx = ch.clone();
      thread::spawn(move || {
        for seq in 0..ITEMS_HIGH {
          tx.write((p_id, seq));
        }
      })
    })
    .collect();

  let closer = {
    let tx = ch.clone();
    thread::spawn(move || {
      for handle in producers {
        handle.join().unwrap();
      }
      tx.close();
    })
  };

  let mut next_expected = vec![0; num_producers];
  for (p_id, seq) in &ch {
    assert_eq!(seq, next_expected[p_id], "producer {} out of order", p_id);
    next_expected[p_id] += 1;
  }
  closer.join().unwrap();
  assert!(next_expected.iter().all(|&n| n == ITEMS_HIGH));
}

#[test]
fn close_releases_every_blocked_reader() {
  let ch = typed::new_channel::<i32>();
  let readers: Vec<_> = (0..3)
    .map(|_| {
      let rx = ch.clone();
      thread::spawn(move || rx.read())
    })
    .collect();

  thread::sleep(SHORT_TIMEOUT);
  ch.close();
  for reader in readers {
    assert_eq!(reader.join().unwrap(), None);
  }
}

#[test]
fn blocked_readers_drain_buffer_left_at_close() {
  let ch = typed::with_capacity(4);
  let rx = ch.clone();
  let reader = thread::spawn(move || rx.read_n(10));

  ch.write_batch([1, 2, 3]);
  ch.close();
  assert_eq!(reader.join().unwrap(), (vec![1, 2, 3], false));
}

#[test]
fn rendezvous_ping_pong() {
  let ping = typed::new_channel();
  let pong = typed::new_channel();

  let (ping_rx, pong_tx) = (ping.clone(), pong.clone());
  let echo = thread::spawn(move || {
    while let Some(v) = ping_rx.read() {
      pong_tx.write(v + 1);
    }
    pong_tx.close();
  });

  for i in 0..ITEMS_MEDIUM {
    ping.write(i);
    assert_eq!(pong.read(), Some(i + 1));
  }
  ping.close();
  assert_eq!(pong.read(), None);
  echo.join().unwrap();
}
