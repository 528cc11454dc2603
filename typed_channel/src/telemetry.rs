// src/telemetry.rs

//! Opt-in, in-process instrumentation for debugging channel interleavings.
//!
//! With the `telemetry` feature enabled every channel records events (close,
//! deadline expiry, released writers) and bumps named counters into one global
//! collector, which can be dumped with [`print_telemetry_report`]. Without the
//! feature every function here compiles to nothing, so call sites never need
//! their own `cfg` guards.
//!
//! Structured logging is separate and always on: channels emit `tracing`
//! events, and the application decides whether a subscriber listens.

#[cfg(feature = "telemetry")]
pub mod enabled {
  use parking_lot::Mutex;
  use std::collections::HashMap;
  use std::fmt;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::thread::{self, ThreadId};
  use std::time::Instant;

  static NEXT_EVENT_SEQUENCE_ID: AtomicUsize = AtomicUsize::new(0);

  /// A single recorded channel event.
  #[derive(Clone)]
  pub struct TelemetryEvent {
    /// Global sequence number across all events.
    pub seq_id: usize,
    pub timestamp: Instant,
    pub os_thread_id: ThreadId,
    /// Code location, e.g. `"close"` or `"read_all_with_timeout"`.
    pub location: String,
    pub event_type: String,
    pub message: Option<String>,
  }

  impl fmt::Debug for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TelemetryEvent")
        .field("seq", &self.seq_id)
        .field("os_tid", &self.os_thread_id)
        .field("loc", &self.location)
        .field("evt", &self.event_type)
        .field("msg", &self.message.as_deref().unwrap_or(""))
        .finish()
    }
  }

  type CounterKey = (String, String); // (location, counter_name)

  struct CollectorData {
    events: Vec<TelemetryEvent>,
    counters: HashMap<CounterKey, usize>,
    start_time: Instant,
  }

  impl CollectorData {
    fn new() -> Self {
      CollectorData {
        events: Vec::new(),
        counters: HashMap::new(),
        start_time: Instant::now(),
      }
    }
  }

  lazy_static::lazy_static! {
      static ref GLOBAL_COLLECTOR: Mutex<CollectorData> = Mutex::new(CollectorData::new());
  }

  pub fn log_event_fn(location: &str, event_type: &str, message: Option<String>) {
    let event = TelemetryEvent {
      seq_id: NEXT_EVENT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
      timestamp: Instant::now(),
      os_thread_id: thread::current().id(),
      location: location.to_string(),
      event_type: event_type.to_string(),
      message,
    };
    GLOBAL_COLLECTOR.lock().events.push(event);
  }

  pub fn increment_counter_fn(location: &str, counter_name: &str) {
    let key = (location.to_string(), counter_name.to_string());
    *GLOBAL_COLLECTOR.lock().counters.entry(key).or_insert(0) += 1;
  }

  pub fn counter_value_fn(location: &str, counter_name: &str) -> usize {
    let key = (location.to_string(), counter_name.to_string());
    GLOBAL_COLLECTOR.lock().counters.get(&key).copied().unwrap_or(0)
  }

  pub fn event_count_fn(location: &str, event_type: &str) -> usize {
    GLOBAL_COLLECTOR
      .lock()
      .events
      .iter()
      .filter(|e| e.location == location && e.event_type == event_type)
      .count()
  }

  pub fn print_telemetry_report_fn() {
    let collector = GLOBAL_COLLECTOR.lock();
    println!("\n--- Typed Channel Telemetry Report ---");

    if collector.events.is_empty() {
      println!("\n[Events] No detailed events recorded.");
    } else {
      println!("\n[Events] Recorded Events ({}):", collector.events.len());
      let mut sorted_events = collector.events.clone();
      sorted_events.sort_by_key(|e| e.seq_id);

      for event in sorted_events.iter() {
        let time_since_start = event.timestamp.duration_since(collector.start_time);
        println!(
          "  +{:<10.6}s [Seq:{:<5}] OS_TID:{:<12?} Loc:{:<24} Evt:{:<24} Msg: {}",
          time_since_start.as_secs_f64(),
          event.seq_id,
          event.os_thread_id,
          event.location,
          event.event_type,
          event.message.as_deref().unwrap_or("")
        );
      }
    }

    if collector.counters.is_empty() {
      println!("\n[Counters] No counters recorded.");
    } else {
      println!("\n[Counters] Recorded Counters ({}):", collector.counters.len());
      let mut sorted_counters: Vec<_> = collector.counters.iter().collect();
      sorted_counters.sort_by_key(|(k, _v)| *k);
      for ((loc, name), count) in sorted_counters {
        println!("  Loc:{:<24} Counter:{:<24} Value: {}", loc, name, count);
      }
    }
    println!("\n--- End of Telemetry Report ---");
  }

  pub fn clear_telemetry_fn() {
    let mut collector = GLOBAL_COLLECTOR.lock();
    collector.events.clear();
    collector.counters.clear();
    collector.start_time = Instant::now();
    NEXT_EVENT_SEQUENCE_ID.store(0, Ordering::Relaxed);
  }
}

#[cfg(not(feature = "telemetry"))]
pub mod disabled {
  #[inline(always)]
  pub fn log_event_fn(_location: &str, _event_type: &str, _message: Option<String>) {}
  #[inline(always)]
  pub fn increment_counter_fn(_location: &str, _counter_name: &str) {}
  #[inline(always)]
  pub fn counter_value_fn(_location: &str, _counter_name: &str) -> usize {
    0
  }
  #[inline(always)]
  pub fn event_count_fn(_location: &str, _event_type: &str) -> usize {
    0
  }
  #[inline(always)]
  pub fn print_telemetry_report_fn() {}
  #[inline(always)]
  pub fn clear_telemetry_fn() {}
}

#[cfg(feature = "telemetry")]
pub use enabled::{
  clear_telemetry_fn as clear_telemetry, counter_value_fn as counter_value,
  event_count_fn as event_count, increment_counter_fn as increment_counter, log_event_fn as log_event,
  print_telemetry_report_fn as print_telemetry_report, TelemetryEvent,
};

#[cfg(not(feature = "telemetry"))]
pub use disabled::{
  clear_telemetry_fn as clear_telemetry, counter_value_fn as counter_value,
  event_count_fn as event_count, increment_counter_fn as increment_counter, log_event_fn as log_event,
  print_telemetry_report_fn as print_telemetry_report,
};
