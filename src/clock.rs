//! Wall-clock access for strategies, swappable in tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
  /// Current time in epoch milliseconds
  fn now_ms(&self) -> i64;

  fn now(&self) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(self.now_ms()).unwrap_or_default()
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_ms(&self) -> i64 {
    Utc::now().timestamp_millis()
  }

  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Manually advanced clock
#[derive(Debug, Default)]
pub struct FixedClock {
  now_ms: AtomicI64,
}

impl FixedClock {
  pub fn new(now_ms: i64) -> Self {
    Self { now_ms: AtomicI64::new(now_ms) }
  }

  pub fn set(&self, now_ms: i64) {
    self.now_ms.store(now_ms, Ordering::SeqCst);
  }

  pub fn advance_ms(&self, delta_ms: i64) {
    self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
  }
}

impl Clock for FixedClock {
  fn now_ms(&self) -> i64 {
    self.now_ms.load(Ordering::SeqCst)
  }
}
