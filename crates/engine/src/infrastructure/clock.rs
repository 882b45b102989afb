//! Clock and random implementations.

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses the thread RNG.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_index(&self, len: usize) -> usize {
        use rand::Rng;
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Random that always picks the same index (clamped to the range) and hands
/// out sequential UUIDs.
#[cfg(test)]
pub struct FixedRandom {
    index: usize,
    next_uuid: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl FixedRandom {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            next_uuid: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_index(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }

    fn gen_uuid(&self) -> Uuid {
        let n = self
            .next_uuid
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Uuid::from_u128(n as u128)
    }
}
