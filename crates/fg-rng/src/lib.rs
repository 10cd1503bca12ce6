//! fg-rng: random number capability for floor layout generation
//!
//! The layout core never owns a generator. Every step borrows a
//! `&mut dyn LayoutRng` and draws from it in a fixed order, so the number and
//! order of draws is part of each step's observable behaviour.
//!
//! Draw rules shared by every implementation:
//! - `next_max(max)` consumes exactly one raw `u64` when `max > 0`, otherwise
//!   it returns 0 and consumes nothing.
//! - `next_range(min, max)` consumes exactly one raw `u64` when `max > min`,
//!   otherwise it returns `min` and consumes nothing.

use std::collections::VecDeque;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Numeric RNG interface consumed by the layout core.
pub trait LayoutRng {
    /// Next raw 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Returns a value in `[0, max)`, or 0 without drawing if `max <= 0`.
    fn next_max(&mut self, max: i32) -> i32 {
        if max <= 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as i32
    }

    /// Returns a value in `[min, max)`, or `min` without drawing if `max <= min`.
    fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64) as u64;
        (min as i64 + (self.next_u64() % span) as i64) as i32
    }

    /// Returns true with probability `percent`/100. Always draws once.
    fn percent(&mut self, percent: i32) -> bool {
        self.next_max(100) < percent
    }
}

impl<R: LayoutRng + ?Sized> LayoutRng for &mut R {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }

    fn next_max(&mut self, max: i32) -> i32 {
        (**self).next_max(max)
    }

    fn next_range(&mut self, min: i32, max: i32) -> i32 {
        (**self).next_range(min, max)
    }
}

/// Seeded generator backed by ChaCha8.
///
/// Note: RNG state is not serialized - only the seed is, and deserializing
/// restarts the stream from that seed.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl LayoutRng for GameRng {
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

/// An RNG call trace entry for debugging divergences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngTraceEntry {
    /// Sequence number (0-indexed)
    pub seq: u64,
    /// Function name ("next_u64", "next_max", "next_range")
    pub func: &'static str,
    /// Lower bound (0 for `next_max`)
    pub min: i64,
    /// Exclusive upper bound (`u64::MAX` range for raw draws is reported as 0)
    pub max: i64,
    /// Result value
    pub result: i64,
}

/// Wraps another generator and records every draw that consumed state.
#[derive(Debug, Clone)]
pub struct TracingRng<R> {
    inner: R,
    call_count: u64,
    trace: Vec<RngTraceEntry>,
}

impl<R: LayoutRng> TracingRng<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            call_count: 0,
            trace: Vec::new(),
        }
    }

    /// Total number of raw draws made through this wrapper
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    pub fn trace(&self) -> &[RngTraceEntry] {
        &self.trace
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn record(&mut self, func: &'static str, min: i64, max: i64, result: i64) {
        self.trace.push(RngTraceEntry {
            seq: self.call_count,
            func,
            min,
            max,
            result,
        });
        self.call_count += 1;
    }
}

impl<R: LayoutRng> LayoutRng for TracingRng<R> {
    fn next_u64(&mut self) -> u64 {
        let raw = self.inner.next_u64();
        self.record("next_u64", 0, 0, raw as i64);
        raw
    }

    fn next_max(&mut self, max: i32) -> i32 {
        if max <= 0 {
            return 0;
        }
        let res = self.inner.next_max(max);
        self.record("next_max", 0, max as i64, res as i64);
        res
    }

    fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let res = self.inner.next_range(min, max);
        self.record("next_range", min as i64, max as i64, res as i64);
        res
    }
}

/// Replays a fixed list of raw values.
///
/// `next_max(n)` yields `raw % n`, so scripting a value smaller than the
/// bound returns it unchanged. Intended for tests that pin exact choices.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: VecDeque<u64>,
    consumed: u64,
}

impl ScriptedRng {
    pub fn new<I: IntoIterator<Item = u64>>(values: I) -> Self {
        Self {
            values: values.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Number of scripted values already handed out
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Number of scripted values not yet drawn
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl LayoutRng for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        match self.values.pop_front() {
            Some(v) => {
                self.consumed += 1;
                v
            }
            None => panic!("ScriptedRng exhausted after {} draws", self.consumed),
        }
    }
}
