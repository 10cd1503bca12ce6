//! Half-open integer spans

use fg_rng::LayoutRng;
use serde::{Deserialize, Serialize};

/// Half-open span `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl IntRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Span holding a single value
    pub const fn single(v: i32) -> Self {
        Self { min: v, max: v + 1 }
    }

    pub const fn len(&self) -> i32 {
        if self.max > self.min {
            self.max - self.min
        } else {
            0
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.max <= self.min
    }

    pub const fn contains(&self, v: i32) -> bool {
        v >= self.min && v < self.max
    }

    /// True if `other` lies entirely within this span
    pub const fn contains_range(&self, other: &IntRange) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    pub const fn overlaps(&self, other: &IntRange) -> bool {
        self.min < other.max && other.min < self.max
    }

    pub fn intersect(&self, other: &IntRange) -> Option<IntRange> {
        let r = IntRange::new(self.min.max(other.min), self.max.min(other.max));
        (!r.is_empty()).then_some(r)
    }

    /// Smallest span covering both
    pub fn hull(&self, other: &IntRange) -> IntRange {
        IntRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Distance from `v` to the nearest value in the span (0 if inside)
    pub fn distance_to(&self, v: i32) -> i32 {
        if v < self.min {
            self.min - v
        } else if v >= self.max {
            v - self.max + 1
        } else {
            0
        }
    }
}

/// Uniformly picked integer in `[min, max)`.
///
/// Picking always draws once unless the span is empty, in which case `min`
/// is returned without a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RandRange {
    pub min: i32,
    pub max: i32,
}

impl RandRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Always yields `v` (still draws once)
    pub const fn fixed(v: i32) -> Self {
        Self { min: v, max: v + 1 }
    }

    pub fn pick(&self, rng: &mut dyn LayoutRng) -> i32 {
        rng.next_range(self.min, self.max)
    }
}

impl Default for RandRange {
    fn default() -> Self {
        RandRange::fixed(1)
    }
}
