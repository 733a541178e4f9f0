//! Modular wrap-around intervals over fixed-width bit-vector values.
//!
//! An [`Interval`] describes the set of values a bit-vector term may take:
//! the contiguous range `[low, high]` when `low <= high`, and the
//! wrap-around union `[0, high] ∪ [low, 2^sz - 1]` when `low > high`.
//! The `tight` flag marks an interval derived from an exact atom
//! (an equality or one side of a `≤`); negating an interval that is not
//! tight loses all precision.
//!
//! ## References
//!
//! - Z3's `tactic/bv/bv_bounds_tactic.cpp`

use std::fmt;

/// BitVector width.
pub type BvWidth = u32;

/// Largest value representable in `sz` bits.
#[must_use]
pub fn max_value(sz: BvWidth) -> u64 {
    if sz >= 64 {
        u64::MAX
    } else {
        (1u64 << sz) - 1
    }
}

/// Interval over the values of a bit-vector of width `sz`.
///
/// Invariants: `low` and `high` are masked to `sz` bits, and a wrapped
/// interval covering every value (`low == high + 1`) is canonicalized to
/// the full range `[0, 2^sz - 1]` on construction.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    /// Lower bound (inclusive).
    pub low: u64,
    /// Upper bound (inclusive).
    pub high: u64,
    /// Width in bits.
    pub sz: BvWidth,
    /// Whether the interval is exact for the atom it was derived from.
    pub tight: bool,
}

impl PartialEq for Interval {
    /// Structural equality over `low`, `high`, `tight`. Widths are assumed
    /// consistent; comparing intervals of different widths is a caller bug.
    fn eq(&self, other: &Self) -> bool {
        debug_assert_eq!(self.sz, other.sz);
        self.low == other.low && self.high == other.high && self.tight == other.tight
    }
}

impl Eq for Interval {}

impl Interval {
    /// Create a new interval, masking both bounds to `sz` bits and
    /// canonicalizing the full wrap-around range.
    #[must_use]
    pub fn new(low: u64, high: u64, sz: BvWidth, tight: bool) -> Self {
        debug_assert!((1..=64).contains(&sz), "width {sz} out of range");
        let mask = max_value(sz);
        let mut low = low & mask;
        let mut high = high & mask;
        // canonicalize: a wrapped interval with low == high + 1 covers everything
        if low > high && low == high + 1 {
            low = 0;
            high = mask;
        }
        Self {
            low,
            high,
            sz,
            tight,
        }
    }

    /// Full range for `sz`, marked non-tight.
    ///
    /// Exact (tight) full intervals only arise from extraction, e.g.
    /// `x ≤u 2^sz - 1`.
    #[must_use]
    pub fn full(sz: BvWidth) -> Self {
        Self::new(0, max_value(sz), sz, false)
    }

    /// Singleton interval `[value, value]`, tight.
    #[must_use]
    pub fn point(value: u64, sz: BvWidth) -> Self {
        Self::new(value, value, sz, true)
    }

    /// Whether the interval covers every value of its width.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.low == 0 && self.high == max_value(self.sz)
    }

    /// Whether the interval wraps around zero.
    #[must_use]
    pub fn is_wrapped(&self) -> bool {
        self.low > self.high
    }

    /// Whether the interval contains exactly one value.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.low == self.high
    }

    /// Whether `value` lies in the interval.
    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        if self.is_wrapped() {
            value >= self.low || value <= self.high
        } else {
            value >= self.low && value <= self.high
        }
    }

    /// Whether every value in `self` also lies in `other` (set inclusion).
    #[must_use]
    pub fn implies(&self, other: &Interval) -> bool {
        if other.is_full() {
            return true;
        }
        if self.is_full() {
            return false;
        }
        if self.is_wrapped() {
            // a wrapped set fits in a wrapped superset only
            other.is_wrapped() && self.high <= other.high && self.low >= other.low
        } else if other.is_wrapped() {
            // contiguous range inside [0, other.high] or inside [other.low, max]
            self.high <= other.high || self.low >= other.low
        } else {
            self.low >= other.low && self.high <= other.high
        }
    }

    /// Intersect two intervals of the same width. `None` means the
    /// intersection is empty (the conjunction is unsatisfiable).
    ///
    /// When both operands wrap, the result may over-approximate the true
    /// intersection (which can have two gaps and is not an interval); it is
    /// always a superset, so emptiness reports are exact.
    #[must_use]
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        debug_assert_eq!(self.sz, other.sz);
        if self.is_full() || self == other {
            return Some(*other);
        }
        if other.is_full() {
            return Some(*self);
        }

        if self.is_wrapped() {
            if other.is_wrapped() {
                if self.high >= other.low {
                    Some(*other)
                } else if other.high >= self.low {
                    Some(*self)
                } else {
                    Some(Interval::new(
                        self.low.max(other.low),
                        self.high.min(other.high),
                        self.sz,
                        false,
                    ))
                }
            } else {
                other.intersect(self)
            }
        } else if other.is_wrapped() {
            // ... other.high ... low ... high ... other.low ...
            if self.high < other.low && self.low > other.high {
                return None;
            }
            if self.high >= other.low && self.low <= other.high {
                Some(*other)
            } else if self.high >= other.low {
                Some(Interval::new(other.low, self.high, self.sz, false))
            } else {
                // ... low ... other.high ... high ... other.low ...
                Some(Interval::new(
                    self.low,
                    self.high.min(other.high),
                    self.sz,
                    false,
                ))
            }
        } else {
            if self.low > other.high || self.high < other.low {
                return None;
            }
            Some(Interval::new(
                self.low.max(other.low),
                self.high.min(other.high),
                self.sz,
                self.tight && other.tight,
            ))
        }
    }

    /// Complement of the interval. `None` means the complement is empty
    /// (the interval is full and exact, so its negation is unsatisfiable).
    ///
    /// A non-tight interval cannot be negated precisely; the result is the
    /// full range for the same width, still marked non-tight. A tight
    /// interval negates exactly, and the complement is again tight.
    #[must_use]
    pub fn negate(&self) -> Option<Interval> {
        if !self.tight {
            return Some(Interval::full(self.sz));
        }
        if self.is_full() {
            return None;
        }
        let max = max_value(self.sz);
        Some(if self.low == 0 {
            Interval::new(self.high + 1, max, self.sz, true)
        } else if self.high == max {
            Interval::new(0, self.low - 1, self.sz, true)
        } else {
            Interval::new(self.high + 1, self.low - 1, self.sz, true)
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}
