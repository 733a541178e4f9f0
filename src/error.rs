//! Error types for term construction.
//!
//! Contradictions, empty intersections, and unrecognized constraint shapes
//! are *not* errors; they are ordinary return values
//! ([`AssertOutcome`](crate::simplifier::AssertOutcome) and `Option`).
//! Errors here cover only malformed inputs at the term-construction seam.

use crate::ast::{Sort, TermId};
use crate::interval::BvWidth;
use thiserror::Error;

/// Error type for term construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BvBoundsError {
    /// Bit-vector width outside the supported `1..=64` range.
    #[error("invalid bit-vector width {0}: supported widths are 1..=64")]
    InvalidWidth(BvWidth),
    /// Operands of a comparison or equality have different sorts.
    #[error("sort mismatch: {left} vs {right}")]
    SortMismatch {
        /// Sort of the left operand.
        left: Sort,
        /// Sort of the right operand.
        right: Sort,
    },
    /// Operand of a bit-vector comparison is not a bit-vector term.
    #[error("expected a bit-vector operand, found sort {0}")]
    NotBitVector(Sort),
    /// Term id does not belong to this term manager.
    #[error("unknown term id {0:?}")]
    UnknownTerm(TermId),
}

/// Result type for term construction.
pub type Result<T> = std::result::Result<T, BvBoundsError>;
