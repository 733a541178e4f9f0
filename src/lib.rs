//! Contextual bit-vector bounds simplification for SMT preprocessing.
//!
//! Given a stack of asserted boolean constraints over fixed-width
//! bit-vectors, this crate tracks, per term, the tightest known value range
//! implied by the asserted conjunction, and uses it to rewrite other
//! constraints to `true`, `false`, a numeral, or a stronger equality.
//! Ranges are modular (wrap-around) unsigned intervals, so signed bounds
//! fall out of the same representation.
//!
//! The crate provides:
//! - [`Interval`]: wrap-around interval algebra over `1..=64` bit widths
//! - [`extract_bound`]: recognition of bound atoms (`≤u`, `≤s`, `=` against
//!   a numeral)
//! - [`BvBoundsSimplifier`]: the scoped bound context with assert, query,
//!   and pop, behind the [`ContextSimplifier`] trait consumed by a generic
//!   context-simplification driver
//! - [`TermManager`]: arena-allocated, hash-consed terms with stable
//!   [`TermId`] handles
//!
//! # Examples
//!
//! ```
//! use bv_bounds::{AssertOutcome, BvBoundsSimplifier, ContextSimplifier, TermManager};
//!
//! let mut tm = TermManager::new();
//! let x = tm.mk_bv_var("x", 4)?;
//! let five = tm.mk_bv_numeral(5, 4)?;
//! let ten = tm.mk_bv_numeral(10, 4)?;
//! let le5 = tm.mk_bvule(x, five)?;
//! let le10 = tm.mk_bvule(x, ten)?;
//!
//! let mut simplifier = BvBoundsSimplifier::new();
//! assert_eq!(simplifier.assert_expr(&tm, le5, false), AssertOutcome::Consistent);
//!
//! // x <= 10 is implied by x <= 5
//! assert!(simplifier.may_simplify(&tm, le10));
//! let rewritten = simplifier.simplify(&mut tm, le10);
//! assert_eq!(rewritten, Some(tm.mk_true()));
//! # Ok::<(), bv_bounds::BvBoundsError>(())
//! ```
//!
//! ## References
//!
//! - Z3's `tactic/bv/bv_bounds_tactic.cpp`

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod interval;
pub mod simplifier;

pub use ast::{Sort, Term, TermId, TermKind, TermManager};
pub use error::{BvBoundsError, Result};
pub use interval::{max_value, BvWidth, Interval};
pub use simplifier::{
    extract_bound, AssertOutcome, BvBoundsConfig, BvBoundsSimplifier, BvBoundsStats,
    ContextSimplifier,
};
