//! Arena-allocated terms with interned [`TermId`] handles.
//!
//! The simplifier never owns the expression tree it works on; terms live in
//! a [`TermManager`] and are referenced by stable ids. Terms are hash-consed,
//! so structurally identical terms share a single [`TermId`]. This is what
//! gives the simplifier's memo caches a stable node identity, and it makes
//! the term graph acyclic by construction (children always have smaller ids).
//!
//! Only the fragment the bounds simplifier consumes is provided: bit-vector
//! variables and numerals, the comparisons `bvule`/`bvsle`/`=`, and the
//! boolean connectives `not`/`and`/`or` plus the constants `true`/`false`.

use crate::error::{BvBoundsError, Result};
use crate::interval::{max_value, BvWidth};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// Identifier of an interned term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    /// Create a term id from a raw index.
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index of this id.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Sort of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Boolean sort.
    Bool,
    /// Bit-vector sort of the given width.
    BitVec(BvWidth),
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::BitVec(width) => write!(f, "(_ BitVec {width})"),
        }
    }
}

/// Structure of a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Boolean constant `true`.
    True,
    /// Boolean constant `false`.
    False,
    /// Uninterpreted constant.
    Var {
        /// Symbol name.
        name: String,
        /// Sort of the variable.
        sort: Sort,
    },
    /// Bit-vector numeral.
    BvNumeral {
        /// Value, masked to `width` bits.
        value: u64,
        /// Width in bits.
        width: BvWidth,
    },
    /// Logical negation.
    Not(TermId),
    /// Conjunction.
    And(SmallVec<[TermId; 2]>),
    /// Disjunction.
    Or(SmallVec<[TermId; 2]>),
    /// Equality.
    Eq(TermId, TermId),
    /// Unsigned less-or-equal on bit-vectors.
    BvUle(TermId, TermId),
    /// Signed less-or-equal on bit-vectors.
    BvSle(TermId, TermId),
}

/// An interned term: structure plus sort.
#[derive(Debug, Clone)]
pub struct Term {
    /// Structure of the term.
    pub kind: TermKind,
    /// Sort of the term.
    pub sort: Sort,
}

impl Term {
    /// Immediate children of this term.
    #[must_use]
    pub fn children(&self) -> SmallVec<[TermId; 2]> {
        match &self.kind {
            TermKind::True | TermKind::False | TermKind::Var { .. } | TermKind::BvNumeral { .. } => {
                smallvec![]
            }
            TermKind::Not(arg) => smallvec![*arg],
            TermKind::Eq(lhs, rhs) | TermKind::BvUle(lhs, rhs) | TermKind::BvSle(lhs, rhs) => {
                smallvec![*lhs, *rhs]
            }
            TermKind::And(args) | TermKind::Or(args) => args.clone(),
        }
    }
}

/// Arena of hash-consed terms.
#[derive(Debug, Clone, Default)]
pub struct TermManager {
    terms: Vec<Term>,
    interned: FxHashMap<TermKind, TermId>,
}

fn check_width(width: BvWidth) -> Result<()> {
    if (1..=64).contains(&width) {
        Ok(())
    } else {
        Err(BvBoundsError::InvalidWidth(width))
    }
}

impl TermManager {
    /// Create an empty term manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, kind: TermKind, sort: Sort) -> TermId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.terms.push(Term {
            kind: kind.clone(),
            sort,
        });
        self.interned.insert(kind, id);
        id
    }

    /// Boolean constant `true`.
    pub fn mk_true(&mut self) -> TermId {
        self.intern(TermKind::True, Sort::Bool)
    }

    /// Boolean constant `false`.
    pub fn mk_false(&mut self) -> TermId {
        self.intern(TermKind::False, Sort::Bool)
    }

    /// Boolean variable.
    pub fn mk_bool_var(&mut self, name: &str) -> TermId {
        self.intern(
            TermKind::Var {
                name: name.to_string(),
                sort: Sort::Bool,
            },
            Sort::Bool,
        )
    }

    /// Bit-vector variable of the given width.
    pub fn mk_bv_var(&mut self, name: &str, width: BvWidth) -> Result<TermId> {
        check_width(width)?;
        let sort = Sort::BitVec(width);
        Ok(self.intern(
            TermKind::Var {
                name: name.to_string(),
                sort,
            },
            sort,
        ))
    }

    /// Bit-vector numeral; `value` is masked to `width` bits.
    pub fn mk_bv_numeral(&mut self, value: u64, width: BvWidth) -> Result<TermId> {
        check_width(width)?;
        Ok(self.intern(
            TermKind::BvNumeral {
                value: value & max_value(width),
                width,
            },
            Sort::BitVec(width),
        ))
    }

    /// Logical negation.
    pub fn mk_not(&mut self, arg: TermId) -> TermId {
        self.intern(TermKind::Not(arg), Sort::Bool)
    }

    /// Conjunction.
    pub fn mk_and(&mut self, args: Vec<TermId>) -> TermId {
        self.intern(TermKind::And(args.into_iter().collect()), Sort::Bool)
    }

    /// Disjunction.
    pub fn mk_or(&mut self, args: Vec<TermId>) -> TermId {
        self.intern(TermKind::Or(args.into_iter().collect()), Sort::Bool)
    }

    /// Equality between two terms of the same sort.
    pub fn mk_eq(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId> {
        let left = self.sort(lhs).ok_or(BvBoundsError::UnknownTerm(lhs))?;
        let right = self.sort(rhs).ok_or(BvBoundsError::UnknownTerm(rhs))?;
        if left != right {
            return Err(BvBoundsError::SortMismatch { left, right });
        }
        Ok(self.intern(TermKind::Eq(lhs, rhs), Sort::Bool))
    }

    /// Unsigned less-or-equal between two bit-vectors of the same width.
    pub fn mk_bvule(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId> {
        self.check_bv_pair(lhs, rhs)?;
        Ok(self.intern(TermKind::BvUle(lhs, rhs), Sort::Bool))
    }

    /// Signed less-or-equal between two bit-vectors of the same width.
    pub fn mk_bvsle(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId> {
        self.check_bv_pair(lhs, rhs)?;
        Ok(self.intern(TermKind::BvSle(lhs, rhs), Sort::Bool))
    }

    fn check_bv_pair(&self, lhs: TermId, rhs: TermId) -> Result<()> {
        let left = self.sort(lhs).ok_or(BvBoundsError::UnknownTerm(lhs))?;
        let right = self.sort(rhs).ok_or(BvBoundsError::UnknownTerm(rhs))?;
        match (left, right) {
            (Sort::BitVec(a), Sort::BitVec(b)) if a == b => Ok(()),
            (Sort::BitVec(_), Sort::BitVec(_)) => Err(BvBoundsError::SortMismatch { left, right }),
            (Sort::BitVec(_), other) | (other, _) => Err(BvBoundsError::NotBitVector(other)),
        }
    }

    /// Look up a term by id.
    #[must_use]
    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.index())
    }

    /// Sort of a term.
    #[must_use]
    pub fn sort(&self, id: TermId) -> Option<Sort> {
        self.get(id).map(|term| term.sort)
    }

    /// Whether the term has boolean sort.
    #[must_use]
    pub fn is_bool(&self, id: TermId) -> bool {
        matches!(self.sort(id), Some(Sort::Bool))
    }

    /// Width of a bit-vector term.
    #[must_use]
    pub fn bv_width(&self, id: TermId) -> Option<BvWidth> {
        match self.sort(id)? {
            Sort::BitVec(width) => Some(width),
            Sort::Bool => None,
        }
    }

    /// Value and width of a bit-vector numeral.
    #[must_use]
    pub fn numeral(&self, id: TermId) -> Option<(u64, BvWidth)> {
        match self.get(id)?.kind {
            TermKind::BvNumeral { value, width } => Some((value, width)),
            _ => None,
        }
    }

    /// Whether the term is a bit-vector numeral.
    #[must_use]
    pub fn is_numeral(&self, id: TermId) -> bool {
        self.numeral(id).is_some()
    }

    /// Immediate children of a term; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: TermId) -> SmallVec<[TermId; 2]> {
        self.get(id).map(Term::children).unwrap_or_default()
    }

    /// Number of interned terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no terms have been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
