//! Contextual bit-vector bounds simplification.
//!
//! Tracks, per term, the tightest interval implied by the currently asserted
//! conjunction, and uses it to rewrite other constraints to `true`, `false`,
//! a numeral, or a stronger equality. The driver asserts literals top-down,
//! queries [`ContextSimplifier::simplify`] bottom-up on nodes that pass the
//! [`ContextSimplifier::may_simplify`] pre-filter, and rolls the context back
//! on backtracking with [`ContextSimplifier::pop`].
//!
//! Bounds are tracked against arbitrary non-numeral bit-vector terms, not
//! only variables: `(bvadd x y) ≤u 5` bounds the term `(bvadd x y)`.
//!
//! ## References
//!
//! - Z3's `tactic/bv/bv_bounds_tactic.cpp` and `tactic/core/ctx_simplify_tactic.cpp`

use crate::ast::{TermId, TermKind, TermManager};
use crate::interval::{max_value, Interval};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::trace;

/// Outcome of asserting a literal into the bound context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AssertOutcome {
    /// The literal is consistent with the current context.
    Consistent,
    /// The literal contradicts the current context; the enclosing branch is
    /// unsatisfiable and should be pruned.
    Contradiction,
}

/// Contextual simplifier interface consumed by a generic context-aware
/// simplification driver.
///
/// Scope accounting is caller-driven: the undo log counts *tightening
/// events*, not `assert_expr` calls, since an assertion that is a no-op (no
/// recognized bound, or a bound already implied) logs nothing. The driver
/// must remember [`scope_level`](ContextSimplifier::scope_level) at its own
/// checkpoints and pass the difference to [`pop`](ContextSimplifier::pop);
/// no symbolic checkpoint tokens are issued.
pub trait ContextSimplifier {
    /// Assert the literal `t` (negated when `sign` is true) into the
    /// context. Returns [`AssertOutcome::Contradiction`] when the literal
    /// makes the asserted conjunction unsatisfiable.
    fn assert_expr(&mut self, tm: &TermManager, t: TermId, sign: bool) -> AssertOutcome;

    /// Try to rewrite `t` under the current context. `None` means no
    /// rewrite applies.
    fn simplify(&mut self, tm: &mut TermManager, t: TermId) -> Option<TermId>;

    /// Cheap pre-filter for [`simplify`](ContextSimplifier::simplify). May
    /// over-approximate (return true when no rewrite will be found) but
    /// never under-approximates.
    fn may_simplify(&mut self, tm: &TermManager, t: TermId) -> bool;

    /// Undo the last `num_scopes` tightening events.
    fn pop(&mut self, num_scopes: usize);

    /// Number of tightening events currently logged.
    fn scope_level(&self) -> usize;

    /// Independent simplifier for reuse in another expression context,
    /// retaining only configuration.
    fn translate(&self) -> Box<dyn ContextSimplifier>;
}

/// Configuration for the bounds simplifier.
#[derive(Debug, Clone, Default)]
pub struct BvBoundsConfig {
    /// (default: false) propagate equalities from inequalities: a bound
    /// whose contextual intersection pins the term to a single value is
    /// rewritten into an explicit equality.
    pub propagate_eq: bool,
}

/// Statistics for the bounds simplifier.
#[derive(Debug, Clone, Default)]
pub struct BvBoundsStats {
    /// Bound atoms asserted into the context.
    pub bounds_asserted: u64,
    /// Tightening events logged (fresh entries included).
    pub bounds_tightened: u64,
    /// Contradictions detected during assertion.
    pub contradictions: u64,
    /// Rewrites produced by `simplify`.
    pub rewrites: u64,
    /// Pop operations that undid at least one tightening event.
    pub pops: u64,
}

/// Undo record for one tightening event.
#[derive(Debug, Clone)]
struct UndoBound {
    /// Term whose interval changed.
    term: TermId,
    /// Interval before the change; `None` when the entry was freshly created.
    prev: Option<Interval>,
}

/// Recognize `t` as a bound atom and extract the bounded term with its
/// interval. The recognized shapes, each with exactly one numeral side:
///
/// | shape      | interval                  |
/// |------------|---------------------------|
/// | `C ≤u x`   | `[C, 2^sz - 1]`           |
/// | `x ≤u C`   | `[0, C]`                  |
/// | `C ≤s x`   | `[C, 2^(sz-1) - 1]`       |
/// | `x ≤s C`   | `[2^(sz-1), C]`           |
/// | `C = x`, `x = C` | `[C, C]`            |
///
/// All extracted intervals are tight. Signed bounds use the two's-complement
/// encoding of the signed extremes, so they become (possibly wrap-around)
/// unsigned intervals. A comparison of two numerals is a non-match.
#[must_use]
pub fn extract_bound(tm: &TermManager, t: TermId) -> Option<(TermId, Interval)> {
    match &tm.get(t)?.kind {
        &TermKind::BvUle(lhs, rhs) => {
            if let Some((n, sz)) = tm.numeral(lhs) {
                // C ule x  <=>  x uge C
                if tm.is_numeral(rhs) {
                    return None;
                }
                Some((rhs, Interval::new(n, max_value(sz), sz, true)))
            } else if let Some((n, sz)) = tm.numeral(rhs) {
                Some((lhs, Interval::new(0, n, sz, true)))
            } else {
                None
            }
        }
        &TermKind::BvSle(lhs, rhs) => {
            if let Some((n, sz)) = tm.numeral(lhs) {
                // C sle x  <=>  x sge C: up to the signed maximum
                if tm.is_numeral(rhs) {
                    return None;
                }
                Some((rhs, Interval::new(n, (1u64 << (sz - 1)) - 1, sz, true)))
            } else if let Some((n, sz)) = tm.numeral(rhs) {
                // x sle C: down to the signed minimum
                Some((lhs, Interval::new(1u64 << (sz - 1), n, sz, true)))
            } else {
                None
            }
        }
        &TermKind::Eq(lhs, rhs) => {
            if let Some((n, sz)) = tm.numeral(lhs) {
                if tm.is_numeral(rhs) {
                    return None;
                }
                Some((rhs, Interval::new(n, n, sz, true)))
            } else if let Some((n, sz)) = tm.numeral(rhs) {
                Some((lhs, Interval::new(n, n, sz, true)))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn strip_not(tm: &TermManager, mut t: TermId, mut sign: bool) -> (TermId, bool) {
    while let Some(&TermKind::Not(inner)) = tm.get(t).map(|term| &term.kind) {
        t = inner;
        sign = !sign;
    }
    (t, sign)
}

/// Contextual bounds simplifier over bit-vector constraints.
///
/// The memo caches are keyed by term id and are never invalidated by scope
/// operations: the term graph is immutable for the simplifier's lifetime.
/// Use [`BvBoundsSimplifier::translate`] to start over against a different
/// term context.
#[derive(Debug, Clone, Default)]
pub struct BvBoundsSimplifier {
    config: BvBoundsConfig,
    stats: BvBoundsStats,
    /// Current interval per tracked term.
    bound: FxHashMap<TermId, Interval>,
    /// Undo log; one entry per tightening event.
    scopes: Vec<UndoBound>,
    /// Memoized set of non-numeral subterms per term.
    expr_vars: FxHashMap<TermId, Rc<FxHashSet<TermId>>>,
    /// Memoized "subtree contains a bound atom" per term.
    bound_exprs: FxHashMap<TermId, bool>,
}

impl BvBoundsSimplifier {
    /// Create a simplifier with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simplifier with the given configuration.
    #[must_use]
    pub fn with_config(config: BvBoundsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &BvBoundsConfig {
        &self.config
    }

    /// Statistics accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &BvBoundsStats {
        &self.stats
    }

    /// Independent simplifier retaining only configuration: empty bound
    /// context, empty caches, zero scope level.
    #[must_use]
    pub fn translate(&self) -> Self {
        Self::with_config(self.config.clone())
    }

    /// Set of non-numeral subterms of `t`, memoized by term id.
    fn term_vars(&mut self, tm: &TermManager, t: TermId) -> Rc<FxHashSet<TermId>> {
        if let Some(set) = self.expr_vars.get(&t) {
            return Rc::clone(set);
        }
        let mut set = FxHashSet::default();
        if !tm.is_numeral(t) {
            set.insert(t);
        }
        for child in tm.children(t) {
            let child_vars = self.term_vars(tm, child);
            set.extend(child_vars.iter().copied());
        }
        let set = Rc::new(set);
        self.expr_vars.insert(t, Rc::clone(&set));
        set
    }

    /// Whether the subtree of `t` contains a comparison or equality with a
    /// numeral argument, memoized by term id.
    fn has_bound_atom(&mut self, tm: &TermManager, t: TermId) -> bool {
        if let Some(&cached) = self.bound_exprs.get(&t) {
            return cached;
        }
        let children = tm.children(t);
        let mut found = matches!(
            tm.get(t).map(|term| &term.kind),
            Some(TermKind::Eq(..) | TermKind::BvUle(..) | TermKind::BvSle(..))
        ) && children.iter().any(|&child| tm.is_numeral(child));
        for &child in &children {
            if found {
                break;
            }
            found = self.has_bound_atom(tm, child);
        }
        self.bound_exprs.insert(t, found);
        found
    }
}

impl ContextSimplifier for BvBoundsSimplifier {
    fn assert_expr(&mut self, tm: &TermManager, t: TermId, sign: bool) -> AssertOutcome {
        let (t, sign) = strip_not(tm, t, sign);
        let Some((term, bound)) = extract_bound(tm, t) else {
            return AssertOutcome::Consistent;
        };
        let bound = if sign {
            match bound.negate() {
                Some(negated) => negated,
                None => {
                    self.stats.contradictions += 1;
                    return AssertOutcome::Contradiction;
                }
            }
        } else {
            bound
        };
        self.stats.bounds_asserted += 1;
        trace!(term = ?term, interval = %bound, negated = sign, "assert bound");

        if let Some(current) = self.bound.get_mut(&term) {
            let Some(tightened) = current.intersect(&bound) else {
                self.stats.contradictions += 1;
                return AssertOutcome::Contradiction;
            };
            if tightened == *current {
                // already implied, nothing to log
                return AssertOutcome::Consistent;
            }
            self.scopes.push(UndoBound {
                term,
                prev: Some(*current),
            });
            *current = tightened;
            self.stats.bounds_tightened += 1;
        } else {
            self.bound.insert(term, bound);
            self.scopes.push(UndoBound { term, prev: None });
            self.stats.bounds_tightened += 1;
        }
        AssertOutcome::Consistent
    }

    fn simplify(&mut self, tm: &mut TermManager, t: TermId) -> Option<TermId> {
        // a tracked term pinned to a single value rewrites to that numeral,
        // whatever its sort or surrounding boolean structure
        if let Some(&bound) = self.bound.get(&t) {
            if bound.is_singleton() {
                if let Some(width) = tm.bv_width(t) {
                    self.stats.rewrites += 1;
                    return tm.mk_bv_numeral(bound.low, width).ok();
                }
            }
        }

        if !tm.is_bool(t) {
            return None;
        }

        let (t, mut sign) = strip_not(tm, t, false);
        let (term, mut bound) = extract_bound(tm, t)?;

        if sign && bound.tight {
            sign = false;
            match bound.negate() {
                Some(negated) => bound = negated,
                None => {
                    self.stats.rewrites += 1;
                    return Some(tm.mk_false());
                }
            }
        }

        let mut result = None;
        if bound.is_full() && bound.tight {
            // tautology, independent of context
            result = Some(tm.mk_true());
        } else if let Some(&ctx) = self.bound.get(&term) {
            if ctx.implies(&bound) {
                result = Some(tm.mk_true());
            } else if let Some(intersection) = bound.intersect(&ctx) {
                if self.config.propagate_eq && intersection.is_singleton() {
                    let width = tm.bv_width(term)?;
                    let value = tm.mk_bv_numeral(intersection.low, width).ok()?;
                    result = tm.mk_eq(term, value).ok();
                }
            } else {
                result = Some(tm.mk_false());
            }
        }

        let result = result?;
        self.stats.rewrites += 1;
        trace!(term = ?t, rewritten = ?result, "context rewrite");
        Some(if sign { tm.mk_not(result) } else { result })
    }

    fn may_simplify(&mut self, tm: &TermManager, t: TermId) -> bool {
        if tm.is_numeral(t) {
            return false;
        }
        let (t, _) = strip_not(tm, t, false);

        let vars = self.term_vars(tm, t);
        for (term, bound) in &self.bound {
            if bound.is_singleton() && vars.contains(term) {
                return true;
            }
        }

        // common case: a single bound atom with no context to weigh it against
        if let Some((term, bound)) = extract_bound(tm, t) {
            return bound.is_full() || self.bound.contains_key(&term);
        }
        self.has_bound_atom(tm, t)
    }

    fn pop(&mut self, num_scopes: usize) {
        if self.scopes.is_empty() {
            return;
        }
        self.stats.pops += 1;
        trace!(num_scopes, "pop");
        let target = self.scopes.len().saturating_sub(num_scopes);
        if target == 0 {
            // back at the base of the log: drop everything at once
            self.bound.clear();
            self.scopes.clear();
            return;
        }
        for undo in self.scopes.drain(target..).rev() {
            match undo.prev {
                Some(prev) => {
                    self.bound.insert(undo.term, prev);
                }
                None => {
                    self.bound.remove(&undo.term);
                }
            }
        }
    }

    fn scope_level(&self) -> usize {
        self.scopes.len()
    }

    fn translate(&self) -> Box<dyn ContextSimplifier> {
        Box::new(BvBoundsSimplifier::translate(self))
    }
}
