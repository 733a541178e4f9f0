//! End-to-end scenarios for the contextual bounds simplifier.
//!
//! Each test plays the role of the external driver: assert literals
//! top-down, query candidate rewrites, and pop on backtrack.

use bv_bounds::{
    extract_bound, AssertOutcome, BvBoundsConfig, BvBoundsSimplifier, ContextSimplifier, Interval,
    TermManager,
};

#[test]
fn implied_bound_rewrites_to_true() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let five = tm.mk_bv_numeral(5, 4).unwrap();
    let ten = tm.mk_bv_numeral(10, 4).unwrap();
    let le5 = tm.mk_bvule(x, five).unwrap();
    let le10 = tm.mk_bvule(x, ten).unwrap();

    let mut s = BvBoundsSimplifier::new();
    assert_eq!(s.assert_expr(&tm, le5, false), AssertOutcome::Consistent);

    assert!(s.may_simplify(&tm, le10));
    let t = tm.mk_true();
    assert_eq!(s.simplify(&mut tm, le10), Some(t));
}

#[test]
fn conflicting_bounds_report_contradiction() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let five = tm.mk_bv_numeral(5, 4).unwrap();
    let eight = tm.mk_bv_numeral(8, 4).unwrap();
    let le5 = tm.mk_bvule(x, five).unwrap();
    let ge8 = tm.mk_bvule(eight, x).unwrap();

    let mut s = BvBoundsSimplifier::new();
    assert_eq!(s.assert_expr(&tm, le5, false), AssertOutcome::Consistent);
    // [0, 5] and [8, 15] are disjoint
    assert_eq!(s.assert_expr(&tm, ge8, false), AssertOutcome::Contradiction);
}

#[test]
fn pinned_term_rewrites_to_numeral() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let three = tm.mk_bv_numeral(3, 4).unwrap();
    let eq = tm.mk_eq(x, three).unwrap();

    let mut s = BvBoundsSimplifier::new();
    assert_eq!(s.assert_expr(&tm, eq, false), AssertOutcome::Consistent);

    // the bare (non-boolean) term x rewrites to its value
    assert!(s.may_simplify(&tm, x));
    assert_eq!(s.simplify(&mut tm, x), Some(three));
}

#[test]
fn propagate_eq_strengthens_bound_to_equality() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let five = tm.mk_bv_numeral(5, 4).unwrap();
    let ge5 = tm.mk_bvule(five, x).unwrap();
    let le5 = tm.mk_bvule(x, five).unwrap();

    let mut s = BvBoundsSimplifier::with_config(BvBoundsConfig { propagate_eq: true });
    // context: x in [5, 15]
    assert_eq!(s.assert_expr(&tm, ge5, false), AssertOutcome::Consistent);

    // x <= 5 intersected with the context pins x to 5: strengthen to x = 5
    let expected = tm.mk_eq(x, five).unwrap();
    assert_eq!(s.simplify(&mut tm, le5), Some(expected));
}

#[test]
fn propagate_eq_does_not_preempt_implied_bounds() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let five = tm.mk_bv_numeral(5, 4).unwrap();
    let seven = tm.mk_bv_numeral(7, 4).unwrap();
    let le5 = tm.mk_bvule(x, five).unwrap();
    let ge5 = tm.mk_bvule(five, x).unwrap();
    let le7 = tm.mk_bvule(x, seven).unwrap();

    let mut s = BvBoundsSimplifier::with_config(BvBoundsConfig { propagate_eq: true });
    assert_eq!(s.assert_expr(&tm, le5, false), AssertOutcome::Consistent);
    assert_eq!(s.assert_expr(&tm, ge5, false), AssertOutcome::Consistent);

    // context [5, 5] implies x <= 7 outright; implication wins over
    // equality propagation
    let t = tm.mk_true();
    assert_eq!(s.simplify(&mut tm, le7), Some(t));
}

#[test]
fn pop_erases_context() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let nine = tm.mk_bv_numeral(9, 4).unwrap();
    let five = tm.mk_bv_numeral(5, 4).unwrap();
    let le9 = tm.mk_bvule(x, nine).unwrap();
    let le5 = tm.mk_bvule(x, five).unwrap();

    let mut s = BvBoundsSimplifier::new();
    let base = s.scope_level();
    assert_eq!(s.assert_expr(&tm, le9, false), AssertOutcome::Consistent);
    assert_eq!(s.assert_expr(&tm, le5, false), AssertOutcome::Consistent);
    assert_eq!(s.scope_level() - base, 2);

    s.pop(2);
    assert_eq!(s.scope_level(), 0);

    // no context left: bounds on x no longer rewrite
    assert_eq!(s.simplify(&mut tm, le5), None);
    assert_eq!(s.simplify(&mut tm, le9), None);
}

#[test]
fn signed_bounds_work_through_wrap_around() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let three = tm.mk_bv_numeral(3, 4).unwrap();
    let five = tm.mk_bv_numeral(5, 4).unwrap();
    let sle3 = tm.mk_bvsle(x, three).unwrap();
    let sle5 = tm.mk_bvsle(x, five).unwrap();

    let mut s = BvBoundsSimplifier::new();
    // x <=s 3 puts x in the wrap-around interval [8, 3]
    assert_eq!(s.assert_expr(&tm, sle3, false), AssertOutcome::Consistent);

    // [8, 3] is contained in [8, 5], so x <=s 5 is implied
    let t = tm.mk_true();
    assert_eq!(s.simplify(&mut tm, sle5), Some(t));
}

#[test]
fn contradicted_query_rewrites_to_false() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 8).unwrap();
    let ten = tm.mk_bv_numeral(10, 8).unwrap();
    let twenty = tm.mk_bv_numeral(20, 8).unwrap();
    let le10 = tm.mk_bvule(x, ten).unwrap();
    let ge20 = tm.mk_bvule(twenty, x).unwrap();

    let mut s = BvBoundsSimplifier::new();
    assert_eq!(s.assert_expr(&tm, le10, false), AssertOutcome::Consistent);

    let f = tm.mk_false();
    assert_eq!(s.simplify(&mut tm, ge20), Some(f));
}

#[test]
fn singleton_enables_prefilter_on_non_atoms() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let y = tm.mk_bv_var("y", 4).unwrap();
    let three = tm.mk_bv_numeral(3, 4).unwrap();
    let eq_xy = tm.mk_eq(x, y).unwrap();

    let mut s = BvBoundsSimplifier::new();
    // pin x to 3: x = y is not a bound atom, but it mentions x, so the
    // pre-filter must let it through for bottom-up rewriting
    let eq_x3 = tm.mk_eq(x, three).unwrap();
    assert_eq!(s.assert_expr(&tm, eq_x3, false), AssertOutcome::Consistent);

    assert!(s.may_simplify(&tm, eq_xy));
    // the atom itself is not decided; the driver rewrites x bottom-up
    assert_eq!(s.simplify(&mut tm, x), Some(three));
}

#[test]
fn extraction_is_deterministic() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 8).unwrap();

    // rebuild each recognized shape from its own extraction and re-extract
    let c = tm.mk_bv_numeral(42, 8).unwrap();
    let shapes = [
        tm.mk_bvule(c, x).unwrap(),
        tm.mk_bvule(x, c).unwrap(),
        tm.mk_bvsle(c, x).unwrap(),
        tm.mk_bvsle(x, c).unwrap(),
        tm.mk_eq(c, x).unwrap(),
        tm.mk_eq(x, c).unwrap(),
    ];

    for atom in shapes {
        let (term, bound) = extract_bound(&tm, atom).expect("recognized shape");
        assert_eq!(term, x);
        let again = extract_bound(&tm, atom).expect("recognized shape");
        assert_eq!(again, (term, bound));
        assert!(bound.tight);
    }
}

#[test]
fn translated_simplifier_reuses_configuration_only() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let five = tm.mk_bv_numeral(5, 4).unwrap();
    let ge5 = tm.mk_bvule(five, x).unwrap();
    let le5 = tm.mk_bvule(x, five).unwrap();

    let mut s = BvBoundsSimplifier::with_config(BvBoundsConfig { propagate_eq: true });
    assert_eq!(s.assert_expr(&tm, ge5, false), AssertOutcome::Consistent);

    let mut fresh = ContextSimplifier::translate(&s);
    assert_eq!(fresh.scope_level(), 0);
    // no context carried over
    assert_eq!(fresh.simplify(&mut tm, le5), None);

    // configuration survives: equality propagation still fires
    assert_eq!(fresh.assert_expr(&tm, ge5, false), AssertOutcome::Consistent);
    let expected = tm.mk_eq(x, five).unwrap();
    assert_eq!(fresh.simplify(&mut tm, le5), Some(expected));
}

#[test]
fn undo_log_counts_tightening_events_not_asserts() {
    let mut tm = TermManager::new();
    let x = tm.mk_bv_var("x", 4).unwrap();
    let nine = tm.mk_bv_numeral(9, 4).unwrap();
    let twelve = tm.mk_bv_numeral(12, 4).unwrap();
    let le9 = tm.mk_bvule(x, nine).unwrap();
    let le12 = tm.mk_bvule(x, twelve).unwrap();

    let mut s = BvBoundsSimplifier::new();
    assert_eq!(s.assert_expr(&tm, le9, false), AssertOutcome::Consistent);
    // x <= 12 is implied by x <= 9: asserted, but no tightening logged
    assert_eq!(s.assert_expr(&tm, le12, false), AssertOutcome::Consistent);
    assert_eq!(s.scope_level(), 1);

    s.pop(1);
    assert_eq!(s.scope_level(), 0);
    assert_eq!(s.simplify(&mut tm, le9), None);
}

#[test]
fn interval_reexports_are_usable() {
    // the public algebra composes outside the simplifier
    let a = Interval::new(0, 5, 4, true);
    let b = Interval::new(8, 15, 4, true);
    assert_eq!(a.intersect(&b), None);
    assert_eq!(a.negate(), Some(Interval::new(6, 15, 4, true)));
}
