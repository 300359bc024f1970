//! Pairwise union and intersection of clauses
//!
//! Both operations require well-formed clauses (at most one lower and one
//! upper comparator) and return `Ok(None)` when the clauses share no version.

use std::cmp::Ordering;

use crate::range::clause::{ensure_well_formed, lower_bound, min_satisfying, upper_bound};
use crate::range::error::RangeError;
use crate::range::semver::VersionLibrary;
use crate::range::types::Clause;

/// Merge two overlapping clauses into the smallest clause covering both
pub fn merge<L: VersionLibrary + ?Sized>(
    library: &L,
    a: &Clause,
    b: &Clause,
) -> Result<Option<Clause>, RangeError> {
    ensure_well_formed(a)?;
    ensure_well_formed(b)?;

    if !library.intersects(a, b) {
        return Ok(None);
    }
    if library.is_subset(a, b) {
        return Ok(Some(b.clone()));
    }
    if library.is_subset(b, a) {
        return Ok(Some(a.clone()));
    }

    let (first, last) = order_by_min(library, a, b);
    let comparators = lower_bound(first)
        .into_iter()
        .chain(upper_bound(last))
        .collect();

    Ok(Some(Clause::new(comparators)))
}

/// Reduce two overlapping clauses to the clause both admit
pub fn intersect<L: VersionLibrary + ?Sized>(
    library: &L,
    a: &Clause,
    b: &Clause,
) -> Result<Option<Clause>, RangeError> {
    ensure_well_formed(a)?;
    ensure_well_formed(b)?;

    if !library.intersects(a, b) {
        return Ok(None);
    }
    if library.is_subset(a, b) {
        return Ok(Some(a.clone()));
    }
    if library.is_subset(b, a) {
        return Ok(Some(b.clone()));
    }

    // Overlapping without containment: `first` is bounded above and `last`
    // is bounded below.
    let (first, last) = order_by_min(library, a, b);
    let comparators = lower_bound(last)
        .into_iter()
        .chain(upper_bound(first))
        .collect();

    Ok(Some(Clause::new(comparators)))
}

/// Order two clauses by minimum satisfying version. Ties keep argument order.
fn order_by_min<'a, L: VersionLibrary + ?Sized>(
    library: &L,
    a: &'a Clause,
    b: &'a Clause,
) -> (&'a Clause, &'a Clause) {
    let min_a = min_satisfying(library, a);
    let min_b = min_satisfying(library, b);

    match library.compare(&min_b, &min_a) {
        Ordering::Less => (b, a),
        _ => (a, b),
    }
}
