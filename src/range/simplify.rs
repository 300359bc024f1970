//! Canonical form of range expressions

use crate::range::clause::{decompose, min_satisfying, recompose};
use crate::range::error::RangeError;
use crate::range::merge::merge;
use crate::range::semver::VersionLibrary;
use crate::range::types::{Clause, RangeExpr};

/// Rewrite `expr` as a sorted union of non-overlapping clauses.
///
/// Clauses no version satisfies are dropped. The rest are sorted by minimum
/// satisfying version, then each clause is merged into its predecessor when
/// the two overlap. One forward pass is enough once the list is sorted.
pub fn simplify<L: VersionLibrary + ?Sized>(
    library: &L,
    expr: &RangeExpr,
) -> Result<RangeExpr, RangeError> {
    // An empty clause keyed at the sentinel would otherwise sit between
    // overlapping neighbours and keep them apart.
    let mut keyed: Vec<_> = decompose(expr)
        .into_iter()
        .filter(|clause| library.min_version(clause).is_some())
        .map(|clause| (min_satisfying(library, &clause), clause))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| library.compare(a, b));

    let mut merged: Vec<Clause> = Vec::with_capacity(keyed.len());
    for (_, clause) in keyed {
        if let Some(previous) = merged.last_mut()
            && let Some(combined) = merge(library, previous, &clause)?
        {
            *previous = combined;
            continue;
        }
        merged.push(clause);
    }

    Ok(recompose(merged))
}
