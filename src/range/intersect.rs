//! Intersection of whole range expressions

use indexmap::IndexSet;

use crate::range::clause::{decompose, recompose};
use crate::range::error::RangeError;
use crate::range::merge::intersect;
use crate::range::semver::VersionLibrary;
use crate::range::simplify::simplify;
use crate::range::types::RangeExpr;

/// Intersect every clause of `a` with every clause of `b`.
///
/// The result keeps the non-empty pairwise intersections in `a`-major order
/// and is not simplified.
pub fn intersect_ranges<L: VersionLibrary + ?Sized>(
    library: &L,
    a: &RangeExpr,
    b: &RangeExpr,
) -> Result<RangeExpr, RangeError> {
    let right = decompose(b);
    let mut kept = Vec::new();

    for left in decompose(a) {
        for clause in &right {
            if let Some(common) = intersect(library, &left, clause)? {
                kept.push(common);
            }
        }
    }

    Ok(recompose(kept))
}

/// Versions common to every expression in `ranges`.
///
/// Each expression is simplified first, then the list is folded left to
/// right. An empty list admits every version.
pub fn reduce_intersection<L: VersionLibrary + ?Sized>(
    library: &L,
    ranges: &[RangeExpr],
) -> Result<RangeExpr, RangeError> {
    let mut simplified = ranges.iter().map(|range| simplify(library, range));

    let Some(first) = simplified.next() else {
        return Ok(RangeExpr::any());
    };

    simplified.try_fold(first?, |acc, next| intersect_ranges(library, &acc, &next?))
}

/// Parse each distinct range string once. Duplicates are detected by exact
/// text, so equivalent spellings are kept apart.
pub fn dedupe_ranges<L, S>(library: &L, ranges: &[S]) -> Result<Vec<RangeExpr>, RangeError>
where
    L: VersionLibrary + ?Sized,
    S: AsRef<str>,
{
    ranges
        .iter()
        .map(S::as_ref)
        .collect::<IndexSet<&str>>()
        .into_iter()
        .map(|range| library.parse_range(range))
        .collect()
}
