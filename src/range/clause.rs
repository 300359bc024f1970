//! Clause decomposition and bound extraction

use std::sync::LazyLock;

use semver::{Prerelease, Version};

use crate::range::error::RangeError;
use crate::range::semver::VersionLibrary;
use crate::range::types::{BoundDirection, Clause, Comparator, Operator, RangeExpr};

/// `0.0.0-0`: sorts below every publishable version
static UNBOUNDED_MIN: LazyLock<Version> = LazyLock::new(|| Version {
    pre: Prerelease::new("0").expect("\"0\" is a valid prerelease"),
    ..Version::new(0, 0, 0)
});

/// Split an expression into its OR-clauses, in their original order
pub fn decompose(expr: &RangeExpr) -> Vec<Clause> {
    expr.clauses().to_vec()
}

/// OR a list of clauses back together, keeping their order
pub fn recompose(clauses: Vec<Clause>) -> RangeExpr {
    RangeExpr::new(clauses)
}

/// The clause's lower-bound comparator, if any.
///
/// An `=v` comparator is reported as `>=v`.
pub fn lower_bound(clause: &Clause) -> Option<Comparator> {
    clause
        .comparators()
        .iter()
        .find(|c| c.operator().is_lower())
        .map(|c| match c.operator() {
            Operator::Exact => Comparator::new(Operator::GreaterEq, c.version().clone()),
            _ => c.clone(),
        })
}

/// The clause's upper-bound comparator, if any.
///
/// An `=v` comparator is reported as `<=v`.
pub fn upper_bound(clause: &Clause) -> Option<Comparator> {
    clause
        .comparators()
        .iter()
        .find(|c| c.operator().is_upper())
        .map(|c| match c.operator() {
            Operator::Exact => Comparator::new(Operator::LessEq, c.version().clone()),
            _ => c.clone(),
        })
}

/// Reject clauses carrying more than one comparator per bound direction
pub fn ensure_well_formed(clause: &Clause) -> Result<(), RangeError> {
    let comparators = clause.comparators();
    let lowers = comparators.iter().filter(|c| c.operator().is_lower()).count();
    let uppers = comparators.iter().filter(|c| c.operator().is_upper()).count();

    let direction = if lowers > 1 {
        BoundDirection::Lower
    } else if uppers > 1 {
        BoundDirection::Upper
    } else {
        return Ok(());
    };

    Err(RangeError::MalformedClause {
        direction,
        clause: clause.to_string(),
    })
}

/// Lowest version satisfying the clause, or `0.0.0-0` when the clause is
/// unbounded below or its minimum cannot be determined
pub fn min_satisfying<L: VersionLibrary + ?Sized>(library: &L, clause: &Clause) -> Version {
    if lower_bound(clause).is_none() {
        return unbounded_min();
    }

    library
        .min_version(clause)
        .unwrap_or_else(unbounded_min)
}

pub fn unbounded_min() -> Version {
    UNBOUNDED_MIN.clone()
}
