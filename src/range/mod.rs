//! Version-range algebra
//!
//! Canonicalizes, merges, and intersects range expressions. A range
//! expression is a union ("OR") of clauses, each clause an intersection
//! ("AND") of lower and upper bound comparators.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  intersect   │────▶│   simplify   │────▶│    merge     │
//! │ (reduce list)│     │ (canonical)  │     │(clause pairs)│
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │                                         │
//!        ▼                                         ▼
//! ┌──────────────┐                          ┌──────────────┐
//! │    clause    │◀─────────────────────────│    semver    │
//! │   (bounds)   │                          │  (library)   │
//! └──────────────┘                          └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`]: `Comparator`, `Clause`, `RangeExpr` value types
//! - [`semver`]: `VersionLibrary` trait and the npm implementation
//! - [`clause`]: decomposition and bound extraction
//! - [`merge`]: pairwise clause union and intersection
//! - [`simplify`]: canonical form
//! - [`intersect`]: expression intersection, list reduction, deduplication
//! - [`error`]: `RangeError`
//!
//! Everything here is pure: no I/O, no logging, no shared state.

pub mod clause;
pub mod error;
pub mod intersect;
pub mod merge;
pub mod semver;
pub mod simplify;
pub mod types;

use ::semver::Version;

pub use error::RangeError;
pub use self::semver::{NpmSemver, VersionLibrary};
pub use types::{BoundDirection, Clause, Comparator, Operator, RangeExpr};

/// Range operations bound to one version library
#[derive(Debug, Clone, Default)]
pub struct RangeAlgebra<L = NpmSemver> {
    library: L,
}

impl<L: VersionLibrary> RangeAlgebra<L> {
    pub fn new(library: L) -> Self {
        Self { library }
    }

    pub fn parse(&self, range: &str) -> Result<RangeExpr, RangeError> {
        self.library.parse_range(range)
    }

    pub fn merge(&self, a: &Clause, b: &Clause) -> Result<Option<Clause>, RangeError> {
        merge::merge(&self.library, a, b)
    }

    pub fn intersect(&self, a: &Clause, b: &Clause) -> Result<Option<Clause>, RangeError> {
        merge::intersect(&self.library, a, b)
    }

    pub fn min_satisfying(&self, clause: &Clause) -> Version {
        clause::min_satisfying(&self.library, clause)
    }

    /// Lowest version satisfying any clause of `expr`
    pub fn min_range_version(&self, expr: &RangeExpr) -> Option<Version> {
        expr.clauses()
            .iter()
            .filter_map(|clause| self.library.min_version(clause))
            .min_by(|a, b| self.library.compare(a, b))
    }

    pub fn simplify(&self, expr: &RangeExpr) -> Result<RangeExpr, RangeError> {
        simplify::simplify(&self.library, expr)
    }

    pub fn intersect_ranges(&self, a: &RangeExpr, b: &RangeExpr) -> Result<RangeExpr, RangeError> {
        intersect::intersect_ranges(&self.library, a, b)
    }

    pub fn reduce_intersection(&self, ranges: &[RangeExpr]) -> Result<RangeExpr, RangeError> {
        intersect::reduce_intersection(&self.library, ranges)
    }

    pub fn dedupe_ranges<S: AsRef<str>>(&self, ranges: &[S]) -> Result<Vec<RangeExpr>, RangeError> {
        intersect::dedupe_ranges(&self.library, ranges)
    }
}
