//! Value types for range expressions
//!
//! All types here are immutable once built: operations in the algebra take
//! them by reference and return freshly allocated values.

use std::fmt;

use semver::Version;
use serde::{Serialize, Serializer};

/// Comparison operator of a single comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `=` (also written as a bare version)
    Exact,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Greater => ">",
            Operator::GreaterEq => ">=",
            Operator::Less => "<",
            Operator::LessEq => "<=",
            Operator::Exact => "=",
        }
    }

    /// Whether the operator constrains versions from below.
    /// `=` constrains both sides.
    pub fn is_lower(&self) -> bool {
        matches!(
            self,
            Operator::Greater | Operator::GreaterEq | Operator::Exact
        )
    }

    /// Whether the operator constrains versions from above.
    /// `=` constrains both sides.
    pub fn is_upper(&self) -> bool {
        matches!(self, Operator::Less | Operator::LessEq | Operator::Exact)
    }
}

/// Side of a clause a comparator bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundDirection {
    Lower,
    Upper,
}

impl fmt::Display for BoundDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundDirection::Lower => f.write_str("lower-bound"),
            BoundDirection::Upper => f.write_str("upper-bound"),
        }
    }
}

/// An operator paired with a version, e.g. `>=1.2.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparator {
    operator: Operator,
    version: Version,
}

impl Comparator {
    pub fn new(operator: Operator, version: Version) -> Self {
        Self { operator, version }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Plain precedence test, without npm's prerelease filtering
    pub fn matches(&self, version: &Version) -> bool {
        match self.operator {
            Operator::Greater => version > &self.version,
            Operator::GreaterEq => version >= &self.version,
            Operator::Less => version < &self.version,
            Operator::LessEq => version <= &self.version,
            Operator::Exact => version == &self.version,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Exact => write!(f, "{}", self.version),
            op => write!(f, "{}{}", op.as_str(), self.version),
        }
    }
}

/// A conjunction of comparators: one contiguous band of versions.
///
/// A clause with no comparators matches every version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    comparators: Vec<Comparator>,
}

impl Clause {
    pub fn new(comparators: Vec<Comparator>) -> Self {
        Self { comparators }
    }

    /// The clause that every version satisfies
    pub fn any() -> Self {
        Self::default()
    }

    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    /// Check whether `version` satisfies every comparator of the clause.
    ///
    /// Prerelease versions only satisfy a clause when one of its comparators
    /// names a prerelease on the same `major.minor.patch` tuple.
    pub fn satisfies(&self, version: &Version) -> bool {
        if !self.comparators.iter().all(|c| c.matches(version)) {
            return false;
        }

        if version.pre.is_empty() {
            return true;
        }

        self.comparators.iter().any(|c| {
            let allowed = c.version();
            !allowed.pre.is_empty()
                && allowed.major == version.major
                && allowed.minor == version.minor
                && allowed.patch == version.patch
        })
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comparators.is_empty() {
            return f.write_str("*");
        }

        for (i, comparator) in self.comparators.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{comparator}")?;
        }
        Ok(())
    }
}

/// A disjunction of clauses.
///
/// An expression with no clauses matches nothing; an expression holding a
/// single empty clause matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RangeExpr {
    clauses: Vec<Clause>,
}

impl RangeExpr {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// The expression every version satisfies
    pub fn any() -> Self {
        Self::new(vec![Clause::any()])
    }

    /// The expression no version satisfies
    pub fn none() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_none(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        self.clauses.iter().any(|clause| clause.satisfies(version))
    }
}

impl fmt::Display for RangeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("<0.0.0-0");
        }

        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

impl Serialize for RangeExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
