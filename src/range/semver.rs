//! npm-flavoured version library
//!
//! Parses version strings and range strings (`^1.2.3`, `>=1.0.0 <2.0.0 || 3.x`,
//! `1.0.0 - 2.0.0`, ...) into [`RangeExpr`] values and answers the low-level
//! predicates the range algebra is built on.
//!
//! Shorthand forms are desugared the way npm does it:
//! - `^1.2.3` -> `>=1.2.3 <2.0.0-0`, `^0.2.3` -> `>=0.2.3 <0.3.0-0`, `^0.0.3` -> `>=0.0.3 <0.0.4-0`
//! - `~1.2.3` -> `>=1.2.3 <1.3.0-0`
//! - `1.x`, `1` -> `>=1.0.0 <2.0.0-0`; `1.2.x`, `1.2` -> `>=1.2.0 <1.3.0-0`; `*` -> any
//! - `>1.2` -> `>=1.3.0`, `<=1.2` -> `<1.3.0-0`, `<1.2` -> `<1.2.0-0`
//! - `1.0.0 - 2.0.0` -> `>=1.0.0 <=2.0.0`

use std::cmp::Ordering;
use std::sync::LazyLock;

#[cfg(test)]
use mockall::automock;
use regex::Regex;
use semver::{Prerelease, Version};

use crate::range::error::RangeError;
use crate::range::types::{Clause, Comparator, Operator, RangeExpr};

/// Capabilities the range algebra needs from a version library
///
/// The algebra only ever talks to versions through this trait, so it stays
/// independent of how version strings are spelled.
#[cfg_attr(test, automock)]
pub trait VersionLibrary: Send + Sync {
    /// Parse a range string into an expression
    fn parse_range(&self, range: &str) -> Result<RangeExpr, RangeError>;

    /// Precedence ordering of two versions
    fn compare(&self, a: &Version, b: &Version) -> Ordering;

    /// Whether at least one version satisfies both clauses
    fn intersects(&self, a: &Clause, b: &Clause) -> bool;

    /// Whether every version satisfying `a` also satisfies `b`
    fn is_subset(&self, a: &Clause, b: &Clause) -> bool;

    /// Lowest version satisfying the clause, if it can be determined
    fn min_version(&self, clause: &Clause) -> Option<Version>;
}

/// npm semver semantics
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmSemver;

impl VersionLibrary for NpmSemver {
    fn parse_range(&self, range: &str) -> Result<RangeExpr, RangeError> {
        parse_range(range)
    }

    fn compare(&self, a: &Version, b: &Version) -> Ordering {
        a.cmp(b)
    }

    fn intersects(&self, a: &Clause, b: &Clause) -> bool {
        !Interval::of(a).intersection(&Interval::of(b)).is_empty()
    }

    fn is_subset(&self, a: &Clause, b: &Clause) -> bool {
        Interval::of(a).is_subset_of(&Interval::of(b))
    }

    fn min_version(&self, clause: &Clause) -> Option<Version> {
        min_version(clause)
    }
}

static PARTIAL_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(\d+|[xX*])(?:\.(\d+|[xX*]))?(?:\.(\d+|[xX*]))?(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?$",
    )
    .expect("partial version pattern is valid")
});

static HYPHEN_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+-\s+(\S+)$").expect("hyphen range pattern is valid")
});

static OPERATOR_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(>=|<=|>|<|=|~>|~|\^)\s+").expect("operator gap pattern is valid")
});

/// Prerelease tag `0`, the lowest possible prerelease
static LOWEST_PRERELEASE: LazyLock<Prerelease> =
    LazyLock::new(|| Prerelease::new("0").expect("\"0\" is a valid prerelease"));

/// A version where trailing components may be missing or wildcards
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(text: &str) -> Result<Self, String> {
        let caps = PARTIAL_VERSION
            .captures(text)
            .ok_or_else(|| format!("invalid version {text:?}"))?;

        let mut components = [None; 3];
        for (i, slot) in components.iter_mut().enumerate() {
            let Some(m) = caps.get(i + 1) else {
                break;
            };
            // A wildcard swallows every component after it
            let Ok(value) = m.as_str().parse::<u64>() else {
                if m.as_str().chars().all(|c| c.is_ascii_digit()) {
                    return Err(format!("version component too large in {text:?}"));
                }
                break;
            };
            *slot = Some(value);
        }

        let pre = match caps.get(4) {
            Some(m) if components[2].is_some() => {
                Prerelease::new(m.as_str()).map_err(|e| format!("{text:?}: {e}"))?
            }
            _ => Prerelease::EMPTY,
        };

        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
            pre,
        })
    }

    /// The full version, when every component is present
    fn full(&self) -> Option<Version> {
        Some(Version {
            major: self.major?,
            minor: self.minor?,
            patch: self.patch?,
            pre: self.pre.clone(),
            build: semver::BuildMetadata::EMPTY,
        })
    }
}

/// Parse a full version string, accepting a leading `v` or `=`
///
/// Build metadata is dropped so that ordering is pure precedence.
pub fn parse_version(text: &str) -> Result<Version, RangeError> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();

    Partial::parse(trimmed)
        .ok()
        .and_then(|partial| partial.full())
        .ok_or_else(|| RangeError::InvalidVersion(text.to_string()))
}

/// Parse an npm range string into a range expression
pub fn parse_range(range: &str) -> Result<RangeExpr, RangeError> {
    let invalid = |reason: String| RangeError::InvalidRange {
        range: range.to_string(),
        reason,
    };

    let clauses = range
        .split("||")
        .map(|part| parse_clause(part.trim()).map_err(invalid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RangeExpr::new(clauses))
}

fn parse_clause(spec: &str) -> Result<Clause, String> {
    if spec.is_empty() {
        return Ok(Clause::any());
    }

    if let Some(caps) = HYPHEN_RANGE.captures(spec) {
        return hyphen(&caps[1], &caps[2]).map(Clause::new);
    }

    let normalized = OPERATOR_GAP.replace_all(spec, "$1");
    let mut comparators = Vec::new();
    for token in normalized.split_whitespace() {
        comparators.extend(parse_token(token)?);
    }

    Ok(Clause::new(comparators))
}

fn parse_token(token: &str) -> Result<Vec<Comparator>, String> {
    let (op, rest) = split_operator(token);
    let partial = Partial::parse(rest)?;

    match op {
        "^" => caret(&partial),
        "~" | "~>" => tilde(&partial),
        "" | "=" => x_range(&partial),
        ">" => primitive(Operator::Greater, &partial),
        ">=" => primitive(Operator::GreaterEq, &partial),
        "<" => primitive(Operator::Less, &partial),
        "<=" => primitive(Operator::LessEq, &partial),
        _ => Err(format!("unknown operator {op:?}")),
    }
}

fn split_operator(token: &str) -> (&str, &str) {
    const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "~", "^"];

    OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", token))
}

fn bump(component: u64) -> Result<u64, String> {
    component
        .checked_add(1)
        .ok_or_else(|| "version component overflow".to_string())
}

fn gte(major: u64, minor: u64, patch: u64) -> Comparator {
    Comparator::new(Operator::GreaterEq, Version::new(major, minor, patch))
}

/// `<major.minor.patch-0`: excludes the prereleases of the bound as well
fn lt_lowest(major: u64, minor: u64, patch: u64) -> Comparator {
    let mut version = Version::new(major, minor, patch);
    version.pre = LOWEST_PRERELEASE.clone();
    Comparator::new(Operator::Less, version)
}

/// The comparator no version satisfies
fn nothing() -> Comparator {
    lt_lowest(0, 0, 0)
}

fn x_range(partial: &Partial) -> Result<Vec<Comparator>, String> {
    match (partial.major, partial.minor, partial.patch) {
        (None, _, _) => Ok(vec![]),
        (Some(major), None, _) => Ok(vec![gte(major, 0, 0), lt_lowest(bump(major)?, 0, 0)]),
        (Some(major), Some(minor), None) => Ok(vec![
            gte(major, minor, 0),
            lt_lowest(major, bump(minor)?, 0),
        ]),
        _ => Ok(partial
            .full()
            .map(|version| vec![Comparator::new(Operator::Exact, version)])
            .unwrap_or_default()),
    }
}

fn caret(partial: &Partial) -> Result<Vec<Comparator>, String> {
    match (partial.major, partial.minor, partial.patch) {
        (None, _, _) => Ok(vec![]),
        (Some(major), None, _) => Ok(vec![gte(major, 0, 0), lt_lowest(bump(major)?, 0, 0)]),
        (Some(0), Some(minor), None) => {
            Ok(vec![gte(0, minor, 0), lt_lowest(0, bump(minor)?, 0)])
        }
        (Some(major), Some(minor), None) => {
            Ok(vec![gte(major, minor, 0), lt_lowest(bump(major)?, 0, 0)])
        }
        (Some(major), Some(minor), Some(patch)) => {
            let lower = partial.full().map(|v| Comparator::new(Operator::GreaterEq, v));
            let upper = match (major, minor) {
                (0, 0) => lt_lowest(0, 0, bump(patch)?),
                (0, _) => lt_lowest(0, bump(minor)?, 0),
                _ => lt_lowest(bump(major)?, 0, 0),
            };
            Ok(lower.into_iter().chain([upper]).collect())
        }
    }
}

fn tilde(partial: &Partial) -> Result<Vec<Comparator>, String> {
    match (partial.major, partial.minor, partial.patch) {
        (None, _, _) => Ok(vec![]),
        (Some(major), None, _) => Ok(vec![gte(major, 0, 0), lt_lowest(bump(major)?, 0, 0)]),
        (Some(major), Some(minor), None) => Ok(vec![
            gte(major, minor, 0),
            lt_lowest(major, bump(minor)?, 0),
        ]),
        (Some(major), Some(minor), Some(_)) => {
            let lower = partial.full().map(|v| Comparator::new(Operator::GreaterEq, v));
            Ok(lower
                .into_iter()
                .chain([lt_lowest(major, bump(minor)?, 0)])
                .collect())
        }
    }
}

fn primitive(op: Operator, partial: &Partial) -> Result<Vec<Comparator>, String> {
    if let Some(version) = partial.full() {
        return Ok(vec![Comparator::new(op, version)]);
    }

    let Some(major) = partial.major else {
        // `>*` and `<*` exclude everything, `>=*` and `<=*` include everything
        return Ok(match op {
            Operator::Greater | Operator::Less => vec![nothing()],
            _ => vec![],
        });
    };
    let minor = partial.minor;

    let comparator = match op {
        Operator::Greater => match minor {
            None => gte(bump(major)?, 0, 0),
            Some(minor) => gte(major, bump(minor)?, 0),
        },
        Operator::GreaterEq => gte(major, minor.unwrap_or(0), 0),
        Operator::LessEq => match minor {
            None => lt_lowest(bump(major)?, 0, 0),
            Some(minor) => lt_lowest(major, bump(minor)?, 0),
        },
        Operator::Less => lt_lowest(major, minor.unwrap_or(0), 0),
        Operator::Exact => return x_range(partial),
    };

    Ok(vec![comparator])
}

fn hyphen(from: &str, to: &str) -> Result<Vec<Comparator>, String> {
    let from = Partial::parse(from)?;
    let to = Partial::parse(to)?;
    let mut comparators = Vec::with_capacity(2);

    if let Some(major) = from.major {
        comparators.push(match from.full() {
            Some(version) => Comparator::new(Operator::GreaterEq, version),
            None => gte(major, from.minor.unwrap_or(0), 0),
        });
    }

    match (to.major, to.minor, to.full()) {
        (None, _, _) => {}
        (_, _, Some(version)) => comparators.push(Comparator::new(Operator::LessEq, version)),
        (Some(major), None, None) => comparators.push(lt_lowest(bump(major)?, 0, 0)),
        (Some(major), Some(minor), None) => comparators.push(lt_lowest(major, bump(minor)?, 0)),
    }

    Ok(comparators)
}

/// npm's `minVersion` for a single clause
fn min_version(clause: &Clause) -> Option<Version> {
    let zero = Version::new(0, 0, 0);
    if clause.satisfies(&zero) {
        return Some(zero);
    }
    let mut lowest = zero;
    lowest.pre = LOWEST_PRERELEASE.clone();
    if clause.satisfies(&lowest) {
        return Some(lowest);
    }

    let candidate = clause
        .comparators()
        .iter()
        .filter_map(|comparator| {
            let version = comparator.version();
            match comparator.operator() {
                Operator::GreaterEq | Operator::Exact => Some(version.clone()),
                Operator::Greater => Some(next_after(version)),
                Operator::Less | Operator::LessEq => None,
            }
        })
        .max()?;

    clause.satisfies(&candidate).then_some(candidate)
}

/// The smallest version npm considers above `version` for a `>` bound
fn next_after(version: &Version) -> Version {
    let mut next = version.clone();
    if version.pre.is_empty() {
        next.patch = next.patch.saturating_add(1);
    } else {
        next.pre = Prerelease::new(&format!("{}.0", version.pre))
            .unwrap_or_else(|_| version.pre.clone());
    }
    next
}

/// One edge of a clause's interval
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    version: Version,
    inclusive: bool,
}

/// The set of versions a clause admits, as a single interval.
/// `None` on a side means unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    lower: Option<Edge>,
    upper: Option<Edge>,
}

impl Interval {
    fn of(clause: &Clause) -> Self {
        let mut interval = Self {
            lower: None,
            upper: None,
        };

        for comparator in clause.comparators() {
            let version = comparator.version().clone();
            let (lower, upper) = match comparator.operator() {
                Operator::Greater => (Some(Edge { version, inclusive: false }), None),
                Operator::GreaterEq => (Some(Edge { version, inclusive: true }), None),
                Operator::Less => (None, Some(Edge { version, inclusive: false })),
                Operator::LessEq => (None, Some(Edge { version, inclusive: true })),
                Operator::Exact => (
                    Some(Edge { version: version.clone(), inclusive: true }),
                    Some(Edge { version, inclusive: true }),
                ),
            };
            interval.lower = tighter_lower(interval.lower, lower);
            interval.upper = tighter_upper(interval.upper, upper);
        }

        interval
    }

    fn intersection(&self, other: &Self) -> Self {
        Self {
            lower: tighter_lower(self.lower.clone(), other.lower.clone()),
            upper: tighter_upper(self.upper.clone(), other.upper.clone()),
        }
    }

    fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => match lower.version.cmp(&upper.version) {
                Ordering::Greater => true,
                Ordering::Equal => !(lower.inclusive && upper.inclusive),
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    fn is_subset_of(&self, other: &Self) -> bool {
        if self.is_empty() {
            return true;
        }
        if other.is_empty() {
            return false;
        }

        let lower_ok = match (&self.lower, &other.lower) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(mine), Some(theirs)) => match mine.version.cmp(&theirs.version) {
                Ordering::Greater => true,
                Ordering::Equal => theirs.inclusive || !mine.inclusive,
                Ordering::Less => false,
            },
        };

        let upper_ok = match (&self.upper, &other.upper) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(mine), Some(theirs)) => match mine.version.cmp(&theirs.version) {
                Ordering::Less => true,
                Ordering::Equal => theirs.inclusive || !mine.inclusive,
                Ordering::Greater => false,
            },
        };

        lower_ok && upper_ok
    }
}

fn tighter_lower(a: Option<Edge>, b: Option<Edge>) -> Option<Edge> {
    match (a, b) {
        (None, edge) | (edge, None) => edge,
        (Some(a), Some(b)) => Some(match a.version.cmp(&b.version) {
            Ordering::Greater => a,
            Ordering::Less => b,
            Ordering::Equal if !a.inclusive => a,
            Ordering::Equal => b,
        }),
    }
}

fn tighter_upper(a: Option<Edge>, b: Option<Edge>) -> Option<Edge> {
    match (a, b) {
        (None, edge) | (edge, None) => edge,
        (Some(a), Some(b)) => Some(match a.version.cmp(&b.version) {
            Ordering::Less => a,
            Ordering::Greater => b,
            Ordering::Equal if !a.inclusive => a,
            Ordering::Equal => b,
        }),
    }
}
