//! Engine compatibility check
//!
//! Compares the minimum engine version a project declares against the engine
//! constraints of its locked packages, and computes the window of versions
//! every package accepts.

use std::path::{Path, PathBuf};

use semver::Version;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CheckConfig, Overrides};
use crate::parser::{EngineConstraint, Manifest, ParseError, Parser, PnpmLockParser};
use crate::range::{RangeAlgebra, RangeError, RangeExpr, VersionLibrary};

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: ParseError },

    #[error(transparent)]
    Range(#[from] RangeError),
}

/// A package whose constraint excludes the declared minimum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub package: String,
    pub constraint: String,
}

/// Result of checking a project that declares an engine range
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineReport {
    pub engine: String,
    /// Lowest version of the project's declared range
    pub declared_minimum: Version,
    pub violations: Vec<Violation>,
    /// Versions every checked package accepts, in canonical form
    pub combined: RangeExpr,
    /// Lowest version of `combined`, `None` when no version fits every package
    pub combined_minimum: Option<Version>,
}

impl EngineReport {
    pub fn is_compatible(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CheckOutcome {
    /// The manifest has no usable range for the engine
    NoDeclaredEngine { engine: String },
    Checked(EngineReport),
}

impl CheckOutcome {
    /// Process exit code: 1 when any package rejects the declared minimum
    pub fn exit_code(&self) -> u8 {
        match self {
            CheckOutcome::Checked(report) if !report.is_compatible() => 1,
            _ => 0,
        }
    }
}

/// Check `constraints` against the range the project declares for `engine`
pub fn check_engines<L: VersionLibrary>(
    algebra: &RangeAlgebra<L>,
    engine: &str,
    declared: Option<&str>,
    constraints: &[EngineConstraint],
) -> Result<CheckOutcome, RangeError> {
    let no_engine = || CheckOutcome::NoDeclaredEngine {
        engine: engine.to_string(),
    };

    let Some(declared) = declared.filter(|range| !range.trim().is_empty()) else {
        return Ok(no_engine());
    };
    let Some(declared_minimum) = algebra.min_range_version(&algebra.parse(declared)?) else {
        return Ok(no_engine());
    };
    debug!("Declared {} range {} has minimum {}", engine, declared, declared_minimum);

    let mut violations = Vec::new();
    for constraint in constraints {
        if !algebra.parse(&constraint.range)?.satisfies(&declared_minimum) {
            violations.push(Violation {
                package: constraint.package.clone(),
                constraint: constraint.range.clone(),
            });
        }
    }

    let raw: Vec<&str> = constraints.iter().map(|c| c.range.as_str()).collect();
    let unique = algebra.dedupe_ranges(&raw)?;
    debug!("{} unique {} constraints", unique.len(), engine);

    let combined = algebra.simplify(&algebra.reduce_intersection(&unique)?)?;
    let combined_minimum = algebra.min_range_version(&combined);
    info!(
        "Checked {} packages: {} violations, combined window {}",
        constraints.len(),
        violations.len(),
        combined
    );

    Ok(CheckOutcome::Checked(EngineReport {
        engine: engine.to_string(),
        declared_minimum,
        violations,
        combined,
        combined_minimum,
    }))
}

/// Everything read from disk for one check
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub manifest: Manifest,
    pub config: CheckConfig,
    /// Constraints left after dev filtering
    pub constraints: Vec<EngineConstraint>,
}

impl Project {
    /// Read the manifest and lockfile and resolve the effective configuration
    pub fn load(
        manifest_path: &Path,
        lockfile_path: &Path,
        overrides: &Overrides,
    ) -> Result<Self, CheckError> {
        let manifest = Manifest::parse(&read(manifest_path)?).map_err(|source| {
            CheckError::Parse {
                path: manifest_path.to_path_buf(),
                source,
            }
        })?;
        let config = manifest.engines_check.clone().with_overrides(overrides);

        let constraints = PnpmLockParser::new(config.engine.as_str())
            .parse(&read(lockfile_path)?)
            .map_err(|source| CheckError::Parse {
                path: lockfile_path.to_path_buf(),
                source,
            })?;
        let total = constraints.len();
        let constraints: Vec<_> = constraints
            .into_iter()
            .filter(|c| config.include_dev || !c.dev)
            .collect();
        debug!(
            "Loaded {} {} constraints ({} skipped as dev-only)",
            constraints.len(),
            config.engine,
            total - constraints.len()
        );

        Ok(Self {
            manifest,
            config,
            constraints,
        })
    }

    pub fn check<L: VersionLibrary>(
        &self,
        algebra: &RangeAlgebra<L>,
    ) -> Result<CheckOutcome, RangeError> {
        check_engines(
            algebra,
            &self.config.engine,
            self.manifest.engine_range(&self.config.engine),
            &self.constraints,
        )
    }
}

fn read(path: &Path) -> Result<String, CheckError> {
    std::fs::read_to_string(path).map_err(|source| CheckError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::NpmSemver;
    use rstest::rstest;

    fn constraints(entries: &[(&str, &str)]) -> Vec<EngineConstraint> {
        entries
            .iter()
            .map(|(package, range)| EngineConstraint {
                package: package.to_string(),
                range: range.to_string(),
                dev: false,
            })
            .collect()
    }

    fn check(declared: Option<&str>, entries: &[(&str, &str)]) -> CheckOutcome {
        let algebra = RangeAlgebra::<NpmSemver>::default();
        check_engines(&algebra, "node", declared, &constraints(entries)).unwrap()
    }

    fn report(outcome: CheckOutcome) -> EngineReport {
        match outcome {
            CheckOutcome::Checked(report) => report,
            other => panic!("expected a report, got {other:?}"),
        }
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    #[case(Some(">=3.0.0 <2.0.0"))]
    fn missing_or_empty_declared_range_is_reported(#[case] declared: Option<&str>) {
        let outcome = check(declared, &[("a@1.0.0", ">=10")]);

        assert_eq!(
            outcome,
            CheckOutcome::NoDeclaredEngine {
                engine: "node".to_string()
            }
        );
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn compatible_project_has_no_violations() {
        let outcome = check(
            Some(">=18.12.0"),
            &[("a@1.0.0", ">=14"), ("b@2.0.0", "^16.14.0 || >=18")],
        );
        assert_eq!(outcome.exit_code(), 0);

        let report = report(outcome);
        assert_eq!(report.declared_minimum, Version::new(18, 12, 0));
        assert!(report.violations.is_empty());
        assert_eq!(report.combined.to_string(), ">=16.14.0 <17.0.0-0 || >=18.0.0");
        assert_eq!(report.combined_minimum, Some(Version::new(16, 14, 0)));
    }

    #[test]
    fn packages_excluding_the_minimum_are_violations() {
        let outcome = check(
            Some("^16.0.0 || >=18"),
            &[
                ("a@1.0.0", ">=14"),
                ("b@2.0.0", ">=18.12.0"),
                ("c@3.0.0", "^14.17.0 || >=16"),
                ("d@4.0.0", ">=16.14.0"),
            ],
        );
        assert_eq!(outcome.exit_code(), 1);

        let report = report(outcome);
        assert_eq!(report.declared_minimum, Version::new(16, 0, 0));
        assert_eq!(
            report.violations,
            vec![
                Violation {
                    package: "b@2.0.0".to_string(),
                    constraint: ">=18.12.0".to_string(),
                },
                Violation {
                    package: "d@4.0.0".to_string(),
                    constraint: ">=16.14.0".to_string(),
                },
            ]
        );
        assert_eq!(report.combined.to_string(), ">=18.12.0");
        assert_eq!(report.combined_minimum, Some(Version::new(18, 12, 0)));
    }

    #[test]
    fn disjoint_constraints_have_no_combined_minimum() {
        let report = report(check(
            Some(">=12"),
            &[("a@1.0.0", "^12.0.0"), ("b@1.0.0", ">=14")],
        ));

        assert!(report.combined.is_none());
        assert_eq!(report.combined_minimum, None);
    }

    #[test]
    fn no_constraints_accept_every_version() {
        let report = report(check(Some(">=20"), &[]));

        assert!(report.is_compatible());
        assert_eq!(report.combined, RangeExpr::any());
        assert_eq!(report.combined_minimum, Some(Version::new(0, 0, 0)));
    }

    #[test]
    fn unparseable_constraint_is_an_error() {
        let algebra = RangeAlgebra::<NpmSemver>::default();
        let result = check_engines(
            &algebra,
            "node",
            Some(">=18"),
            &constraints(&[("a@1.0.0", "node >= 18")]),
        );

        assert!(matches!(result, Err(RangeError::InvalidRange { .. })));
    }

    #[test]
    fn report_serializes_ranges_and_versions_as_strings() {
        let outcome = check(Some(">=18"), &[("a@1.0.0", ">=20")]);

        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status": "checked",
                "engine": "node",
                "declaredMinimum": "18.0.0",
                "violations": [{ "package": "a@1.0.0", "constraint": ">=20" }],
                "combined": ">=20.0.0",
                "combinedMinimum": "20.0.0"
            })
        );
    }
}
