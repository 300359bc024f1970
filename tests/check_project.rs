mod helper;

use engines_check::check::{CheckError, CheckOutcome, Project, Violation};
use engines_check::config::Overrides;
use engines_check::range::{NpmSemver, RangeAlgebra};
use helper::ProjectDir;
use semver::Version;

const LOCKFILE: &str = r#"lockfileVersion: '9.0'

settings:
  autoInstallPeers: true

importers:

  .:
    dependencies:
      express:
        specifier: ^4.19.0
        version: 4.19.2
    devDependencies:
      vitest:
        specifier: ^1.6.0
        version: 1.6.0

packages:

  express@4.19.2:
    resolution: {integrity: sha512-express}
    engines: {node: '>= 0.10.0'}

  vitest@1.6.0:
    resolution: {integrity: sha512-vitest}
    engines: {node: '^18.0.0 || >=20.0.0'}
    hasBin: true
    dev: true

  undici@6.19.2:
    resolution: {integrity: sha512-undici}
    engines: {node: '>=18.17'}
"#;

fn algebra() -> RangeAlgebra<NpmSemver> {
    RangeAlgebra::new(NpmSemver)
}

#[test]
fn compatible_project_reports_combined_window() {
    let project = ProjectDir::new(r#"{"engines": {"node": ">=18.17.0"}}"#, LOCKFILE);

    let loaded = Project::load(&project.manifest(), &project.lockfile(), &Overrides::default())
        .unwrap();
    let outcome = loaded.check(&algebra()).unwrap();

    assert_eq!(outcome.exit_code(), 0);
    let CheckOutcome::Checked(report) = outcome else {
        panic!("expected a report");
    };
    assert_eq!(report.declared_minimum, Version::new(18, 17, 0));
    assert!(report.violations.is_empty());
    assert_eq!(
        report.combined.to_string(),
        ">=18.17.0 <19.0.0-0 || >=20.0.0"
    );
    assert_eq!(report.combined_minimum, Some(Version::new(18, 17, 0)));
}

#[test]
fn old_minimum_reports_each_offending_package() {
    let project = ProjectDir::new(r#"{"engines": {"node": "^16.0.0 || >=18"}}"#, LOCKFILE);

    let loaded = Project::load(&project.manifest(), &project.lockfile(), &Overrides::default())
        .unwrap();
    let outcome = loaded.check(&algebra()).unwrap();

    assert_eq!(outcome.exit_code(), 1);
    let CheckOutcome::Checked(report) = outcome else {
        panic!("expected a report");
    };
    assert_eq!(
        report.violations,
        vec![
            Violation {
                package: "vitest@1.6.0".to_string(),
                constraint: "^18.0.0 || >=20.0.0".to_string(),
            },
            Violation {
                package: "undici@6.19.2".to_string(),
                constraint: ">=18.17".to_string(),
            },
        ]
    );
}

#[test]
fn prod_override_skips_dev_only_packages() {
    let project = ProjectDir::new(r#"{"engines": {"node": "^16.0.0 || >=18"}}"#, LOCKFILE);
    let overrides = Overrides {
        engine: None,
        prod: true,
    };

    let loaded = Project::load(&project.manifest(), &project.lockfile(), &overrides).unwrap();

    assert!(!loaded.config.include_dev);
    assert_eq!(loaded.constraints.len(), 2);
    let CheckOutcome::Checked(report) = loaded.check(&algebra()).unwrap() else {
        panic!("expected a report");
    };
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].package, "undici@6.19.2");
}

#[test]
fn manifest_block_selects_engine() {
    let manifest = r#"{
  "engines": {"node": ">=18", "npm": ">=9.0.0"},
  "enginesCheck": {"engine": "npm"}
}"#;
    let lockfile = r#"packages:
  semantic-release@23.0.0:
    engines: {node: '>=20.8.1', npm: '>=9'}
  legacy@1.0.0:
    engines: {node: '>=0.8'}
"#;
    let project = ProjectDir::new(manifest, lockfile);

    let loaded = Project::load(&project.manifest(), &project.lockfile(), &Overrides::default())
        .unwrap();

    assert_eq!(loaded.config.engine, "npm");
    assert_eq!(loaded.constraints.len(), 1);
    let CheckOutcome::Checked(report) = loaded.check(&algebra()).unwrap() else {
        panic!("expected a report");
    };
    assert_eq!(report.engine, "npm");
    assert!(report.is_compatible());
}

#[test]
fn missing_engine_range_is_not_an_error() {
    let project = ProjectDir::new(r#"{"name": "app"}"#, LOCKFILE);

    let loaded = Project::load(&project.manifest(), &project.lockfile(), &Overrides::default())
        .unwrap();
    let outcome = loaded.check(&algebra()).unwrap();

    assert_eq!(
        outcome,
        CheckOutcome::NoDeclaredEngine {
            engine: "node".to_string()
        }
    );
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn empty_engine_range_is_not_checked() {
    let project = ProjectDir::new(r#"{"engines": {"node": ""}}"#, LOCKFILE);

    let loaded = Project::load(&project.manifest(), &project.lockfile(), &Overrides::default())
        .unwrap();
    let outcome = loaded.check(&algebra()).unwrap();

    assert_eq!(
        outcome,
        CheckOutcome::NoDeclaredEngine {
            engine: "node".to_string()
        }
    );
}

#[test]
fn missing_lockfile_is_an_io_error() {
    let project = ProjectDir::new(r#"{"engines": {"node": ">=18"}}"#, LOCKFILE);
    let missing = project.lockfile().with_file_name("missing.yaml");

    let result = Project::load(&project.manifest(), &missing, &Overrides::default());

    assert!(matches!(result, Err(CheckError::Io { path, .. }) if path == missing));
}

#[test]
fn invalid_manifest_is_a_parse_error() {
    let project = ProjectDir::new("{ nope", LOCKFILE);

    let result = Project::load(&project.manifest(), &project.lockfile(), &Overrides::default());

    assert!(matches!(result, Err(CheckError::Parse { .. })));
}
