use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use engines_check::check::{CheckOutcome, EngineReport, Project};
use engines_check::config::{DEFAULT_LOCKFILE, DEFAULT_MANIFEST, Overrides};
use engines_check::logging;
use engines_check::range::{NpmSemver, RangeAlgebra};

#[derive(Parser)]
#[command(name = "engines-check")]
#[command(
    version,
    about = "Check that locked dependencies accept the project's minimum engine version"
)]
struct Cli {
    /// Path to package.json
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Path to pnpm-lock.yaml
    #[arg(long, default_value = DEFAULT_LOCKFILE)]
    lockfile: PathBuf,

    /// Engine to check (overrides `enginesCheck.engine`, default `node`)
    #[arg(long)]
    engine: Option<String>,

    /// Skip packages the lockfile marks as dev-only
    #[arg(long)]
    prod: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Write JSON logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init(&cli.log_level, cli.log_file.as_deref())?;

    let overrides = Overrides {
        engine: cli.engine.clone(),
        prod: cli.prod,
    };
    let project = Project::load(&cli.manifest, &cli.lockfile, &overrides)?;
    let outcome = project.check(&RangeAlgebra::new(NpmSemver))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome, &project.config.engine_label());
    }

    Ok(ExitCode::from(outcome.exit_code()))
}

fn print_outcome(outcome: &CheckOutcome, label: &str) {
    match outcome {
        CheckOutcome::NoDeclaredEngine { .. } => {
            println!("Valid {label} version/range not specified in package.json");
        }
        CheckOutcome::Checked(report) => print_report(report, label),
    }
}

fn print_report(report: &EngineReport, label: &str) {
    println!(
        "Minimum {label} version {} specified in package.json",
        report.declared_minimum
    );

    if report.is_compatible() {
        println!("No errors found");
    } else {
        eprintln!("Dependency errors found:");
        for violation in &report.violations {
            eprintln!(
                "- Package {} requires {label} version {}",
                violation.package, violation.constraint
            );
        }
    }

    eprintln!("Combined {label} range from dependencies {}", report.combined);
    match &report.combined_minimum {
        Some(version) => eprintln!("Minimum {label} version from dependencies {version}"),
        None => eprintln!("No compatible minimum {label} version in dependencies!"),
    }
}
