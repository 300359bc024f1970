//! Common types for parsers

use serde::Serialize;

/// An engine constraint declared by one locked package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConstraint {
    /// Package key as written in the lockfile (`vite@5.0.0`, `/@babel/core@7.24.0`)
    pub package: String,
    /// Range string, e.g. `^18.0.0 || >=20.0.0`
    pub range: String,
    /// Whether the lockfile marks the package as dev-only
    pub dev: bool,
}
