//! Parser layer
//! - traits.rs: Parser trait definition
//! - types.rs: Common types (EngineConstraint)
//! - package_json.rs: package.json manifest reader
//! - pnpm_lock.rs: pnpm-lock.yaml engine constraint parser

pub mod package_json;
pub mod pnpm_lock;
pub mod traits;
pub mod types;

pub use package_json::Manifest;
pub use pnpm_lock::PnpmLockParser;
pub use traits::{ParseError, Parser};
pub use types::EngineConstraint;
