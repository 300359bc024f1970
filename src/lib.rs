//! Engine compatibility checking for locked dependency trees
//!
//! - [`range`]: version-range algebra (simplify, intersect, reduce)
//! - [`parser`]: package.json and pnpm-lock.yaml readers
//! - [`check`]: compares the declared engine minimum with every constraint
//! - [`config`]: defaults and the manifest `enginesCheck` block
//! - [`logging`]: tracing subscriber setup for the binary

pub mod check;
pub mod config;
pub mod logging;
pub mod parser;
pub mod range;
