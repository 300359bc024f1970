//! Shared test utilities

pub mod project;

pub use project::ProjectDir;
