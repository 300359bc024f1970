//! Parser trait definition

use crate::parser::types::EngineConstraint;

/// Trait for extracting engine constraints from a lockfile
pub trait Parser {
    /// Parse the content and extract every package's engine constraint
    fn parse(&self, content: &str) -> Result<Vec<EngineConstraint>, ParseError>;
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to parse the file structure
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    /// Invalid JSON in the manifest
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}
