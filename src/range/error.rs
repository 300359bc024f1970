use thiserror::Error;

use crate::range::types::BoundDirection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid range {range:?}: {reason}")]
    InvalidRange { range: String, reason: String },

    /// A clause handed to merge/intersect carries more than one comparator
    /// for the same bound direction.
    #[error("Clause must have at most one {direction} comparator, found: {clause}")]
    MalformedClause {
        direction: BoundDirection,
        clause: String,
    },
}
