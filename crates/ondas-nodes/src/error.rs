//! Error types for node construction and connection management.

use ondas_core::GraphError;
use thiserror::Error;

/// Errors raised by the node layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NodeError {
    /// Options rejected by a node type's validation.
    #[error("invalid {kind} options: {reason}")]
    InvalidOptions {
        /// Node type id.
        kind: &'static str,
        /// Description of the problem.
        reason: String,
    },

    /// An output or input index is out of range for the node.
    #[error("index {index} out of range (count {count})")]
    IndexSize {
        /// The offending index.
        index: u32,
        /// Number of valid indices.
        count: u32,
    },

    /// The connection or endpoint does not exist.
    #[error("invalid access: {0}")]
    InvalidAccess(String),

    /// No node type has this id.
    #[error("unknown node type: {0}")]
    UnknownType(String),
}

impl NodeError {
    /// Create an [`NodeError::InvalidOptions`] error.
    pub fn invalid_options(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            kind,
            reason: reason.into(),
        }
    }
}

impl From<GraphError> for NodeError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::OutputOutOfRange { output, count, .. } => Self::IndexSize {
                index: output,
                count,
            },
            GraphError::InputOutOfRange { input, count, .. } => Self::IndexSize {
                index: input,
                count,
            },
            GraphError::NodeNotFound(_) | GraphError::UnknownParam { .. } => {
                Self::InvalidAccess(error.to_string())
            }
        }
    }
}
