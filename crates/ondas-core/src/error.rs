//! Error types for graph wiring, native engine calls, and render passes.
//!
//! [`RenderError`] and [`EngineError`] are `Clone`: a failed render cache entry
//! hands the same error to every caller awaiting that node.

use std::sync::Arc;

use thiserror::Error;

use crate::graph::{NodeId, WiringRecord};

/// Errors reported by a native engine instance.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// The engine does not implement the requested node type or behavior.
    #[error("not supported: {0}")]
    NotSupported(Arc<str>),

    /// An output, input, or channel index is out of range.
    #[error("index {index} out of range (count {count})")]
    IndexSize {
        /// The offending index.
        index: u32,
        /// Number of valid indices.
        count: u32,
    },

    /// The operation refers to something that does not exist (unknown param,
    /// missing connection, foreign native node).
    #[error("invalid access: {0}")]
    InvalidAccess(Arc<str>),

    /// The engine is in a state that forbids the operation (already rendering,
    /// completion listener dropped, ...).
    #[error("invalid state: {0}")]
    InvalidState(Arc<str>),

    /// Construction options were rejected.
    #[error("invalid options: {0}")]
    InvalidOptions(Arc<str>),
}

impl EngineError {
    /// Create a [`EngineError::NotSupported`] error.
    pub fn not_supported(what: impl Into<Arc<str>>) -> Self {
        Self::NotSupported(what.into())
    }

    /// Create a [`EngineError::InvalidAccess`] error.
    pub fn invalid_access(what: impl Into<Arc<str>>) -> Self {
        Self::InvalidAccess(what.into())
    }

    /// Create a [`EngineError::InvalidState`] error.
    pub fn invalid_state(what: impl Into<Arc<str>>) -> Self {
        Self::InvalidState(what.into())
    }

    /// Create a [`EngineError::InvalidOptions`] error.
    pub fn invalid_options(what: impl Into<Arc<str>>) -> Self {
        Self::InvalidOptions(what.into())
    }
}

/// Errors from proxy graph mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The node is not part of this graph.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The source node has no output with this index.
    #[error("output {output} out of range for {node} ({count} outputs)")]
    OutputOutOfRange {
        /// Source node.
        node: NodeId,
        /// Requested output index.
        output: u32,
        /// Number of outputs of the node.
        count: u32,
    },

    /// The destination node has no input with this index.
    #[error("input {input} out of range for {node} ({count} inputs)")]
    InputOutOfRange {
        /// Destination node.
        node: NodeId,
        /// Requested input index.
        input: u32,
        /// Number of inputs of the node.
        count: u32,
    },

    /// The destination node has no param with this name.
    #[error("{node} has no param named '{param}'")]
    UnknownParam {
        /// Destination node.
        node: NodeId,
        /// Requested param name.
        param: String,
    },
}

/// Errors surfaced by a render pass.
///
/// The caller of a top-level render receives the first failure encountered.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The node has no renderer in the graph being rendered (unknown or
    /// foreign [`NodeId`]).
    #[error("{0} has no renderer in this graph")]
    MissingRenderer(NodeId),

    /// A per-node renderer failed to create its native node.
    #[error("failed to instantiate {kind} node {node}: {source}")]
    Instantiation {
        /// The proxy node being rendered.
        node: NodeId,
        /// The node's type label.
        kind: &'static str,
        /// The native engine failure.
        #[source]
        source: EngineError,
    },

    /// Connecting two rendered native nodes failed.
    #[error("failed to wire {record}: {source}")]
    Wiring {
        /// The wiring record that could not be realized.
        record: WiringRecord,
        /// The native engine failure.
        #[source]
        source: EngineError,
    },

    /// The native engine failed to start or complete rendering.
    #[error("rendering did not complete: {0}")]
    Completion(#[source] EngineError),

    /// The render session was dropped while one of its entries was still
    /// being resolved.
    #[error("render session dropped before the pass completed")]
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeId, Target};

    #[test]
    fn engine_error_constructors() {
        assert!(matches!(
            EngineError::not_supported("ConstantSourceNode"),
            EngineError::NotSupported(ref s) if &**s == "ConstantSourceNode"
        ));
        assert!(matches!(
            EngineError::invalid_state("busy"),
            EngineError::InvalidState(_)
        ));
    }

    #[test]
    fn render_error_display_names_node() {
        let err = RenderError::Instantiation {
            node: NodeId(3),
            kind: "gain",
            source: EngineError::IndexSize { index: 2, count: 1 },
        };
        let msg = err.to_string();
        assert!(msg.contains("gain"), "{msg}");
        assert!(msg.contains("NodeId(3)"), "{msg}");
        assert!(msg.contains("index 2"), "{msg}");
    }

    #[test]
    fn wiring_error_display_names_record() {
        let record = WiringRecord {
            id: EdgeId(0),
            source: NodeId(1),
            output: 0,
            target: Target::Param {
                node: NodeId(2),
                param: "gain",
            },
        };
        let err = RenderError::Wiring {
            record,
            source: EngineError::invalid_access("no such param"),
        };
        assert!(err.to_string().contains("NodeId(2).gain"));
    }

    #[test]
    fn errors_are_sources() {
        use std::error::Error;
        let err = RenderError::Completion(EngineError::invalid_state("listener dropped"));
        assert!(err.source().is_some());
        assert!(RenderError::SessionClosed.source().is_none());
    }
}
