//! Wiring records for the proxy graph.
//!
//! A [`WiringRecord`] connects one output of a source node to either an input
//! of a destination node or one of its audio params. Records carry no native
//! objects; the render coordinator turns them into native connections.

use std::fmt;

use super::node::NodeId;

/// Unique identifier for a wiring record.
///
/// An ID is unique among the live records of a graph. The ID of a removed
/// record may be handed to a later one; insertion order is kept by the
/// per-node record lists, not by ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// The receiving end of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// An input of a node.
    Input {
        /// Destination node.
        node: NodeId,
        /// Input index.
        input: u32,
    },
    /// An audio param of a node.
    Param {
        /// Node owning the param.
        node: NodeId,
        /// Param name, as declared in the node's shape.
        param: &'static str,
    },
}

impl Target {
    /// Input 0 of `node`.
    pub fn node(node: NodeId) -> Self {
        Self::Input { node, input: 0 }
    }

    /// The node this target belongs to.
    pub fn owner(&self) -> NodeId {
        match *self {
            Self::Input { node, .. } | Self::Param { node, .. } => node,
        }
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Self::node(node)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input { node, input } => write!(f, "{node}[{input}]"),
            Self::Param { node, param } => write!(f, "{node}.{param}"),
        }
    }
}

/// A directed connection between two proxy endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WiringRecord {
    /// Record identifier (insertion order).
    pub id: EdgeId,
    /// Source node.
    pub source: NodeId,
    /// Output index on the source node.
    pub output: u32,
    /// Receiving endpoint.
    pub target: Target,
}

impl fmt::Display for WiringRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] → {}", self.source, self.output, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_owner() {
        assert_eq!(Target::node(NodeId(4)).owner(), NodeId(4));
        let param = Target::Param {
            node: NodeId(7),
            param: "frequency",
        };
        assert_eq!(param.owner(), NodeId(7));
    }

    #[test]
    fn record_display() {
        let record = WiringRecord {
            id: EdgeId(0),
            source: NodeId(1),
            output: 0,
            target: Target::Input {
                node: NodeId(2),
                input: 1,
            },
        };
        assert_eq!(record.to_string(), "NodeId(1)[0] → NodeId(2)[1]");
    }
}
