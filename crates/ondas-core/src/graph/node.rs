//! Proxy node types for the wiring model.
//!
//! Each proxy node in a [`ProxyGraph`](super::ProxyGraph) has a [`NodeId`], a
//! type label, a [`NodeShape`] describing its connectable endpoints, and the
//! renderer that knows how to realize it natively. `NodeData` bundles those with
//! the adjacency lists used for traversal.

use std::fmt;
use std::rc::Rc;

use crate::native::NativeEngine;
use crate::render::NodeRenderer;

use super::edge::EdgeId;

/// Unique identifier for a proxy node.
///
/// Node IDs are assigned sequentially and never reused within a graph instance.
/// Identity is the index, never the node's contents: two gain nodes with equal
/// options are still two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Connectable endpoints of a proxy node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeShape {
    /// Number of inputs.
    pub inputs: u32,
    /// Number of outputs.
    pub outputs: u32,
    /// Names of the audio params that accept connections.
    pub params: Vec<&'static str>,
}

impl NodeShape {
    /// A shape with the given input and output counts and no params.
    pub fn new(inputs: u32, outputs: u32) -> Self {
        Self {
            inputs,
            outputs,
            params: Vec::new(),
        }
    }

    /// Adds connectable params.
    pub fn with_params(mut self, params: &[&'static str]) -> Self {
        self.params.extend_from_slice(params);
        self
    }

    /// Looks up a param by name, returning the canonical `'static` name.
    pub fn param(&self, name: &str) -> Option<&'static str> {
        self.params.iter().copied().find(|p| *p == name)
    }
}

/// Internal bookkeeping for a proxy node.
pub(crate) struct NodeData<E: NativeEngine> {
    pub label: &'static str,
    pub shape: NodeShape,
    pub renderer: Rc<dyn NodeRenderer<E>>,
    /// Edges terminating at this node (inputs and params), in insertion order.
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this node, in insertion order.
    pub outgoing: Vec<EdgeId>,
}

impl<E: NativeEngine> NodeData<E> {
    pub fn new(label: &'static str, shape: NodeShape, renderer: Rc<dyn NodeRenderer<E>>) -> Self {
        Self {
            label,
            shape,
            renderer,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }
}
