//! Proxy graph: node arena plus connect/disconnect bookkeeping.
//!
//! [`ProxyGraph`] is pure topology. It records which output of which proxy node
//! feeds which input or param, in insertion order, and never holds a native
//! object. The render coordinator reads it through
//! [`records_into()`](ProxyGraph::records_into), which returns an owned snapshot
//! so the graph can keep changing while a render pass is suspended.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::GraphError;
use crate::native::NativeEngine;
use crate::render::NodeRenderer;

use super::edge::{EdgeId, Target, WiringRecord};
use super::node::{NodeData, NodeId, NodeShape};

/// A proxy graph shared between the construction API and render sessions.
///
/// Borrows are short-lived: nothing holds a borrow across an await point.
pub type SharedGraph<E> = Rc<RefCell<ProxyGraph<E>>>;

/// Arena of proxy nodes and the wiring records between them.
///
/// # Usage
///
/// 1. Add nodes with [`add_node()`](Self::add_node)
/// 2. Record connections with [`wire()`](Self::wire)
/// 3. Remove connections with [`unwire()`](Self::unwire) or
///    [`unwire_where()`](Self::unwire_where)
/// 4. Render through a [`RenderSession`](crate::render::RenderSession)
///
/// Slots of removed records go on a free list and are reused by later
/// [`wire()`](Self::wire) calls, so a graph rewired many times does not grow.
pub struct ProxyGraph<E: NativeEngine> {
    nodes: Vec<NodeData<E>>,
    edges: Vec<Option<WiringRecord>>,
    free: Vec<EdgeId>,
}

impl<E: NativeEngine> Default for ProxyGraph<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: NativeEngine> ProxyGraph<E> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Wraps the graph for shared single-threaded access.
    pub fn into_shared(self) -> SharedGraph<E> {
        Rc::new(RefCell::new(self))
    }

    // --- Node mutations ---

    /// Adds a proxy node. Returns the new node's ID.
    ///
    /// `label` names the node type in logs and errors.
    pub fn add_node(
        &mut self,
        label: &'static str,
        shape: NodeShape,
        renderer: Rc<dyn NodeRenderer<E>>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(label, shape, renderer));
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {label} node {id}");
        id
    }

    // --- Wiring ---

    /// Appends a wiring record from `source`'s `output` to `target`.
    ///
    /// Repeated calls with the same arguments create parallel signal paths;
    /// nothing is de-duplicated. Only generic shape checks are applied: both
    /// nodes exist, `output` and the input index or param name are declared
    /// in the node shapes.
    pub fn wire(
        &mut self,
        source: NodeId,
        output: u32,
        target: Target,
    ) -> Result<EdgeId, GraphError> {
        let outputs = self.node(source)?.shape.outputs;
        if output >= outputs {
            return Err(GraphError::OutputOutOfRange {
                node: source,
                output,
                count: outputs,
            });
        }

        let destination = target.owner();
        let shape = &self.node(destination)?.shape;
        match target {
            Target::Input { input, .. } if input >= shape.inputs => {
                return Err(GraphError::InputOutOfRange {
                    node: destination,
                    input,
                    count: shape.inputs,
                });
            }
            Target::Param { param, .. } if shape.param(param).is_none() => {
                return Err(GraphError::UnknownParam {
                    node: destination,
                    param: param.to_string(),
                });
            }
            _ => {}
        }

        let id = self.free.pop().unwrap_or_else(|| {
            self.edges.push(None);
            EdgeId(self.edges.len() as u32 - 1)
        });
        let record = WiringRecord {
            id,
            source,
            output,
            target,
        };
        self.edges[id.0 as usize] = Some(record);
        self.nodes[source.0 as usize].outgoing.push(id);
        self.nodes[destination.0 as usize].incoming.push(id);

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_wire: {record}");
        Ok(id)
    }

    /// Removes every record whose source is `source`.
    ///
    /// Returns the number of records removed (0 for unknown nodes).
    pub fn unwire(&mut self, source: NodeId) -> usize {
        self.unwire_where(source, |_| true)
    }

    /// Removes the records of `source` for which `predicate` returns true.
    ///
    /// Which edges a disconnect call should drop (by destination, by output
    /// index, or both) is decided by the caller; this is the primitive.
    pub fn unwire_where(
        &mut self,
        source: NodeId,
        mut predicate: impl FnMut(&WiringRecord) -> bool,
    ) -> usize {
        let Some(node) = self.nodes.get(source.0 as usize) else {
            return 0;
        };

        let doomed: Vec<WiringRecord> = node
            .outgoing
            .iter()
            .filter_map(|id| self.edges[id.0 as usize])
            .filter(|record| predicate(record))
            .collect();

        for record in &doomed {
            self.edges[record.id.0 as usize] = None;
            self.free.push(record.id);
            self.nodes[source.0 as usize]
                .outgoing
                .retain(|id| *id != record.id);
            self.nodes[record.target.owner().0 as usize]
                .incoming
                .retain(|id| *id != record.id);
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_unwire: {record}");
        }
        doomed.len()
    }

    // --- Queries ---

    /// All records terminating at an input or param of `node`, in insertion
    /// order.
    ///
    /// The result is an owned snapshot; later mutations do not affect it.
    pub fn records_into(&self, node: NodeId) -> Vec<WiringRecord> {
        self.nodes
            .get(node.0 as usize)
            .map(|n| self.collect(&n.incoming))
            .unwrap_or_default()
    }

    /// All records leaving `node`, in insertion order.
    pub fn records_from(&self, node: NodeId) -> Vec<WiringRecord> {
        self.nodes
            .get(node.0 as usize)
            .map(|n| self.collect(&n.outgoing))
            .unwrap_or_default()
    }

    /// The renderer registered for `node`.
    pub fn renderer(&self, node: NodeId) -> Option<Rc<dyn NodeRenderer<E>>> {
        self.nodes
            .get(node.0 as usize)
            .map(|n| Rc::clone(&n.renderer))
    }

    /// The type label of `node`.
    pub fn label(&self, node: NodeId) -> Option<&'static str> {
        self.nodes.get(node.0 as usize).map(|n| n.label)
    }

    /// The connectable endpoints of `node`.
    pub fn shape(&self, node: NodeId) -> Option<&NodeShape> {
        self.nodes.get(node.0 as usize).map(|n| &n.shape)
    }

    /// Returns true if `node` belongs to this graph.
    pub fn contains(&self, node: NodeId) -> bool {
        (node.0 as usize) < self.nodes.len()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of live wiring records.
    pub fn edge_count(&self) -> usize {
        self.edges.len() - self.free.len()
    }

    /// Iterates over all node IDs in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<E> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    fn node(&self, id: NodeId) -> Result<&NodeData<E>, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn collect(&self, ids: &[EdgeId]) -> Vec<WiringRecord> {
        ids.iter()
            .filter_map(|id| self.edges[id.0 as usize])
            .collect()
    }
}
