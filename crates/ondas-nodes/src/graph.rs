//! User-facing graph construction.
//!
//! [`AudioGraph`] wraps a [`ProxyGraph`] with the node catalog: nodes are
//! added from validated options, connections are checked against the node
//! type's endpoints, and the disconnect variants decide which wiring records
//! to drop.
//!
//! # Disconnect policies
//!
//! | Method | Removes | Errors |
//! |---|---|---|
//! | [`disconnect`](AudioGraph::disconnect) | every connection of the source | none |
//! | [`disconnect_output`](AudioGraph::disconnect_output) | connections from one output | `IndexSize` |
//! | [`disconnect_from`](AudioGraph::disconnect_from) | connections into a node's inputs | `InvalidAccess` if none |
//! | [`disconnect_param`](AudioGraph::disconnect_param) | connections into one param | `InvalidAccess` if none |
//! | [`disconnect_exact`](AudioGraph::disconnect_exact) | one output to one input | `IndexSize`, `InvalidAccess` if none |

use std::rc::Rc;

use ondas_core::{
    AudioBuffer, CapabilityCache, NodeId, ProxyGraph, RenderError, SharedGraph, Target,
    WiringRecord, render_offline,
};

use crate::error::NodeError;
use crate::factory::NodeFactory;
use crate::kind::NodeKind;
use crate::options::{
    BiquadFilterOptions, BufferSourceOptions, ConstantSourceOptions, DelayOptions, GainOptions,
    NodeOptions, OscillatorOptions, StereoPannerOptions, WaveShaperOptions,
};
use crate::renderers::{CatalogRenderer, DestinationRenderer};

/// An editable audio graph over the node catalog.
///
/// # Example
///
/// ```rust,ignore
/// use ondas_nodes::{AudioGraph, OscillatorOptions, GainOptions};
///
/// let mut graph = AudioGraph::new();
/// let osc = graph.oscillator(OscillatorOptions::default())?;
/// let amp = graph.gain(GainOptions { gain: 0.5 })?;
/// graph.connect(osc, amp)?;
/// graph.connect(amp, graph.destination())?;
///
/// let buffer = futures::executor::block_on(graph.render(engine))?;
/// ```
pub struct AudioGraph<E: NodeFactory> {
    graph: SharedGraph<E>,
    destination: NodeId,
}

impl<E: NodeFactory> Default for AudioGraph<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: NodeFactory> AudioGraph<E> {
    /// Creates a graph holding only the destination node.
    pub fn new() -> Self {
        let mut graph = ProxyGraph::new();
        let destination = graph.add_node(
            NodeKind::Destination.id(),
            NodeKind::Destination.shape(),
            Rc::new(DestinationRenderer),
        );
        Self {
            graph: graph.into_shared(),
            destination,
        }
    }

    /// The node standing for the engine's output.
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// The underlying proxy graph.
    pub fn proxy(&self) -> &SharedGraph<E> {
        &self.graph
    }

    /// Number of nodes, destination included.
    pub fn node_count(&self) -> usize {
        self.graph.borrow().node_count()
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.graph.borrow().edge_count()
    }

    /// The type of `node`.
    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.graph.borrow().label(node).and_then(NodeKind::from_id)
    }

    // --- Nodes ---

    /// Validates `options` and adds a node built from them.
    pub fn add(&mut self, options: impl Into<NodeOptions>) -> Result<NodeId, NodeError> {
        let options = options.into();
        options.validate()?;
        let kind = options.kind();
        let id = self.graph.borrow_mut().add_node(
            kind.id(),
            kind.shape(),
            Rc::new(CatalogRenderer::new(options)),
        );
        Ok(id)
    }

    /// Adds a gain node.
    pub fn gain(&mut self, options: GainOptions) -> Result<NodeId, NodeError> {
        self.add(options)
    }

    /// Adds a constant source node.
    pub fn constant_source(&mut self, options: ConstantSourceOptions) -> Result<NodeId, NodeError> {
        self.add(options)
    }

    /// Adds an oscillator node.
    pub fn oscillator(&mut self, options: OscillatorOptions) -> Result<NodeId, NodeError> {
        self.add(options)
    }

    /// Adds a buffer source node.
    pub fn buffer_source(&mut self, options: BufferSourceOptions) -> Result<NodeId, NodeError> {
        self.add(options)
    }

    /// Adds a delay node.
    pub fn delay(&mut self, options: DelayOptions) -> Result<NodeId, NodeError> {
        self.add(options)
    }

    /// Adds a biquad filter node.
    pub fn biquad_filter(&mut self, options: BiquadFilterOptions) -> Result<NodeId, NodeError> {
        self.add(options)
    }

    /// Adds a wave shaper node.
    pub fn wave_shaper(&mut self, options: WaveShaperOptions) -> Result<NodeId, NodeError> {
        self.add(options)
    }

    /// Adds a stereo panner node.
    pub fn stereo_panner(&mut self, options: StereoPannerOptions) -> Result<NodeId, NodeError> {
        self.add(options)
    }

    // --- Connections ---

    /// Connects output 0 of `source` to input 0 of `destination`.
    pub fn connect(&mut self, source: NodeId, destination: NodeId) -> Result<(), NodeError> {
        self.connect_output(source, 0, destination, 0)
    }

    /// Connects `output` of `source` to `input` of `destination`.
    pub fn connect_output(
        &mut self,
        source: NodeId,
        output: u32,
        destination: NodeId,
        input: u32,
    ) -> Result<(), NodeError> {
        self.graph.borrow_mut().wire(
            source,
            output,
            Target::Input {
                node: destination,
                input,
            },
        )?;
        Ok(())
    }

    /// Connects `output` of `source` to the param `param` of `destination`.
    pub fn connect_param(
        &mut self,
        source: NodeId,
        output: u32,
        destination: NodeId,
        param: &str,
    ) -> Result<(), NodeError> {
        let mut graph = self.graph.borrow_mut();
        let param = graph
            .shape(destination)
            .and_then(|shape| shape.param(param))
            .ok_or_else(|| {
                NodeError::InvalidAccess(format!("{destination} has no param named '{param}'"))
            })?;
        graph.wire(
            source,
            output,
            Target::Param {
                node: destination,
                param,
            },
        )?;
        Ok(())
    }

    // --- Disconnections ---

    /// Removes every connection leaving `source`. Returns how many were removed.
    pub fn disconnect(&mut self, source: NodeId) -> Result<usize, NodeError> {
        self.outputs(source)?;
        Ok(self.graph.borrow_mut().unwire(source))
    }

    /// Removes every connection leaving `output` of `source`.
    pub fn disconnect_output(&mut self, source: NodeId, output: u32) -> Result<usize, NodeError> {
        self.check_output(source, output)?;
        Ok(self
            .graph
            .borrow_mut()
            .unwire_where(source, |record| record.output == output))
    }

    /// Removes every connection from `source` into an input of `destination`.
    pub fn disconnect_from(
        &mut self,
        source: NodeId,
        destination: NodeId,
    ) -> Result<usize, NodeError> {
        self.unwire_existing(source, |record| {
            matches!(record.target, Target::Input { node, .. } if node == destination)
        })
    }

    /// Removes every connection from `source` into the param `param` of
    /// `destination`.
    pub fn disconnect_param(
        &mut self,
        source: NodeId,
        destination: NodeId,
        param: &str,
    ) -> Result<usize, NodeError> {
        self.unwire_existing(source, |record| {
            matches!(record.target, Target::Param { node, param: p } if node == destination && p == param)
        })
    }

    /// Removes the connections from `output` of `source` into `input` of
    /// `destination`.
    pub fn disconnect_exact(
        &mut self,
        source: NodeId,
        output: u32,
        destination: NodeId,
        input: u32,
    ) -> Result<usize, NodeError> {
        self.check_output(source, output)?;
        let inputs = self
            .graph
            .borrow()
            .shape(destination)
            .map(|shape| shape.inputs)
            .ok_or_else(|| NodeError::InvalidAccess(format!("{destination} not in this graph")))?;
        if input >= inputs {
            return Err(NodeError::IndexSize {
                index: input,
                count: inputs,
            });
        }
        self.unwire_existing(source, |record| {
            record.output == output && record.target == Target::Input { node: destination, input }
        })
    }

    // --- Rendering ---

    /// Renders the graph into `engine` using the process-wide capability
    /// cache.
    pub async fn render(&self, engine: E) -> Result<AudioBuffer, RenderError> {
        self.render_with(engine, CapabilityCache::global()).await
    }

    /// Renders the graph into `engine` using `capabilities`.
    pub async fn render_with(
        &self,
        engine: E,
        capabilities: &CapabilityCache,
    ) -> Result<AudioBuffer, RenderError> {
        render_offline(&self.graph, self.destination, engine, capabilities).await
    }

    fn outputs(&self, node: NodeId) -> Result<u32, NodeError> {
        self.graph
            .borrow()
            .shape(node)
            .map(|shape| shape.outputs)
            .ok_or_else(|| NodeError::InvalidAccess(format!("{node} not in this graph")))
    }

    fn check_output(&self, node: NodeId, output: u32) -> Result<(), NodeError> {
        let outputs = self.outputs(node)?;
        if output >= outputs {
            return Err(NodeError::IndexSize {
                index: output,
                count: outputs,
            });
        }
        Ok(())
    }

    fn unwire_existing(
        &mut self,
        source: NodeId,
        predicate: impl FnMut(&WiringRecord) -> bool,
    ) -> Result<usize, NodeError> {
        self.outputs(source)?;
        let removed = self.graph.borrow_mut().unwire_where(source, predicate);
        if removed == 0 {
            return Err(NodeError::InvalidAccess(format!(
                "{source} is not connected to the given destination"
            )));
        }
        Ok(removed)
    }
}

impl<E: NodeFactory> std::fmt::Debug for AudioGraph<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioGraph")
            .field("nodes", &self.node_count())
            .field("connections", &self.connection_count())
            .finish()
    }
}
