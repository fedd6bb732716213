//! Stub native engine and renderers shared by the integration suites.
//!
//! The stub engine records every call it receives, so tests can assert on
//! creation order, connection order and listener attachment. Node output is
//! evaluated at `start_rendering`: generator nodes emit fixed data, every
//! other node sums its inputs.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use ondas_core::{
    AudioBuffer, CompletionFuture, CompletionListener, EngineError, NativeEngine, NodeId,
    NodeRenderer, NodeShape, ProxyGraph, RenderRequest, Rendered, SharedGraph,
};

pub const LENGTH: usize = 4;
pub const SAMPLE_RATE: f32 = 44100.0;

/// Native node handle of the stub engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StubNode {
    pub id: u32,
    pub label: &'static str,
}

/// Everything the stub engine was asked to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Create(&'static str),
    Connect {
        from: &'static str,
        output: u32,
        to: &'static str,
        input: u32,
    },
    ConnectParam {
        from: &'static str,
        to: &'static str,
        param: String,
    },
    Disconnect(&'static str),
    Listener,
    Start,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// `start_rendering` returns a completion future.
    Future,
    /// Completion is only reported to the listener, right away.
    Event,
    /// Completion is only reported to the listener, when the test calls
    /// [`StubEngine::fire`].
    ManualEvent,
    /// `probe_instance` fails.
    Unprobeable,
}

struct NodeState {
    label: &'static str,
    data: Option<Vec<f32>>,
    inputs: Vec<u32>,
}

pub struct StubEngine {
    flavor: &'static str,
    style: Style,
    nodes: RefCell<Vec<NodeState>>,
    calls: RefCell<Vec<Call>>,
    listener: RefCell<Option<CompletionListener>>,
    rendered: RefCell<Option<AudioBuffer>>,
    started: Cell<bool>,
    probes: Rc<Cell<usize>>,
}

impl StubEngine {
    pub fn new(style: Style) -> Self {
        let flavor = match style {
            Style::Future => "stub-future",
            Style::Event => "stub-event",
            Style::ManualEvent => "stub-manual",
            Style::Unprobeable => "stub-unprobeable",
        };
        Self::with_flavor(style, flavor)
    }

    pub fn with_flavor(style: Style, flavor: &'static str) -> Self {
        Self {
            flavor,
            style,
            nodes: RefCell::new(vec![NodeState {
                label: "destination",
                data: None,
                inputs: Vec::new(),
            }]),
            calls: RefCell::new(Vec::new()),
            listener: RefCell::new(None),
            rendered: RefCell::new(None),
            started: Cell::new(false),
            probes: Rc::new(Cell::new(0)),
        }
    }

    /// Creates a native node. `data` makes it a generator; `None` sums inputs.
    pub fn create(&self, label: &'static str, data: Option<Vec<f32>>) -> StubNode {
        let mut nodes = self.nodes.borrow_mut();
        let id = nodes.len() as u32;
        nodes.push(NodeState {
            label,
            data,
            inputs: Vec::new(),
        });
        self.calls.borrow_mut().push(Call::Create(label));
        StubNode { id, label }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Labels of created nodes, in creation order.
    pub fn created(&self) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    /// `(from, to)` pairs of input connections, in call order.
    pub fn connections(&self) -> Vec<(&'static str, &'static str)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Connect { from, to, .. } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub fn listener_attached(&self) -> bool {
        self.calls().contains(&Call::Listener)
    }

    /// Number of probe instances created from this engine.
    pub fn probe_count(&self) -> usize {
        self.probes.get()
    }

    /// Fires the completion listener of a [`Style::ManualEvent`] engine.
    pub fn fire(&self) {
        let listener = self.listener.borrow_mut().take();
        let buffer = self.rendered.borrow_mut().take();
        if let (Some(listener), Some(buffer)) = (listener, buffer) {
            listener(Ok(buffer));
        }
    }

    fn label(&self, id: u32) -> &'static str {
        self.nodes.borrow()[id as usize].label
    }

    fn evaluate(&self, id: u32, seen: &mut HashSet<u32>) -> Vec<f32> {
        let mut out = vec![0.0; LENGTH];
        if !seen.insert(id) {
            return out;
        }
        let (data, inputs) = {
            let nodes = self.nodes.borrow();
            let node = &nodes[id as usize];
            (node.data.clone(), node.inputs.clone())
        };
        match data {
            Some(mut data) => {
                data.resize(LENGTH, 0.0);
                out = data;
            }
            None => {
                for input in inputs {
                    for (o, s) in out.iter_mut().zip(self.evaluate(input, seen)) {
                        *o += s;
                    }
                }
            }
        }
        seen.remove(&id);
        out
    }
}

impl NativeEngine for StubEngine {
    type Node = StubNode;

    fn flavor(&self) -> &'static str {
        self.flavor
    }

    fn sample_rate(&self) -> f32 {
        SAMPLE_RATE
    }

    fn length(&self) -> usize {
        LENGTH
    }

    fn number_of_channels(&self) -> usize {
        1
    }

    fn destination(&self) -> StubNode {
        StubNode {
            id: 0,
            label: "destination",
        }
    }

    fn connect(
        &self,
        source: &StubNode,
        output: u32,
        destination: &StubNode,
        input: u32,
    ) -> Result<(), EngineError> {
        if destination.id as usize >= self.nodes.borrow().len() {
            return Err(EngineError::invalid_access("foreign node"));
        }
        self.nodes.borrow_mut()[destination.id as usize]
            .inputs
            .push(source.id);
        self.calls.borrow_mut().push(Call::Connect {
            from: self.label(source.id),
            output,
            to: self.label(destination.id),
            input,
        });
        Ok(())
    }

    fn connect_param(
        &self,
        source: &StubNode,
        _output: u32,
        destination: &StubNode,
        param: &str,
    ) -> Result<(), EngineError> {
        if param == "locked" {
            return Err(EngineError::invalid_access("param is locked"));
        }
        self.calls.borrow_mut().push(Call::ConnectParam {
            from: self.label(source.id),
            to: self.label(destination.id),
            param: param.to_string(),
        });
        Ok(())
    }

    fn disconnect(&self, source: &StubNode) -> Result<(), EngineError> {
        for node in self.nodes.borrow_mut().iter_mut() {
            node.inputs.retain(|id| *id != source.id);
        }
        self.calls
            .borrow_mut()
            .push(Call::Disconnect(self.label(source.id)));
        Ok(())
    }

    fn has_active_output(&self) -> bool {
        !self.nodes.borrow()[0].inputs.is_empty()
    }

    fn create_silent_node(&self) -> Result<StubNode, EngineError> {
        Ok(self.create("silence", Some(vec![0.0; LENGTH])))
    }

    fn set_oncomplete(&self, listener: CompletionListener) {
        self.calls.borrow_mut().push(Call::Listener);
        *self.listener.borrow_mut() = Some(listener);
    }

    fn start_rendering(&self) -> Result<Option<CompletionFuture>, EngineError> {
        if self.started.replace(true) {
            return Err(EngineError::invalid_state("already started"));
        }
        self.calls.borrow_mut().push(Call::Start);
        let buffer =
            AudioBuffer::from_channels(vec![self.evaluate(0, &mut HashSet::new())], SAMPLE_RATE);

        match self.style {
            Style::Future => Ok(Some(async move { Ok(buffer) }.boxed_local())),
            Style::Event | Style::Unprobeable => {
                // Event engines never complete with nothing feeding the output.
                if self.has_active_output() {
                    if let Some(listener) = self.listener.borrow_mut().take() {
                        listener(Ok(buffer));
                    }
                }
                Ok(None)
            }
            Style::ManualEvent => {
                *self.rendered.borrow_mut() = Some(buffer);
                Ok(None)
            }
        }
    }

    fn probe_instance(&self) -> Result<Self, EngineError> {
        if self.style == Style::Unprobeable {
            return Err(EngineError::not_supported("probing"));
        }
        self.probes.set(self.probes.get() + 1);
        let mut probe = Self::with_flavor(self.style, self.flavor);
        probe.probes = Rc::clone(&self.probes);
        Ok(probe)
    }
}

/// Order in which renderers were invoked, by label.
pub type RenderLog = Rc<RefCell<Vec<&'static str>>>;

/// Creates a stub native node named after the proxy node.
pub struct StubRenderer {
    pub label: &'static str,
    pub data: Option<Vec<f32>>,
    pub log: RenderLog,
}

impl NodeRenderer<StubEngine> for StubRenderer {
    fn render(
        &self,
        request: RenderRequest<'_, StubEngine>,
    ) -> Result<Rendered<StubNode>, EngineError> {
        self.log.borrow_mut().push(self.label);
        Ok(Rendered::Ready(
            request.engine.create(self.label, self.data.clone()),
        ))
    }
}

/// Stands for the engine's own destination.
pub struct DestinationRenderer {
    pub log: RenderLog,
}

impl NodeRenderer<StubEngine> for DestinationRenderer {
    fn render(
        &self,
        request: RenderRequest<'_, StubEngine>,
    ) -> Result<Rendered<StubNode>, EngineError> {
        self.log.borrow_mut().push("destination");
        Ok(request.engine.destination().into())
    }
}

/// Creates its node only after the gate opens.
pub struct GatedRenderer {
    pub label: &'static str,
    pub gate: RefCell<Option<oneshot::Receiver<()>>>,
    pub log: RenderLog,
}

impl NodeRenderer<StubEngine> for GatedRenderer {
    fn render(
        &self,
        request: RenderRequest<'_, StubEngine>,
    ) -> Result<Rendered<StubNode>, EngineError> {
        self.log.borrow_mut().push(self.label);
        let gate = self
            .gate
            .borrow_mut()
            .take()
            .ok_or_else(|| EngineError::invalid_state("gate already used"))?;
        let engine = Rc::clone(request.engine);
        let label = self.label;
        Ok(Rendered::Pending(
            async move {
                gate.await
                    .map_err(|_| EngineError::invalid_state("gate dropped"))?;
                Ok(engine.create(label, None))
            }
            .boxed_local(),
        ))
    }
}

/// Always fails.
pub struct FailingRenderer {
    pub log: RenderLog,
}

impl NodeRenderer<StubEngine> for FailingRenderer {
    fn render(
        &self,
        _request: RenderRequest<'_, StubEngine>,
    ) -> Result<Rendered<StubNode>, EngineError> {
        self.log.borrow_mut().push("failing");
        Err(EngineError::not_supported("FailingNode"))
    }
}

/// A proxy graph over the stub engine plus the shared render log.
pub struct Harness {
    pub graph: SharedGraph<StubEngine>,
    pub log: RenderLog,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            graph: ProxyGraph::new().into_shared(),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A pass-through node with four inputs, one output and a `gain` param.
    pub fn node(&self, label: &'static str) -> NodeId {
        self.add(label, None)
    }

    /// A generator node emitting `data`.
    pub fn source(&self, label: &'static str, data: Vec<f32>) -> NodeId {
        self.add(label, Some(data))
    }

    pub fn destination(&self) -> NodeId {
        self.graph.borrow_mut().add_node(
            "destination",
            NodeShape::new(1, 0),
            Rc::new(DestinationRenderer {
                log: Rc::clone(&self.log),
            }),
        )
    }

    pub fn gated(&self, label: &'static str) -> (NodeId, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let id = self.graph.borrow_mut().add_node(
            label,
            NodeShape::new(4, 1),
            Rc::new(GatedRenderer {
                label,
                gate: RefCell::new(Some(rx)),
                log: Rc::clone(&self.log),
            }),
        );
        (id, tx)
    }

    pub fn failing(&self) -> NodeId {
        self.graph.borrow_mut().add_node(
            "failing",
            NodeShape::new(4, 1),
            Rc::new(FailingRenderer {
                log: Rc::clone(&self.log),
            }),
        )
    }

    /// Wires output 0 of `from` into input 0 of `to`.
    pub fn wire(&self, from: NodeId, to: NodeId) {
        self.graph
            .borrow_mut()
            .wire(from, 0, to.into())
            .expect("wire");
    }

    pub fn log(&self) -> Vec<&'static str> {
        self.log.borrow().clone()
    }

    /// How many times the renderer of `label` ran.
    pub fn renders_of(&self, label: &str) -> usize {
        self.log.borrow().iter().filter(|l| **l == label).count()
    }

    fn add(&self, label: &'static str, data: Option<Vec<f32>>) -> NodeId {
        self.graph.borrow_mut().add_node(
            label,
            NodeShape::new(4, 1).with_params(&["gain", "locked"]),
            Rc::new(StubRenderer {
                label,
                data,
                log: Rc::clone(&self.log),
            }),
        )
    }
}
