//! The reference offline engine.
//!
//! [`OfflineEngine`] keeps its nodes and connections behind an
//! `Rc<RefCell<..>>` so the completion future it hands out can render after
//! `start_rendering` has returned. Nothing is processed until then: the
//! schedule is compiled from the connections present when rendering runs.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use ondas_core::{AudioBuffer, CompletionFuture, CompletionListener, EngineError, NativeEngine};
use ondas_nodes::{
    BiquadFilterOptions, BufferSourceOptions, ConstantSourceOptions, DelayOptions, GainOptions,
    NodeError, NodeFactory, NodeKind, OscillatorOptions, StereoPannerOptions, WaveShaperOptions,
};

use crate::network::{Connection, NativeNode, Network, Port};
use crate::options::{EngineOptions, EngineProfile};
use crate::processor::{
    BiquadProcessor, BufferPlayer, DelayProcessor, OscillatorProcessor, Processor,
};
use crate::render::render_network;

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a node owned by one [`OfflineEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineNode {
    engine: u64,
    index: usize,
}

impl EngineNode {
    /// Creation index within the engine; the destination is 0.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Offline engine rendering a fixed number of frames.
///
/// # Example
///
/// ```rust,ignore
/// use ondas_engine::{EngineOptions, OfflineEngine};
/// use ondas_nodes::{AudioGraph, OscillatorOptions};
///
/// let engine = OfflineEngine::new(EngineOptions::with_duration(48000.0, 1.0))?;
/// let mut graph = AudioGraph::new();
/// let osc = graph.oscillator(OscillatorOptions::default())?;
/// graph.connect(osc, graph.destination())?;
/// let buffer = futures::executor::block_on(graph.render(engine))?;
/// ```
pub struct OfflineEngine {
    id: u64,
    options: EngineOptions,
    network: Rc<RefCell<Network>>,
    listener: RefCell<Option<CompletionListener>>,
    started: Cell<bool>,
}

impl OfflineEngine {
    /// Creates an engine after validating `options`.
    pub fn new(options: EngineOptions) -> Result<Self, EngineError> {
        options.validate()?;
        Ok(Self {
            id: NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed),
            options,
            network: Rc::new(RefCell::new(Network::new(options.channels))),
            listener: RefCell::new(None),
            started: Cell::new(false),
        })
    }

    /// The options this engine was built with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The engine's behavior family.
    pub fn profile(&self) -> EngineProfile {
        self.options.profile
    }

    /// Number of native nodes, destination included.
    pub fn node_count(&self) -> usize {
        self.network.borrow().nodes.len()
    }

    /// Number of native connections.
    pub fn connection_count(&self) -> usize {
        self.network.borrow().connections.len()
    }

    /// Type label of `node`.
    pub fn label(&self, node: &EngineNode) -> Option<&'static str> {
        let index = self.resolve(node).ok()?;
        Some(self.network.borrow().nodes[index].label)
    }

    /// Returns true once rendering was started.
    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    fn resolve(&self, node: &EngineNode) -> Result<usize, EngineError> {
        if node.engine != self.id || node.index >= self.network.borrow().nodes.len() {
            return Err(EngineError::invalid_access(format!(
                "node #{} belongs to another engine",
                node.index
            )));
        }
        Ok(node.index)
    }

    fn add(&self, node: NativeNode) -> EngineNode {
        let index = self.network.borrow_mut().add(node);
        EngineNode {
            engine: self.id,
            index,
        }
    }

    fn add_kind(&self, kind: NodeKind, processor: Processor, values: &[(&str, f32)]) -> EngineNode {
        self.add(NativeNode::of_kind(kind, processor).with_values(values))
    }
}

fn checked(result: Result<(), NodeError>) -> Result<(), EngineError> {
    result.map_err(|error| EngineError::invalid_options(error.to_string()))
}

impl NativeEngine for OfflineEngine {
    type Node = EngineNode;

    fn flavor(&self) -> &'static str {
        self.options.profile.name()
    }

    fn sample_rate(&self) -> f32 {
        self.options.sample_rate
    }

    fn length(&self) -> usize {
        self.options.length
    }

    fn number_of_channels(&self) -> usize {
        self.options.channels
    }

    fn destination(&self) -> EngineNode {
        EngineNode {
            engine: self.id,
            index: Network::DESTINATION,
        }
    }

    fn connect(
        &self,
        source: &EngineNode,
        output: u32,
        destination: &EngineNode,
        input: u32,
    ) -> Result<(), EngineError> {
        let connection = Connection {
            source: self.resolve(source)?,
            output,
            target: self.resolve(destination)?,
            port: Port::Input(input),
        };
        self.network.borrow_mut().connect(connection)
    }

    fn connect_param(
        &self,
        source: &EngineNode,
        output: u32,
        destination: &EngineNode,
        param: &str,
    ) -> Result<(), EngineError> {
        let source = self.resolve(source)?;
        let target = self.resolve(destination)?;
        let mut network = self.network.borrow_mut();
        let param = network.param_index(target, param)?;
        network.connect(Connection {
            source,
            output,
            target,
            port: Port::Param(param),
        })
    }

    fn disconnect(&self, source: &EngineNode) -> Result<(), EngineError> {
        let source = self.resolve(source)?;
        self.network.borrow_mut().disconnect(source);
        Ok(())
    }

    fn has_active_output(&self) -> bool {
        self.network.borrow().has_active_output()
    }

    fn create_silent_node(&self) -> Result<EngineNode, EngineError> {
        Ok(self.add(NativeNode {
            label: "silence",
            inputs: 0,
            outputs: 1,
            params: Vec::new(),
            processor: Processor::Silence,
        }))
    }

    fn set_oncomplete(&self, listener: CompletionListener) {
        *self.listener.borrow_mut() = Some(listener);
    }

    fn start_rendering(&self) -> Result<Option<CompletionFuture>, EngineError> {
        if self.started.replace(true) {
            return Err(EngineError::invalid_state("rendering already started"));
        }
        let options = self.options;

        match options.profile {
            EngineProfile::Modern => {
                let network = Rc::clone(&self.network);
                let rendering = async move {
                    let rendered = render_network(&mut network.borrow_mut(), &options);
                    Ok::<_, EngineError>(rendered)
                };
                Ok(Some(rendering.boxed_local()))
            }
            EngineProfile::Legacy => {
                if !self.has_active_output() {
                    // Keeps the listener; it never fires.
                    #[cfg(feature = "tracing")]
                    tracing::debug!("engine_start: legacy engine has no active output");
                    return Ok(None);
                }
                let rendered: AudioBuffer =
                    render_network(&mut self.network.borrow_mut(), &options);
                let listener = self.listener.borrow_mut().take();
                if let Some(listener) = listener {
                    listener(Ok(rendered));
                }
                Ok(None)
            }
        }
    }

    fn probe_instance(&self) -> Result<Self, EngineError> {
        Self::new(EngineOptions {
            length: 1,
            channels: 1,
            ..self.options
        })
    }
}

impl NodeFactory for OfflineEngine {
    fn create_gain(&self, options: &GainOptions) -> Result<EngineNode, EngineError> {
        checked(options.validate())?;
        Ok(self.add_kind(NodeKind::Gain, Processor::Gain, &[("gain", options.gain)]))
    }

    fn create_constant_source(
        &self,
        options: &ConstantSourceOptions,
    ) -> Result<EngineNode, EngineError> {
        if self.options.profile == EngineProfile::Legacy {
            return Err(EngineError::not_supported("constant source"));
        }
        checked(options.validate())?;
        Ok(self.add_kind(
            NodeKind::ConstantSource,
            Processor::Constant {
                timing: options.timing,
            },
            &[("offset", options.offset)],
        ))
    }

    fn create_oscillator(&self, options: &OscillatorOptions) -> Result<EngineNode, EngineError> {
        checked(options.validate())?;
        Ok(self.add_kind(
            NodeKind::Oscillator,
            Processor::Oscillator(OscillatorProcessor::new(options.waveform, options.timing)),
            &[("frequency", options.frequency), ("detune", options.detune)],
        ))
    }

    fn create_buffer_source(
        &self,
        options: &BufferSourceOptions,
    ) -> Result<EngineNode, EngineError> {
        checked(options.validate())?;
        Ok(self.add_kind(
            NodeKind::BufferSource,
            Processor::BufferSource(BufferPlayer::new(options)),
            &[("playback_rate", options.playback_rate)],
        ))
    }

    fn create_delay(&self, options: &DelayOptions) -> Result<EngineNode, EngineError> {
        checked(options.validate())?;
        Ok(self.add_kind(
            NodeKind::Delay,
            Processor::Delay(DelayProcessor::new(
                options.max_delay_time,
                self.options.sample_rate,
            )),
            &[("delay_time", options.delay_time as f32)],
        ))
    }

    fn create_biquad_filter(
        &self,
        options: &BiquadFilterOptions,
    ) -> Result<EngineNode, EngineError> {
        checked(options.validate())?;
        Ok(self.add_kind(
            NodeKind::BiquadFilter,
            Processor::Biquad(BiquadProcessor::new(options.filter_type)),
            &[
                ("frequency", options.frequency),
                ("q", options.q),
                ("gain", options.gain),
            ],
        ))
    }

    fn create_wave_shaper(&self, options: &WaveShaperOptions) -> Result<EngineNode, EngineError> {
        checked(options.validate())?;
        Ok(self.add_kind(
            NodeKind::WaveShaper,
            Processor::WaveShaper {
                curve: options.curve.clone(),
            },
            &[],
        ))
    }

    fn create_stereo_panner(
        &self,
        options: &StereoPannerOptions,
    ) -> Result<EngineNode, EngineError> {
        checked(options.validate())?;
        Ok(self.add_kind(
            NodeKind::StereoPanner,
            Processor::StereoPanner,
            &[("pan", options.pan)],
        ))
    }
}

impl std::fmt::Debug for OfflineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineEngine")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("nodes", &self.node_count())
            .field("connections", &self.connection_count())
            .field("started", &self.started.get())
            .finish()
    }
}
