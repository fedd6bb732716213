//! Recording engine implementing the node factory.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use futures::FutureExt;
use ondas_core::{AudioBuffer, CompletionFuture, CompletionListener, EngineError, NativeEngine};
use ondas_nodes::{
    BiquadFilterOptions, BufferSourceOptions, ConstantSourceOptions, DelayOptions, GainOptions,
    NodeFactory, OscillatorOptions, StereoPannerOptions, WaveShaperOptions,
};

/// Records node creations and connections as strings like `gain#1` and
/// `oscillator#2 -> gain#1[0]`.
pub struct Recorder {
    flavor: &'static str,
    constant_source: bool,
    nodes: RefCell<Vec<&'static str>>,
    connections: RefCell<Vec<String>>,
    buffers: RefCell<Vec<BufferSourceOptions>>,
    started: Cell<bool>,
}

impl Recorder {
    pub fn new(flavor: &'static str, constant_source: bool) -> Self {
        Self {
            flavor,
            constant_source,
            nodes: RefCell::new(vec!["destination"]),
            connections: RefCell::new(Vec::new()),
            buffers: RefCell::new(Vec::new()),
            started: Cell::new(false),
        }
    }

    pub fn nodes(&self) -> Vec<&'static str> {
        self.nodes.borrow()[1..].to_vec()
    }

    pub fn connections(&self) -> Vec<String> {
        self.connections.borrow().clone()
    }

    pub fn buffer_sources(&self) -> Vec<BufferSourceOptions> {
        self.buffers.borrow().clone()
    }

    fn create(&self, label: &'static str) -> u32 {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(label);
        (nodes.len() - 1) as u32
    }

    fn name(&self, node: u32) -> String {
        format!("{}#{node}", self.nodes.borrow()[node as usize])
    }
}

impl NativeEngine for Recorder {
    type Node = u32;

    fn flavor(&self) -> &'static str {
        self.flavor
    }

    fn sample_rate(&self) -> f32 {
        48000.0
    }

    fn length(&self) -> usize {
        128
    }

    fn number_of_channels(&self) -> usize {
        1
    }

    fn destination(&self) -> u32 {
        0
    }

    fn connect(&self, source: &u32, _output: u32, destination: &u32, input: u32) -> Result<(), EngineError> {
        let line = format!("{} -> {}[{input}]", self.name(*source), self.name(*destination));
        self.connections.borrow_mut().push(line);
        Ok(())
    }

    fn connect_param(&self, source: &u32, _output: u32, destination: &u32, param: &str) -> Result<(), EngineError> {
        let line = format!("{} -> {}.{param}", self.name(*source), self.name(*destination));
        self.connections.borrow_mut().push(line);
        Ok(())
    }

    fn disconnect(&self, _source: &u32) -> Result<(), EngineError> {
        Ok(())
    }

    fn has_active_output(&self) -> bool {
        self.connections.borrow().iter().any(|c| c.contains("-> destination#0"))
    }

    fn create_silent_node(&self) -> Result<u32, EngineError> {
        Ok(self.create("silence"))
    }

    fn set_oncomplete(&self, _listener: CompletionListener) {}

    fn start_rendering(&self) -> Result<Option<CompletionFuture>, EngineError> {
        if self.started.replace(true) {
            return Err(EngineError::invalid_state("already started"));
        }
        let buffer = AudioBuffer::new(1, self.length(), self.sample_rate());
        Ok(Some(async move { Ok(buffer) }.boxed_local()))
    }

    fn probe_instance(&self) -> Result<Self, EngineError> {
        Ok(Self::new(self.flavor, self.constant_source))
    }
}

impl NodeFactory for Recorder {
    fn create_gain(&self, _options: &GainOptions) -> Result<u32, EngineError> {
        Ok(self.create("gain"))
    }

    fn create_constant_source(&self, _options: &ConstantSourceOptions) -> Result<u32, EngineError> {
        if self.constant_source {
            Ok(self.create("constant-source"))
        } else {
            Err(EngineError::not_supported("constant source"))
        }
    }

    fn create_oscillator(&self, _options: &OscillatorOptions) -> Result<u32, EngineError> {
        Ok(self.create("oscillator"))
    }

    fn create_buffer_source(&self, options: &BufferSourceOptions) -> Result<u32, EngineError> {
        self.buffers.borrow_mut().push(options.clone());
        Ok(self.create("buffer-source"))
    }

    fn create_delay(&self, _options: &DelayOptions) -> Result<u32, EngineError> {
        Ok(self.create("delay"))
    }

    fn create_biquad_filter(&self, _options: &BiquadFilterOptions) -> Result<u32, EngineError> {
        Ok(self.create("biquad-filter"))
    }

    fn create_wave_shaper(&self, _options: &WaveShaperOptions) -> Result<u32, EngineError> {
        Ok(self.create("wave-shaper"))
    }

    fn create_stereo_panner(&self, _options: &StereoPannerOptions) -> Result<u32, EngineError> {
        Ok(self.create("stereo-panner"))
    }
}
