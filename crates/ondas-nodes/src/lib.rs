//! Ondas Nodes - the node catalog for ondas audio graphs
//!
//! This crate layers concrete node types over the type-agnostic core:
//!
//! - [`NodeKind`] / [`NodeDescriptor`] - the catalog, with endpoint and param
//!   metadata for listings
//! - Options types ([`GainOptions`], [`OscillatorOptions`], ...) - validated,
//!   serde-ready construction settings
//! - [`NodeFactory`] - what a native engine implements to create them
//! - [`CatalogRenderer`] - per-node renderer, including the constant-source
//!   emulation for engines without native support
//! - [`AudioGraph`] - construction, connection and disconnect policies
//!
//! # Example
//!
//! ```rust,ignore
//! use ondas_nodes::{AudioGraph, BiquadFilterOptions, FilterType, OscillatorOptions, Waveform};
//!
//! let mut graph = AudioGraph::new();
//! let saw = graph.oscillator(OscillatorOptions { waveform: Waveform::Sawtooth, ..Default::default() })?;
//! let lp = graph.biquad_filter(BiquadFilterOptions { filter_type: FilterType::Lowpass, frequency: 800.0, ..Default::default() })?;
//! graph.connect(saw, lp)?;
//! graph.connect(lp, graph.destination())?;
//! ```

pub mod error;
pub mod factory;
pub mod graph;
pub mod kind;
pub mod options;
pub mod renderers;

pub use error::NodeError;
pub use factory::NodeFactory;
pub use graph::AudioGraph;
pub use kind::{NodeDescriptor, NodeKind, ParamSpec, ParamUnit};
pub use options::{
    BiquadFilterOptions, BufferSourceOptions, ConstantSourceOptions, DelayOptions, FilterType,
    GainOptions, NodeOptions, OscillatorOptions, SourceTiming, StereoPannerOptions, Waveform,
    WaveShaperOptions,
};
pub use renderers::{CONSTANT_SOURCE, CatalogRenderer, DestinationRenderer, constant_source_support};
