//! Native node constructors.

use ondas_core::{EngineError, NativeEngine};

use crate::options::{
    BiquadFilterOptions, BufferSourceOptions, ConstantSourceOptions, DelayOptions, GainOptions,
    OscillatorOptions, StereoPannerOptions, WaveShaperOptions,
};

/// A native engine that can create the node types of the catalog.
///
/// Param names on the created nodes match the catalog's
/// [`ParamSpec`](crate::kind::ParamSpec) names. An engine without native
/// support for a type returns [`EngineError::NotSupported`].
pub trait NodeFactory: NativeEngine {
    /// Creates a gain node.
    fn create_gain(&self, options: &GainOptions) -> Result<Self::Node, EngineError>;

    /// Creates a constant source node.
    fn create_constant_source(
        &self,
        options: &ConstantSourceOptions,
    ) -> Result<Self::Node, EngineError>;

    /// Creates an oscillator node.
    fn create_oscillator(&self, options: &OscillatorOptions) -> Result<Self::Node, EngineError>;

    /// Creates a buffer source node.
    fn create_buffer_source(
        &self,
        options: &BufferSourceOptions,
    ) -> Result<Self::Node, EngineError>;

    /// Creates a delay node.
    fn create_delay(&self, options: &DelayOptions) -> Result<Self::Node, EngineError>;

    /// Creates a biquad filter node.
    fn create_biquad_filter(
        &self,
        options: &BiquadFilterOptions,
    ) -> Result<Self::Node, EngineError>;

    /// Creates a wave shaper node.
    fn create_wave_shaper(&self, options: &WaveShaperOptions) -> Result<Self::Node, EngineError>;

    /// Creates a stereo panner node.
    fn create_stereo_panner(
        &self,
        options: &StereoPannerOptions,
    ) -> Result<Self::Node, EngineError>;
}
