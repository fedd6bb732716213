//! Node type catalog.
//!
//! [`NodeKind`] enumerates every node type an ondas graph can hold. Each kind
//! has a static [`NodeDescriptor`] with its connectable endpoints, used to
//! build proxy node shapes and to list node types in tools.

use ondas_core::NodeShape;
use serde::Serialize;

/// Unit of a param value, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamUnit {
    /// Linear amplitude factor.
    Linear,
    /// Hertz.
    Hertz,
    /// Cents (1/100 semitone).
    Cents,
    /// Seconds.
    Seconds,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Short suffix for display ("Hz", "s", ...).
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Linear | ParamUnit::None => "",
            ParamUnit::Hertz => "Hz",
            ParamUnit::Cents => "ct",
            ParamUnit::Seconds => "s",
        }
    }
}

/// Describes a connectable audio param.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    /// Param name, used in connections (`"gain"`, `"frequency"`).
    pub name: &'static str,
    /// Value when the node is created with default options.
    pub default: f32,
    /// Smallest meaningful value.
    pub min: f32,
    /// Largest meaningful value.
    pub max: f32,
    /// Display unit.
    pub unit: ParamUnit,
}

impl ParamSpec {
    const fn new(name: &'static str, default: f32, min: f32, max: f32, unit: ParamUnit) -> Self {
        Self {
            name,
            default,
            min,
            max,
            unit,
        }
    }
}

/// Static description of a node type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NodeDescriptor {
    /// Identifier used in graph files (lowercase, hyphenated).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Number of inputs.
    pub inputs: u32,
    /// Number of outputs.
    pub outputs: u32,
    /// Connectable params.
    pub params: &'static [ParamSpec],
}

/// Every node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The engine's output.
    Destination,
    /// Multiplies its input by `gain`.
    Gain,
    /// Emits a constant `offset`.
    ConstantSource,
    /// Periodic waveform generator.
    Oscillator,
    /// Plays back a sample buffer.
    BufferSource,
    /// Delays its input.
    Delay,
    /// Second-order IIR filter.
    BiquadFilter,
    /// Curve-based distortion.
    WaveShaper,
    /// Equal-power stereo panner.
    StereoPanner,
}

const NO_PARAMS: &[ParamSpec] = &[];
const GAIN_PARAMS: &[ParamSpec] = &[ParamSpec::new("gain", 1.0, f32::MIN, f32::MAX, ParamUnit::Linear)];
const CONSTANT_PARAMS: &[ParamSpec] =
    &[ParamSpec::new("offset", 1.0, f32::MIN, f32::MAX, ParamUnit::None)];
const OSCILLATOR_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("frequency", 440.0, -24000.0, 24000.0, ParamUnit::Hertz),
    ParamSpec::new("detune", 0.0, -153600.0, 153600.0, ParamUnit::Cents),
];
const BUFFER_PARAMS: &[ParamSpec] =
    &[ParamSpec::new("playback_rate", 1.0, -100.0, 100.0, ParamUnit::None)];
const DELAY_PARAMS: &[ParamSpec] =
    &[ParamSpec::new("delay_time", 0.0, 0.0, 180.0, ParamUnit::Seconds)];
const BIQUAD_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("frequency", 350.0, 0.0, 24000.0, ParamUnit::Hertz),
    ParamSpec::new("q", 1.0, 0.0001, 1000.0, ParamUnit::None),
    ParamSpec::new("gain", 0.0, -40.0, 40.0, ParamUnit::None),
];
const PANNER_PARAMS: &[ParamSpec] = &[ParamSpec::new("pan", 0.0, -1.0, 1.0, ParamUnit::None)];

impl NodeKind {
    /// All kinds, destination first.
    pub const ALL: [NodeKind; 9] = [
        NodeKind::Destination,
        NodeKind::Gain,
        NodeKind::ConstantSource,
        NodeKind::Oscillator,
        NodeKind::BufferSource,
        NodeKind::Delay,
        NodeKind::BiquadFilter,
        NodeKind::WaveShaper,
        NodeKind::StereoPanner,
    ];

    /// The static descriptor of this kind.
    pub const fn descriptor(&self) -> NodeDescriptor {
        match self {
            NodeKind::Destination => NodeDescriptor {
                id: "destination",
                name: "Destination",
                description: "Final output of the rendering engine",
                inputs: 1,
                outputs: 0,
                params: NO_PARAMS,
            },
            NodeKind::Gain => NodeDescriptor {
                id: "gain",
                name: "Gain",
                description: "Scales its input by an audio-rate gain",
                inputs: 1,
                outputs: 1,
                params: GAIN_PARAMS,
            },
            NodeKind::ConstantSource => NodeDescriptor {
                id: "constant-source",
                name: "Constant Source",
                description: "Emits a constant, modulatable offset",
                inputs: 0,
                outputs: 1,
                params: CONSTANT_PARAMS,
            },
            NodeKind::Oscillator => NodeDescriptor {
                id: "oscillator",
                name: "Oscillator",
                description: "Band-limited sine, square, sawtooth or triangle generator",
                inputs: 0,
                outputs: 1,
                params: OSCILLATOR_PARAMS,
            },
            NodeKind::BufferSource => NodeDescriptor {
                id: "buffer-source",
                name: "Buffer Source",
                description: "Plays back an audio buffer, optionally looped",
                inputs: 0,
                outputs: 1,
                params: BUFFER_PARAMS,
            },
            NodeKind::Delay => NodeDescriptor {
                id: "delay",
                name: "Delay",
                description: "Interpolated delay line, usable inside feedback loops",
                inputs: 1,
                outputs: 1,
                params: DELAY_PARAMS,
            },
            NodeKind::BiquadFilter => NodeDescriptor {
                id: "biquad-filter",
                name: "Biquad Filter",
                description: "RBJ cookbook lowpass, highpass, bandpass, notch, peaking or allpass",
                inputs: 1,
                outputs: 1,
                params: BIQUAD_PARAMS,
            },
            NodeKind::WaveShaper => NodeDescriptor {
                id: "wave-shaper",
                name: "Wave Shaper",
                description: "Maps samples through a transfer curve",
                inputs: 1,
                outputs: 1,
                params: NO_PARAMS,
            },
            NodeKind::StereoPanner => NodeDescriptor {
                id: "stereo-panner",
                name: "Stereo Panner",
                description: "Equal-power left/right positioning",
                inputs: 1,
                outputs: 1,
                params: PANNER_PARAMS,
            },
        }
    }

    /// Identifier used in graph files and node labels.
    pub const fn id(&self) -> &'static str {
        self.descriptor().id
    }

    /// Looks a kind up by id.
    pub fn from_id(id: &str) -> Option<NodeKind> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Returns true for kinds without inputs.
    pub const fn is_source(&self) -> bool {
        self.descriptor().inputs == 0
    }

    /// Looks up a param by name.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.descriptor().params.iter().find(|p| p.name == name)
    }

    /// The proxy node shape of this kind.
    pub fn shape(&self) -> NodeShape {
        let descriptor = self.descriptor();
        let params: Vec<&'static str> = descriptor.params.iter().map(|p| p.name).collect();
        NodeShape::new(descriptor.inputs, descriptor.outputs).with_params(&params)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(NodeKind::from_id("reverb"), None);
    }

    #[test]
    fn test_shapes_match_descriptors() {
        let shape = NodeKind::BiquadFilter.shape();
        assert_eq!(shape.inputs, 1);
        assert_eq!(shape.outputs, 1);
        assert_eq!(shape.param("q"), Some("q"));
        assert_eq!(shape.param("offset"), None);
        assert!(NodeKind::Oscillator.is_source());
        assert!(!NodeKind::Gain.is_source());
    }

    #[test]
    fn test_param_lookup() {
        let spec = NodeKind::Oscillator.param("frequency").unwrap();
        assert_eq!(spec.default, 440.0);
        assert_eq!(spec.unit.suffix(), "Hz");
    }
}
