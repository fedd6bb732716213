//! Construction options for every node type.
//!
//! Options carry the initial param values and static settings of a node. All
//! of them deserialize from graph files (missing fields take the defaults)
//! and validate before a node is added to a graph.

use ondas_core::AudioBuffer;
use serde::{Deserialize, Serialize};

use crate::error::NodeError;
use crate::kind::NodeKind;

/// Options of any node type, tagged by the node type id.
///
/// ```toml
/// type = "oscillator"
/// waveform = "square"
/// frequency = 220.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeOptions {
    /// See [`GainOptions`].
    Gain(GainOptions),
    /// See [`ConstantSourceOptions`].
    ConstantSource(ConstantSourceOptions),
    /// See [`OscillatorOptions`].
    Oscillator(OscillatorOptions),
    /// See [`BufferSourceOptions`].
    BufferSource(BufferSourceOptions),
    /// See [`DelayOptions`].
    Delay(DelayOptions),
    /// See [`BiquadFilterOptions`].
    BiquadFilter(BiquadFilterOptions),
    /// See [`WaveShaperOptions`].
    WaveShaper(WaveShaperOptions),
    /// See [`StereoPannerOptions`].
    StereoPanner(StereoPannerOptions),
}

impl NodeOptions {
    /// The node type these options build.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeOptions::Gain(_) => NodeKind::Gain,
            NodeOptions::ConstantSource(_) => NodeKind::ConstantSource,
            NodeOptions::Oscillator(_) => NodeKind::Oscillator,
            NodeOptions::BufferSource(_) => NodeKind::BufferSource,
            NodeOptions::Delay(_) => NodeKind::Delay,
            NodeOptions::BiquadFilter(_) => NodeKind::BiquadFilter,
            NodeOptions::WaveShaper(_) => NodeKind::WaveShaper,
            NodeOptions::StereoPanner(_) => NodeKind::StereoPanner,
        }
    }

    /// Checks the options against the node type's constraints.
    pub fn validate(&self) -> Result<(), NodeError> {
        match self {
            NodeOptions::Gain(o) => o.validate(),
            NodeOptions::ConstantSource(o) => o.validate(),
            NodeOptions::Oscillator(o) => o.validate(),
            NodeOptions::BufferSource(o) => o.validate(),
            NodeOptions::Delay(o) => o.validate(),
            NodeOptions::BiquadFilter(o) => o.validate(),
            NodeOptions::WaveShaper(o) => o.validate(),
            NodeOptions::StereoPanner(o) => o.validate(),
        }
    }
}

fn finite(kind: NodeKind, name: &str, value: f32) -> Result<(), NodeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(NodeError::invalid_options(
            kind.id(),
            format!("{name} must be finite, got {value}"),
        ))
    }
}

/// Start and stop times of a source node, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTiming {
    /// When the source starts playing.
    pub start: f64,
    /// When the source stops; `None` plays to the end of the render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<f64>,
}

impl Default for SourceTiming {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: None,
        }
    }
}

impl SourceTiming {
    /// Returns true if the source is playing at `time` seconds.
    pub fn is_active(&self, time: f64) -> bool {
        time >= self.start && self.stop.is_none_or(|stop| time < stop)
    }

    fn validate(&self, kind: NodeKind) -> Result<(), NodeError> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(NodeError::invalid_options(
                kind.id(),
                format!("start must be a non-negative time, got {}", self.start),
            ));
        }
        match self.stop {
            Some(stop) if !stop.is_finite() || stop < self.start => {
                Err(NodeError::invalid_options(
                    kind.id(),
                    format!("stop ({stop}) must not precede start ({})", self.start),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Options for a gain node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainOptions {
    /// Linear gain factor.
    pub gain: f32,
}

impl Default for GainOptions {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

impl GainOptions {
    /// Checks the gain is finite.
    pub fn validate(&self) -> Result<(), NodeError> {
        finite(NodeKind::Gain, "gain", self.gain)
    }
}

/// Options for a constant source node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantSourceOptions {
    /// Output value.
    pub offset: f32,
    /// Playback window.
    #[serde(flatten)]
    pub timing: SourceTiming,
}

impl Default for ConstantSourceOptions {
    fn default() -> Self {
        Self {
            offset: 1.0,
            timing: SourceTiming::default(),
        }
    }
}

impl ConstantSourceOptions {
    /// Checks the offset and timing.
    pub fn validate(&self) -> Result<(), NodeError> {
        finite(NodeKind::ConstantSource, "offset", self.offset)?;
        self.timing.validate(NodeKind::ConstantSource)
    }
}

/// Oscillator waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Band-limited square.
    Square,
    /// Band-limited rising sawtooth.
    Sawtooth,
    /// Triangle.
    Triangle,
}

/// Options for an oscillator node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorOptions {
    /// Waveform shape.
    pub waveform: Waveform,
    /// Frequency in Hz.
    pub frequency: f32,
    /// Detune in cents.
    pub detune: f32,
    /// Playback window.
    #[serde(flatten)]
    pub timing: SourceTiming,
}

impl Default for OscillatorOptions {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency: 440.0,
            detune: 0.0,
            timing: SourceTiming::default(),
        }
    }
}

impl OscillatorOptions {
    /// Checks frequency, detune and timing.
    pub fn validate(&self) -> Result<(), NodeError> {
        finite(NodeKind::Oscillator, "frequency", self.frequency)?;
        finite(NodeKind::Oscillator, "detune", self.detune)?;
        self.timing.validate(NodeKind::Oscillator)
    }
}

/// Options for a buffer source node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSourceOptions {
    /// Samples to play. Graph files name a WAV file instead; the loader fills
    /// this in. A source without a buffer outputs silence.
    #[serde(skip)]
    pub buffer: Option<AudioBuffer>,
    /// Whether playback loops.
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Loop start in seconds.
    pub loop_start: f64,
    /// Loop end in seconds; 0 loops the whole buffer.
    pub loop_end: f64,
    /// Playback speed factor.
    pub playback_rate: f32,
    /// Playback window.
    #[serde(flatten)]
    pub timing: SourceTiming,
}

impl Default for BufferSourceOptions {
    fn default() -> Self {
        Self {
            buffer: None,
            looping: false,
            loop_start: 0.0,
            loop_end: 0.0,
            playback_rate: 1.0,
            timing: SourceTiming::default(),
        }
    }
}

impl BufferSourceOptions {
    /// Options playing `buffer` once.
    pub fn with_buffer(buffer: AudioBuffer) -> Self {
        Self {
            buffer: Some(buffer),
            ..Self::default()
        }
    }

    /// Checks loop points, rate and timing.
    pub fn validate(&self) -> Result<(), NodeError> {
        let kind = NodeKind::BufferSource;
        finite(kind, "playback_rate", self.playback_rate)?;
        if !(self.loop_start >= 0.0 && self.loop_end >= 0.0) {
            return Err(NodeError::invalid_options(
                kind.id(),
                "loop points must be non-negative",
            ));
        }
        if self.loop_end > 0.0 && self.loop_end <= self.loop_start {
            return Err(NodeError::invalid_options(
                kind.id(),
                format!(
                    "loop_end ({}) must be after loop_start ({})",
                    self.loop_end, self.loop_start
                ),
            ));
        }
        self.timing.validate(kind)
    }
}

/// Options for a delay node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayOptions {
    /// Initial delay in seconds.
    pub delay_time: f64,
    /// Longest delay the node can produce, in seconds.
    pub max_delay_time: f64,
}

impl Default for DelayOptions {
    fn default() -> Self {
        Self {
            delay_time: 0.0,
            max_delay_time: 1.0,
        }
    }
}

impl DelayOptions {
    /// Upper bound of `max_delay_time`, in seconds.
    pub const MAX_DELAY_LIMIT: f64 = 180.0;

    /// Checks `0 < max_delay_time < 180` and `0 <= delay_time <= max_delay_time`.
    pub fn validate(&self) -> Result<(), NodeError> {
        let kind = NodeKind::Delay.id();
        if !(self.max_delay_time > 0.0 && self.max_delay_time < Self::MAX_DELAY_LIMIT) {
            return Err(NodeError::invalid_options(
                kind,
                format!(
                    "max_delay_time must be in (0, {}), got {}",
                    Self::MAX_DELAY_LIMIT,
                    self.max_delay_time
                ),
            ));
        }
        if !(self.delay_time >= 0.0 && self.delay_time <= self.max_delay_time) {
            return Err(NodeError::invalid_options(
                kind,
                format!(
                    "delay_time must be in [0, {}], got {}",
                    self.max_delay_time, self.delay_time
                ),
            ));
        }
        Ok(())
    }
}

/// Biquad filter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// 12 dB/oct lowpass.
    #[default]
    Lowpass,
    /// 12 dB/oct highpass.
    Highpass,
    /// Constant 0 dB peak bandpass.
    Bandpass,
    /// Band reject.
    Notch,
    /// Bell boost/cut by `gain` dB.
    Peaking,
    /// Flat magnitude, phase shift around `frequency`.
    Allpass,
}

/// Options for a biquad filter node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiquadFilterOptions {
    /// Filter response.
    #[serde(rename = "filter")]
    pub filter_type: FilterType,
    /// Cutoff or center frequency in Hz.
    pub frequency: f32,
    /// Resonance.
    pub q: f32,
    /// Boost or cut in dB (peaking only).
    pub gain: f32,
}

impl Default for BiquadFilterOptions {
    fn default() -> Self {
        Self {
            filter_type: FilterType::Lowpass,
            frequency: 350.0,
            q: 1.0,
            gain: 0.0,
        }
    }
}

impl BiquadFilterOptions {
    /// Checks `frequency > 0`, `q > 0` and a finite gain.
    pub fn validate(&self) -> Result<(), NodeError> {
        let kind = NodeKind::BiquadFilter;
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(NodeError::invalid_options(
                kind.id(),
                format!("frequency must be positive, got {}", self.frequency),
            ));
        }
        if !(self.q.is_finite() && self.q > 0.0) {
            return Err(NodeError::invalid_options(
                kind.id(),
                format!("q must be positive, got {}", self.q),
            ));
        }
        finite(kind, "gain", self.gain)
    }
}

/// Options for a wave shaper node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveShaperOptions {
    /// Transfer curve sampled over [-1, 1]. Empty passes the input through.
    pub curve: Vec<f32>,
}

impl WaveShaperOptions {
    /// Checks the curve has no single point and only finite values.
    pub fn validate(&self) -> Result<(), NodeError> {
        let kind = NodeKind::WaveShaper.id();
        if self.curve.len() == 1 {
            return Err(NodeError::invalid_options(
                kind,
                "curve needs at least two points",
            ));
        }
        if self.curve.iter().any(|v| !v.is_finite()) {
            return Err(NodeError::invalid_options(kind, "curve values must be finite"));
        }
        Ok(())
    }
}

/// Options for a stereo panner node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoPannerOptions {
    /// Position from -1 (left) to 1 (right).
    pub pan: f32,
}

impl StereoPannerOptions {
    /// Checks `-1 <= pan <= 1`.
    pub fn validate(&self) -> Result<(), NodeError> {
        if (-1.0..=1.0).contains(&self.pan) {
            Ok(())
        } else {
            Err(NodeError::invalid_options(
                NodeKind::StereoPanner.id(),
                format!("pan must be in [-1, 1], got {}", self.pan),
            ))
        }
    }
}

macro_rules! impl_from_options {
    ($($options:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$options> for NodeOptions {
                fn from(options: $options) -> Self {
                    NodeOptions::$variant(options)
                }
            }
        )*
    };
}

impl_from_options! {
    GainOptions => Gain,
    ConstantSourceOptions => ConstantSource,
    OscillatorOptions => Oscillator,
    BufferSourceOptions => BufferSource,
    DelayOptions => Delay,
    BiquadFilterOptions => BiquadFilter,
    WaveShaperOptions => WaveShaper,
    StereoPannerOptions => StereoPanner,
}
