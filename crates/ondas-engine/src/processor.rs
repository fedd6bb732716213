//! Per-node processors.
//!
//! A [`Processor`] turns one quantum of input plus its params' per-frame
//! values into one quantum of output. Param slices arrive in the order of the
//! node type's param list (see [`NodeKind::descriptor`](ondas_nodes::NodeKind::descriptor)).

use libm::{exp2f, floor};
use ondas_core::AudioBuffer;
use ondas_nodes::{BufferSourceOptions, FilterType, SourceTiming, Waveform};

use crate::bus::{Bus, QUANTUM};
use crate::dsp::{Biquad, Coefficients, DelayLine, Oscillator, pan_mono, pan_stereo, shape};

/// Per-frame values of every param of a node, for one quantum.
pub(crate) type ParamBlock = [[f32; QUANTUM]];

/// Position of the quantum being rendered.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Quantum {
    pub sample_rate: f32,
    /// Index of the quantum's first frame.
    pub start: usize,
}

impl Quantum {
    /// Time of frame `index` within this quantum, in seconds.
    #[inline]
    pub fn time(&self, index: usize) -> f64 {
        (self.start + index) as f64 / f64::from(self.sample_rate)
    }
}

/// The DSP behind one native node.
#[derive(Debug)]
pub(crate) enum Processor {
    Destination { channels: usize },
    Silence,
    Gain,
    Constant { timing: SourceTiming },
    Oscillator(OscillatorProcessor),
    BufferSource(BufferPlayer),
    Delay(DelayProcessor),
    Biquad(BiquadProcessor),
    WaveShaper { curve: Vec<f32> },
    StereoPanner,
}

impl Processor {
    /// Channel count of the input bus, given the widest connected output.
    pub fn input_channels(&self, widest: usize) -> usize {
        match self {
            Processor::Destination { channels } => *channels,
            Processor::StereoPanner => widest.min(2),
            _ => widest,
        }
    }

    pub fn process(&mut self, quantum: &Quantum, input: &Bus, params: &ParamBlock, output: &mut Bus) {
        match self {
            Processor::Destination { channels } => {
                output.reset(*channels);
                output.mix_from(input);
            }
            Processor::Silence => output.reset(1),
            Processor::Gain => {
                output.reset(input.channel_count());
                let gain = &params[0];
                for channel in 0..input.channel_count() {
                    let src = input.channel(channel);
                    for (i, out) in output.channel_mut(channel).iter_mut().enumerate() {
                        *out = src[i] * gain[i];
                    }
                }
            }
            Processor::Constant { timing } => {
                output.reset(1);
                let offset = &params[0];
                for (i, out) in output.channel_mut(0).iter_mut().enumerate() {
                    if timing.is_active(quantum.time(i)) {
                        *out = offset[i];
                    }
                }
            }
            Processor::Oscillator(osc) => osc.process(quantum, params, output),
            Processor::BufferSource(player) => player.process(quantum, params, output),
            Processor::Delay(delay) => delay.process(quantum, input, params, output),
            Processor::Biquad(filter) => filter.process(quantum, input, params, output),
            Processor::WaveShaper { curve } => {
                output.reset(input.channel_count());
                for channel in 0..input.channel_count() {
                    let src = input.channel(channel);
                    for (i, out) in output.channel_mut(channel).iter_mut().enumerate() {
                        *out = shape(curve, src[i]);
                    }
                }
            }
            Processor::StereoPanner => {
                output.reset(2);
                let pan = &params[0];
                for i in 0..QUANTUM {
                    let (left, right) = if input.channel_count() == 1 {
                        pan_mono(input.channel(0)[i], pan[i])
                    } else {
                        pan_stereo(input.channel(0)[i], input.channel(1)[i], pan[i])
                    };
                    output.channel_mut(0)[i] = left;
                    output.channel_mut(1)[i] = right;
                }
            }
        }
    }

    /// The delay processor, if this node is a delay.
    pub fn as_delay_mut(&mut self) -> Option<&mut DelayProcessor> {
        match self {
            Processor::Delay(delay) => Some(delay),
            _ => None,
        }
    }

    pub fn is_delay(&self) -> bool {
        matches!(self, Processor::Delay(_))
    }
}

/// Oscillator node: `frequency` (Hz) and `detune` (cents) are a-rate.
#[derive(Debug)]
pub(crate) struct OscillatorProcessor {
    waveform: Waveform,
    timing: SourceTiming,
    oscillator: Oscillator,
}

impl OscillatorProcessor {
    pub fn new(waveform: Waveform, timing: SourceTiming) -> Self {
        Self {
            waveform,
            timing,
            oscillator: Oscillator::new(),
        }
    }

    fn process(&mut self, quantum: &Quantum, params: &ParamBlock, output: &mut Bus) {
        output.reset(1);
        let (frequency, detune) = (&params[0], &params[1]);
        for (i, out) in output.channel_mut(0).iter_mut().enumerate() {
            if !self.timing.is_active(quantum.time(i)) {
                continue;
            }
            let hz = frequency[i] * exp2f(detune[i] / 1200.0);
            *out = self.oscillator.next(self.waveform, hz, quantum.sample_rate);
        }
    }
}

/// Buffer source node: plays a buffer once or looped, `playback_rate` a-rate.
#[derive(Debug)]
pub(crate) struct BufferPlayer {
    buffer: Option<AudioBuffer>,
    looping: bool,
    loop_start: f64,
    loop_end: f64,
    timing: SourceTiming,
    /// Read position in buffer frames.
    position: f64,
    ended: bool,
}

impl BufferPlayer {
    pub fn new(options: &BufferSourceOptions) -> Self {
        let (loop_start, loop_end) = options
            .buffer
            .as_ref()
            .map(|buffer| {
                let rate = f64::from(buffer.sample_rate());
                let length = buffer.length() as f64;
                let end = if options.loop_end > 0.0 {
                    (options.loop_end * rate).min(length)
                } else {
                    length
                };
                let start = (options.loop_start * rate).min(end);
                if end - start < 1.0 { (0.0, length) } else { (start, end) }
            })
            .unwrap_or((0.0, 0.0));

        Self {
            buffer: options.buffer.clone().filter(|buffer| !buffer.is_empty()),
            looping: options.looping,
            loop_start,
            loop_end,
            timing: options.timing,
            position: 0.0,
            ended: false,
        }
    }

    fn process(&mut self, quantum: &Quantum, params: &ParamBlock, output: &mut Bus) {
        let Some(buffer) = self.buffer.as_ref() else {
            output.reset(1);
            return;
        };
        let channels = buffer.number_of_channels();
        output.reset(channels);
        let step = f64::from(buffer.sample_rate()) / f64::from(quantum.sample_rate);
        let length = buffer.length() as f64;

        for i in 0..QUANTUM {
            if self.ended || !self.timing.is_active(quantum.time(i)) {
                continue;
            }
            let rate = f64::from(params[0][i]);
            if self.looping {
                let span = self.loop_end - self.loop_start;
                if self.position >= self.loop_end || (rate < 0.0 && self.position < self.loop_start) {
                    self.position =
                        self.loop_start + (self.position - self.loop_start).rem_euclid(span);
                }
            } else if self.position >= length || self.position < 0.0 {
                self.ended = true;
                continue;
            }

            let whole = floor(self.position);
            let frac = (self.position - whole) as f32;
            let index = whole as usize;
            let next = if self.looping && whole + 1.0 >= self.loop_end {
                Some(self.loop_start as usize)
            } else if index + 1 < buffer.length() {
                Some(index + 1)
            } else {
                None
            };

            for channel in 0..channels {
                let samples = buffer.channel(channel);
                let a = samples[index];
                let b = next.map_or(0.0, |next| samples[next]);
                output.channel_mut(channel)[i] = a + (b - a) * frac;
            }
            self.position += rate * step;
        }
    }
}

/// Delay node: `delay_time` (seconds) is a-rate.
///
/// Outside a cycle each quantum is written before it is read, so a zero delay
/// passes the input straight through. A delay closing a cycle is split: it
/// [`emit`](Self::emit)s from history before its input is computed and
/// [`absorb`](Self::absorb)s that input at the end of the quantum, which needs
/// a delay of at least one quantum.
#[derive(Debug)]
pub(crate) struct DelayProcessor {
    lines: Vec<DelayLine>,
    max_frames: f32,
    min_frames: f32,
}

impl DelayProcessor {
    pub fn new(max_delay_time: f64, sample_rate: f32) -> Self {
        let max_frames = (max_delay_time * f64::from(sample_rate)) as f32;
        let mut delay = Self {
            lines: Vec::new(),
            max_frames,
            min_frames: 0.0,
        };
        delay.ensure_lines(1);
        delay
    }

    /// Raises the shortest delay the node produces, in frames.
    pub fn clamp_below(&mut self, frames: f32) {
        self.min_frames = frames;
    }

    fn capacity(&self) -> usize {
        self.max_frames.max(QUANTUM as f32) as usize + QUANTUM + 2
    }

    fn ensure_lines(&mut self, channels: usize) {
        let capacity = self.capacity();
        while self.lines.len() < channels {
            self.lines.push(DelayLine::new(capacity));
        }
    }

    #[inline]
    fn frames(&self, seconds: f32, sample_rate: f32) -> f32 {
        (seconds * sample_rate)
            .min(self.max_frames)
            .max(self.min_frames)
    }

    fn process(&mut self, quantum: &Quantum, input: &Bus, params: &ParamBlock, output: &mut Bus) {
        self.absorb(input);
        self.read(quantum, params, output, (QUANTUM - 1) as f32);
    }

    /// Writes the quantum after its output was emitted.
    pub fn absorb(&mut self, input: &Bus) {
        self.ensure_lines(input.channel_count());
        for (channel, line) in self.lines.iter_mut().enumerate() {
            let src = if channel < input.channel_count() {
                Some(input.channel(channel))
            } else {
                None
            };
            for i in 0..QUANTUM {
                line.write(src.map_or(0.0, |src| src[i]));
            }
        }
    }

    /// Emits the quantum from history, before the input is known.
    pub fn emit(&mut self, quantum: &Quantum, params: &ParamBlock, output: &mut Bus) {
        self.read(quantum, params, output, -1.0);
    }

    /// `newest` is the distance from frame 0 of this quantum back to the most
    /// recently written sample, minus one.
    fn read(&self, quantum: &Quantum, params: &ParamBlock, output: &mut Bus, newest: f32) {
        output.reset(self.lines.len());
        for (channel, line) in self.lines.iter().enumerate() {
            let out = output.channel_mut(channel);
            for (i, sample) in out.iter_mut().enumerate() {
                let delay = self.frames(params[0][i], quantum.sample_rate);
                *sample = line.read(newest - i as f32 + delay);
            }
        }
    }
}

/// Biquad node. Coefficients follow `frequency`, `q` and `gain` at the
/// start of every quantum.
#[derive(Debug)]
pub(crate) struct BiquadProcessor {
    filter: FilterType,
    stages: Vec<Biquad>,
}

impl BiquadProcessor {
    pub fn new(filter: FilterType) -> Self {
        Self {
            filter,
            stages: Vec::new(),
        }
    }

    fn process(&mut self, quantum: &Quantum, input: &Bus, params: &ParamBlock, output: &mut Bus) {
        let channels = input.channel_count();
        let coefficients = Coefficients::design(
            self.filter,
            params[0][0],
            params[1][0],
            params[2][0],
            quantum.sample_rate,
        );
        self.stages.resize_with(channels.max(self.stages.len()), Biquad::new);
        output.reset(channels);
        for (channel, stage) in self.stages.iter_mut().enumerate().take(channels) {
            stage.set_coefficients(coefficients);
            let src = input.channel(channel);
            for (i, out) in output.channel_mut(channel).iter_mut().enumerate() {
                *out = stage.process(src[i]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn quantum(index: usize) -> Quantum {
        Quantum {
            sample_rate: SR,
            start: index * QUANTUM,
        }
    }

    fn block(values: &[f32]) -> Vec<[f32; QUANTUM]> {
        values.iter().map(|v| [*v; QUANTUM]).collect()
    }

    fn impulse() -> Bus {
        let mut bus = Bus::silent(1);
        bus.channel_mut(0)[0] = 1.0;
        bus
    }

    #[test]
    fn test_gain_scales_every_channel() {
        let mut input = Bus::silent(2);
        input.channel_mut(0).fill(1.0);
        input.channel_mut(1).fill(-1.0);
        let mut output = Bus::default();
        Processor::Gain.process(&quantum(0), &input, &block(&[0.5]), &mut output);
        assert_eq!(output.channel_count(), 2);
        assert_eq!(output.channel(0)[3], 0.5);
        assert_eq!(output.channel(1)[3], -0.5);
    }

    #[test]
    fn test_constant_respects_timing() {
        let mut constant = Processor::Constant {
            timing: SourceTiming {
                start: 64.0 / f64::from(SR),
                stop: None,
            },
        };
        let mut output = Bus::default();
        constant.process(&quantum(0), &Bus::default(), &block(&[0.75]), &mut output);
        assert_eq!(output.channel(0)[63], 0.0);
        assert_eq!(output.channel(0)[64], 0.75);
    }

    #[test]
    fn test_delay_zero_passes_through() {
        let mut delay = DelayProcessor::new(1.0, SR);
        let mut output = Bus::default();
        delay.process(&quantum(0), &impulse(), &block(&[0.0]), &mut output);
        assert_eq!(output.channel(0)[0], 1.0);
        assert_eq!(output.channel(0)[1], 0.0);
    }

    #[test]
    fn test_delay_shifts_by_frames() {
        let mut delay = DelayProcessor::new(1.0, SR);
        let mut output = Bus::default();
        let ten_frames = 10.0 / SR;
        delay.process(&quantum(0), &impulse(), &block(&[ten_frames]), &mut output);
        assert!(output.channel(0)[9].abs() < 1e-4);
        assert!((output.channel(0)[10] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_delay_split_emits_history() {
        let mut delay = DelayProcessor::new(1.0, SR);
        delay.clamp_below(QUANTUM as f32);
        let params = block(&[0.0]);
        let mut output = Bus::default();

        delay.emit(&quantum(0), &params, &mut output);
        assert!(output.is_silent());
        delay.absorb(&impulse());

        delay.emit(&quantum(1), &params, &mut output);
        assert_eq!(output.channel(0)[0], 1.0);
        assert_eq!(output.channel(0)[1], 0.0);
    }

    #[test]
    fn test_delay_clamps_to_max() {
        let mut delay = DelayProcessor::new(0.001, SR);
        let mut output = Bus::default();
        // 48 frames max; asking for 100 frames yields 48.
        delay.process(&quantum(0), &impulse(), &block(&[100.0 / SR]), &mut output);
        assert!((output.channel(0)[48] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_buffer_player_loops() {
        let buffer = AudioBuffer::from_channels(vec![vec![1.0, 2.0, 3.0]], SR);
        let mut player = BufferPlayer::new(&BufferSourceOptions {
            looping: true,
            ..BufferSourceOptions::with_buffer(buffer)
        });
        let mut output = Bus::default();
        player.process(&quantum(0), &block(&[1.0]), &mut output);
        assert_eq!(&output.channel(0)[..7], &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_buffer_player_ends() {
        let buffer = AudioBuffer::from_channels(vec![vec![0.5, 0.5], vec![-0.5, -0.5]], SR);
        let mut player = BufferPlayer::new(&BufferSourceOptions::with_buffer(buffer));
        let mut output = Bus::default();
        player.process(&quantum(0), &block(&[1.0]), &mut output);
        assert_eq!(output.channel_count(), 2);
        assert_eq!(output.channel(1)[1], -0.5);
        assert_eq!(output.channel(0)[2], 0.0);
        player.process(&quantum(1), &block(&[1.0]), &mut output);
        assert!(output.is_silent());
    }

    #[test]
    fn test_buffer_player_half_speed_interpolates() {
        let buffer = AudioBuffer::from_channels(vec![vec![0.0, 1.0, 0.0]], SR);
        let mut player = BufferPlayer::new(&BufferSourceOptions::with_buffer(buffer));
        let mut output = Bus::default();
        player.process(&quantum(0), &block(&[0.5]), &mut output);
        assert_eq!(&output.channel(0)[..4], &[0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_one_sample_loop_is_constant() {
        let unit = AudioBuffer::from_channels(vec![vec![1.0]], SR);
        let mut player = BufferPlayer::new(&BufferSourceOptions {
            looping: true,
            ..BufferSourceOptions::with_buffer(unit)
        });
        let mut output = Bus::default();
        player.process(&quantum(0), &block(&[1.0]), &mut output);
        assert!(output.channel(0).iter().all(|s| *s == 1.0));
    }

    #[test]
    fn test_panner_widens_mono() {
        let mut input = Bus::silent(1);
        input.channel_mut(0).fill(1.0);
        let mut output = Bus::default();
        Processor::StereoPanner.process(&quantum(0), &input, &block(&[1.0]), &mut output);
        assert_eq!(output.channel_count(), 2);
        assert!(output.channel(0)[0].abs() < 1e-6);
        assert!((output.channel(1)[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_oscillator_silent_before_start() {
        let mut osc = Processor::Oscillator(OscillatorProcessor::new(
            Waveform::Square,
            SourceTiming {
                start: 1.0,
                stop: None,
            },
        ));
        let mut output = Bus::default();
        osc.process(&quantum(0), &Bus::default(), &block(&[440.0, 0.0]), &mut output);
        assert!(output.is_silent());
    }
}
