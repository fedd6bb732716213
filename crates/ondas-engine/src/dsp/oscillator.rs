//! Band-limited oscillator core.
//!
//! Square and sawtooth use PolyBLEP (polynomial band-limited step)
//! corrections at their discontinuities; the triangle is a leaky integral of
//! the corrected square.

use core::f32::consts::PI;

use libm::{floorf, sinf};
use ondas_nodes::Waveform;

#[inline]
fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - floorf(phase);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Two-sample PolyBLEP residual for a unit step at phase 0.
///
/// `t` is the phase in [0, 1), `dt` the per-sample phase increment.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let n = t / dt;
        2.0 * n - n * n - 1.0
    } else if t > 1.0 - dt {
        let n = (t - 1.0) / dt;
        n * n + 2.0 * n + 1.0
    } else {
        0.0
    }
}

/// Phase accumulator producing one waveform sample per call.
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phase: f32,
    integrator: f32,
}

impl Oscillator {
    /// An oscillator at phase zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Returns the sample at the current phase, then advances by
    /// `frequency / sample_rate`.
    #[inline]
    pub fn next(&mut self, waveform: Waveform, frequency: f32, sample_rate: f32) -> f32 {
        let increment = frequency / sample_rate;
        let dt = increment.abs().min(0.5);
        let phase = self.phase;

        let sample = match waveform {
            Waveform::Sine => sinf(2.0 * PI * phase),
            Waveform::Sawtooth => 2.0 * phase - 1.0 - poly_blep(phase, dt),
            Waveform::Square => square(phase, dt),
            Waveform::Triangle => {
                // Leak scales with frequency so DC drift dies out across the range.
                let leak = 1.0 - dt.min(0.1);
                self.integrator = leak * self.integrator + square(phase, dt) * dt * 4.0;
                self.integrator
            }
        };

        self.phase = wrap_phase(phase + increment);
        sample
    }
}

#[inline]
fn square(phase: f32, dt: f32) -> f32 {
    let naive = if phase < 0.5 { 1.0 } else { -1.0 };
    naive + poly_blep(phase, dt) - poly_blep(wrap_phase(phase + 0.5), dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn run(waveform: Waveform, frequency: f32, frames: usize) -> Vec<f32> {
        let mut osc = Oscillator::new();
        (0..frames).map(|_| osc.next(waveform, frequency, SR)).collect()
    }

    #[test]
    fn test_sine_starts_at_zero_phase() {
        let samples = run(Waveform::Sine, 12000.0, 5);
        assert!(samples[0].abs() < 1e-6);
        assert!((samples[1] - 1.0).abs() < 1e-5);
        assert!(samples[2].abs() < 1e-5);
        assert!((samples[3] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_waveforms_stay_bounded() {
        for waveform in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
            let samples = run(waveform, 440.0, 4800);
            // Skip the triangle integrator's start-up transient.
            let peak = samples[1000..]
                .iter()
                .fold(0.0_f32, |a, s| a.max(s.abs()));
            assert!(peak <= 1.2, "{waveform:?} peak {peak}");
            assert!(peak > 0.5, "{waveform:?} peak {peak}");
        }
    }

    #[test]
    fn test_square_is_balanced() {
        let samples = run(Waveform::Square, 480.0, 4800);
        let mean: f32 = samples.iter().sum::<f32>() / samples.len() as f32;
        assert!(mean.abs() < 0.02, "mean {mean}");
    }

    #[test]
    fn test_phase_wraps() {
        let mut osc = Oscillator::new();
        for _ in 0..1000 {
            osc.next(Waveform::Sawtooth, 3000.0, SR);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn test_negative_frequency_runs_backwards() {
        let mut osc = Oscillator::new();
        osc.next(Waveform::Sine, -12000.0, SR);
        assert!((osc.phase() - 0.75).abs() < 1e-6);
    }
}
