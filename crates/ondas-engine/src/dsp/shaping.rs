//! Stateless per-sample shaping: transfer curves and equal-power panning.

use core::f32::consts::FRAC_PI_2;

use libm::{cosf, sinf};

/// Maps `input` through `curve`, sampled evenly over [-1, 1].
///
/// Inputs outside [-1, 1] use the end points; values between curve points
/// are interpolated linearly. An empty curve passes the input through.
#[inline]
pub fn shape(curve: &[f32], input: f32) -> f32 {
    match curve.len() {
        0 => input,
        1 => curve[0],
        n => {
            let position = (input.clamp(-1.0, 1.0) + 1.0) * 0.5 * (n - 1) as f32;
            let index = position as usize;
            if index >= n - 1 {
                return curve[n - 1];
            }
            let frac = position - index as f32;
            curve[index] + (curve[index + 1] - curve[index]) * frac
        }
    }
}

/// Equal-power `(left, right)` gains for `x` in [0, 1].
#[inline]
fn equal_power(x: f32) -> (f32, f32) {
    let angle = x.clamp(0.0, 1.0) * FRAC_PI_2;
    (cosf(angle), sinf(angle))
}

/// Pans a mono sample to `(left, right)`; `pan` runs from -1 to 1.
#[inline]
pub fn pan_mono(input: f32, pan: f32) -> (f32, f32) {
    let (gain_l, gain_r) = equal_power((pan.clamp(-1.0, 1.0) + 1.0) * 0.5);
    (input * gain_l, input * gain_r)
}

/// Pans a stereo frame; the far side is folded into the near one.
#[inline]
pub fn pan_stereo(left: f32, right: f32, pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    if pan <= 0.0 {
        let (gain_l, gain_r) = equal_power(pan + 1.0);
        (left + right * gain_l, right * gain_r)
    } else {
        let (gain_l, gain_r) = equal_power(pan);
        (left * gain_l, right + left * gain_r)
    }
}
