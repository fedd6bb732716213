//! DSP primitives behind the engine's node processors.

pub mod biquad;
pub mod delay;
pub mod oscillator;
pub mod shaping;

pub use biquad::{Biquad, Coefficients};
pub use delay::DelayLine;
pub use oscillator::Oscillator;
pub use shaping::{pan_mono, pan_stereo, shape};
