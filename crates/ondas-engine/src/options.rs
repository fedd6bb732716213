//! Engine construction options.

use std::fmt;
use std::str::FromStr;

use ondas_core::EngineError;

/// Behavior family of an [`OfflineEngine`](crate::OfflineEngine).
///
/// The profile name doubles as the engine flavor, so capability probes are
/// cached per profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineProfile {
    /// Completes through a future and creates constant sources natively.
    #[default]
    Modern,
    /// Completes only through the completion listener, has no native
    /// constant source, and never completes while nothing feeds the
    /// destination.
    Legacy,
}

impl EngineProfile {
    /// Every profile.
    pub const ALL: [EngineProfile; 2] = [EngineProfile::Modern, EngineProfile::Legacy];

    /// Stable lowercase name, used as the engine flavor.
    pub const fn name(&self) -> &'static str {
        match self {
            EngineProfile::Modern => "modern",
            EngineProfile::Legacy => "legacy",
        }
    }
}

impl fmt::Display for EngineProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineProfile {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                EngineError::invalid_options(format!(
                    "unknown engine profile '{s}' (expected modern or legacy)"
                ))
            })
    }
}

/// Settings of one offline render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Number of frames to render.
    pub length: usize,
    /// Number of output channels.
    pub channels: usize,
    /// Behavior family.
    pub profile: EngineProfile,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            length: 44100,
            channels: 2,
            profile: EngineProfile::Modern,
        }
    }
}

impl EngineOptions {
    /// Lowest accepted sample rate in Hz.
    pub const MIN_SAMPLE_RATE: f32 = 3000.0;
    /// Highest accepted sample rate in Hz.
    pub const MAX_SAMPLE_RATE: f32 = 768_000.0;
    /// Highest accepted channel count.
    pub const MAX_CHANNELS: usize = 32;

    /// Options rendering `seconds` of audio at `sample_rate`.
    pub fn with_duration(sample_rate: f32, seconds: f64) -> Self {
        Self {
            sample_rate,
            length: (seconds * f64::from(sample_rate)).round() as usize,
            ..Self::default()
        }
    }

    /// Duration of the render in seconds.
    pub fn duration(&self) -> f64 {
        self.length as f64 / f64::from(self.sample_rate)
    }

    /// Checks the sample rate, channel count and length.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(Self::MIN_SAMPLE_RATE..=Self::MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(EngineError::invalid_options(format!(
                "sample rate {} outside {}..={} Hz",
                self.sample_rate,
                Self::MIN_SAMPLE_RATE,
                Self::MAX_SAMPLE_RATE
            )));
        }
        if !(1..=Self::MAX_CHANNELS).contains(&self.channels) {
            return Err(EngineError::invalid_options(format!(
                "channel count {} outside 1..={}",
                self.channels,
                Self::MAX_CHANNELS
            )));
        }
        if self.length == 0 {
            return Err(EngineError::invalid_options("length must be at least one frame"));
        }
        Ok(())
    }
}
