//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use ondas_core::AudioBuffer;
use std::path::Path;

/// Bit depths accepted by [`write_wav`]. 32 is written as IEEE float.
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32).
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// Spec for storing `buffer` at the given bit depth.
    pub fn for_buffer(buffer: &AudioBuffer, bits_per_sample: u16) -> Result<Self> {
        if !SUPPORTED_BIT_DEPTHS.contains(&bits_per_sample) {
            return Err(Error::UnsupportedFormat(format!(
                "{bits_per_sample}-bit (expected 16, 24 or 32)"
            )));
        }
        let channels = u16::try_from(buffer.number_of_channels())
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| {
                Error::InvalidBuffer(format!(
                    "{} channels",
                    buffer.number_of_channels()
                ))
            })?;
        if !(buffer.sample_rate().is_finite() && buffer.sample_rate() >= 1.0) {
            return Err(Error::InvalidBuffer(format!(
                "sample rate {}",
                buffer.sample_rate()
            )));
        }
        Ok(Self {
            channels,
            sample_rate: buffer.sample_rate().round() as u32,
            bits_per_sample,
        })
    }
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file into a planar buffer, keeping every channel.
///
/// Integer samples are scaled to [-1.0, 1.0).
///
/// # Example
/// ```ignore
/// let buffer = read_wav("input.wav")?;
/// println!("{} channels at {} Hz", buffer.number_of_channels(), buffer.sample_rate());
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    if channels == 0 {
        return Err(Error::UnsupportedFormat("zero channels".to_string()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        channels,
        frames = interleaved.len() / channels,
        sample_rate = spec.sample_rate,
        "wav_read"
    );

    Ok(AudioBuffer::from_interleaved(
        &interleaved,
        channels,
        spec.sample_rate as f32,
    ))
}

/// Write a buffer to a WAV file.
///
/// `bits_per_sample` is one of [`SUPPORTED_BIT_DEPTHS`]; 16 and 24 are PCM
/// with clipping, 32 is float.
///
/// # Example
/// ```ignore
/// let buffer = AudioBuffer::new(2, 48000, 48000.0); // 1 second of silence
/// write_wav("output.wav", &buffer, 24)?;
/// ```
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    buffer: &AudioBuffer,
    bits_per_sample: u16,
) -> Result<WavSpec> {
    let spec = WavSpec::for_buffer(buffer, bits_per_sample)?;
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if bits_per_sample == 32 {
        for frame in 0..buffer.length() {
            for channel in buffer.channels() {
                writer.write_sample(channel[frame])?;
            }
        }
    } else {
        let max_val = (1i32 << (bits_per_sample - 1)) as f32;
        for frame in 0..buffer.length() {
            for channel in buffer.channels() {
                let int_sample =
                    (channel[frame] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        channels = spec.channels,
        frames = buffer.length(),
        bits = bits_per_sample,
        "wav_write"
    );

    Ok(spec)
}
