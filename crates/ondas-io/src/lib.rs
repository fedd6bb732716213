//! WAV file IO for ondas.
//!
//! This crate moves [`AudioBuffer`](ondas_core::AudioBuffer)s in and out of
//! WAV files:
//!
//! - [`read_wav`] loads every channel of a PCM or float file
//! - [`write_wav`] saves a rendered buffer at 16, 24 or 32-bit (float)
//! - [`read_wav_info`] reads the header only
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ondas_io::{read_wav, write_wav};
//!
//! let buffer = read_wav("input.wav")?;
//! write_wav("copy.wav", &buffer, 24)?;
//! ```

mod wav;

pub use wav::{
    SUPPORTED_BIT_DEPTHS, WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav,
};

/// Error types for WAV IO.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The buffer cannot be stored as WAV.
    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for WAV IO.
pub type Result<T> = std::result::Result<T, Error>;
