//! Multi-channel sample buffer produced by an offline render.

/// A planar buffer of `f32` samples: one `Vec` per channel, all the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: f32,
}

impl AudioBuffer {
    /// Creates a zeroed buffer.
    pub fn new(number_of_channels: usize, length: usize, sample_rate: f32) -> Self {
        Self {
            channels: vec![vec![0.0; length]; number_of_channels],
            sample_rate,
        }
    }

    /// Creates a buffer from planar channel data.
    ///
    /// Channels shorter than the longest one are zero-padded.
    pub fn from_channels(mut channels: Vec<Vec<f32>>, sample_rate: f32) -> Self {
        let length = channels.iter().map(Vec::len).max().unwrap_or(0);
        for channel in &mut channels {
            channel.resize(length, 0.0);
        }
        Self {
            channels,
            sample_rate,
        }
    }

    /// Creates a buffer from interleaved samples.
    pub fn from_interleaved(samples: &[f32], number_of_channels: usize, sample_rate: f32) -> Self {
        let number_of_channels = number_of_channels.max(1);
        let mut channels = vec![Vec::with_capacity(samples.len() / number_of_channels); number_of_channels];
        for frame in samples.chunks(number_of_channels) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::from_channels(channels, sample_rate)
    }

    /// Returns the number of channels.
    pub fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    /// Returns the number of sample frames per channel.
    pub fn length(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Returns true if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Returns the duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.length() as f64 / self.sample_rate as f64
        } else {
            0.0
        }
    }

    /// Returns the samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= number_of_channels()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Returns the samples of one channel for writing.
    ///
    /// # Panics
    ///
    /// Panics if `index >= number_of_channels()`.
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Returns all channels.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Fills every channel with zeros.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// Adds another buffer's contents sample-by-sample (mix/accumulate).
    ///
    /// Only overlapping channels and frames are mixed.
    pub fn accumulate_from(&mut self, other: &AudioBuffer) {
        for (dst, src) in self.channels.iter_mut().zip(other.channels.iter()) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d += *s;
            }
        }
    }

    /// Returns the samples interleaved frame by frame.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let channels = self.number_of_channels();
        let mut out = Vec::with_capacity(self.length() * channels);
        for frame in 0..self.length() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }

    /// Root-mean-square level across all channels.
    pub fn rms(&self) -> f32 {
        let count = self.length() * self.number_of_channels();
        if count == 0 {
            return 0.0;
        }
        let sum: f32 = self.channels.iter().flatten().map(|s| s * s).sum();
        (sum / count as f32).sqrt()
    }
}
