//! One render quantum of multi-channel audio, with channel mixing.
//!
//! Mixing rules when summing a source bus into a destination bus:
//!
//! | Source | Destination | Rule |
//! |---|---|---|
//! | N | N | sample-wise sum |
//! | 1 | N | the mono channel is added to every channel |
//! | M | 1 | the average of all source channels |
//! | M | N, M > N > 1 | channel `k` goes to `k % N`, averaged per destination channel |
//! | M | N, 1 < M < N | discrete: channel `k` to `k`, the rest untouched |

/// Frames per render quantum.
pub const QUANTUM: usize = 128;

/// Planar audio for one render quantum.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    channels: Vec<[f32; QUANTUM]>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::silent(1)
    }
}

impl Bus {
    /// A silent bus with `channels` channels (at least one).
    pub fn silent(channels: usize) -> Self {
        Self {
            channels: vec![[0.0; QUANTUM]; channels.max(1)],
        }
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &[f32; QUANTUM] {
        &self.channels[index]
    }

    /// Samples of one channel for writing.
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32; QUANTUM] {
        &mut self.channels[index]
    }

    /// Resizes to `channels` channels and silences every sample.
    pub fn reset(&mut self, channels: usize) {
        self.channels.resize(channels.max(1), [0.0; QUANTUM]);
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// Returns true if every sample is zero.
    pub fn is_silent(&self) -> bool {
        self.channels.iter().flatten().all(|s| *s == 0.0)
    }

    /// Adds `source` into this bus following the mixing rules above.
    pub fn mix_from(&mut self, source: &Bus) {
        let to = self.channel_count();
        let from = source.channel_count();

        if from == to || (from > 1 && from < to) {
            for (dst, src) in self.channels.iter_mut().zip(&source.channels) {
                add(dst, src, 1.0);
            }
        } else if from == 1 {
            for dst in &mut self.channels {
                add(dst, &source.channels[0], 1.0);
            }
        } else {
            // Down-mix: fold source channels onto destination channels.
            for (index, dst) in self.channels.iter_mut().enumerate() {
                let folded = (index..from).step_by(to).count();
                let scale = 1.0 / folded as f32;
                for src in source.channels.iter().skip(index).step_by(to) {
                    add(dst, src, scale);
                }
            }
        }
    }

    /// Adds the mono down-mix of this bus into `out`.
    pub fn add_mono_into(&self, out: &mut [f32; QUANTUM]) {
        let scale = 1.0 / self.channel_count() as f32;
        for channel in &self.channels {
            add(out, channel, scale);
        }
    }
}

#[inline]
fn add(dst: &mut [f32; QUANTUM], src: &[f32; QUANTUM], scale: f32) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d += *s * scale;
    }
}
