//! Decoded sample storage
//!
//! Samples are kept planar (one `Vec<f32>` per channel, range [-1.0, 1.0]),
//! which is what the resampler and the per-channel transforms consume.

/// Planar f32 audio samples
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioSamples {
    channels: Vec<Vec<f32>>,
}

impl AudioSamples {
    /// Create from planar channel data.
    ///
    /// Channels of unequal length are truncated to the shortest one.
    pub fn new(mut channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        for ch in channels.iter_mut() {
            ch.truncate(frames);
        }
        Self { channels }
    }

    /// Create single-channel samples
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            channels: vec![samples],
        }
    }

    /// Convert interleaved samples to planar format.
    ///
    /// Input:  [L, R, L, R, L, R, ...]
    /// Output: [[L, L, L, ...], [R, R, R, ...]]
    pub fn from_interleaved(samples: &[f32], channel_count: usize) -> Self {
        let channel_count = channel_count.max(1);
        let frames = samples.len() / channel_count;
        let mut planar = vec![Vec::with_capacity(frames); channel_count];

        for frame in samples.chunks_exact(channel_count) {
            for (ch, sample) in frame.iter().enumerate() {
                planar[ch].push(*sample);
            }
        }

        Self { channels: planar }
    }

    /// Convert planar samples back to interleaved format
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.frames() * self.channel_count());
        for frame_idx in 0..self.frames() {
            for ch in &self.channels {
                interleaved.push(ch[frame_idx]);
            }
        }
        interleaved
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_mono(&self) -> bool {
        self.channels.len() == 1
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Mix all channels down to one by averaging
    pub fn to_mono(&self) -> AudioSamples {
        let count = self.channel_count();
        if count <= 1 {
            return self.clone();
        }
        let mono = (0..self.frames())
            .map(|i| self.channels.iter().map(|ch| ch[i]).sum::<f32>() / count as f32)
            .collect();
        AudioSamples::mono(mono)
    }

    /// Copy of the frames in `start..end` (clamped to the available range)
    pub fn slice_frames(&self, start: usize, end: usize) -> AudioSamples {
        let end = end.min(self.frames());
        let start = start.min(end);
        AudioSamples {
            channels: self.channels.iter().map(|ch| ch[start..end].to_vec()).collect(),
        }
    }

    /// Apply a per-channel transform, keeping the channel layout
    pub fn map_channels<F>(&self, mut f: F) -> AudioSamples
    where
        F: FnMut(&[f32]) -> Vec<f32>,
    {
        AudioSamples::new(self.channels.iter().map(|ch| f(ch)).collect())
    }

    /// Duration in seconds at the given sample rate
    pub fn duration_seconds(&self, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / sample_rate as f64
    }
}
