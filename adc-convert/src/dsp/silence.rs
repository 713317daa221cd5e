//! Leading/trailing silence detection
//!
//! Frame energies are measured on the mono mix with centred frames and
//! compared against the loudest frame: frames within `top_db` of the peak
//! count as non-silent.

use adc_common::AudioSamples;

/// Floor applied to frame power before taking the log
const AMIN: f64 = 1e-10;

/// Trim parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimParams {
    /// Threshold below the reference peak, in decibels
    pub top_db: f64,
    pub frame_length: usize,
    pub hop_length: usize,
}

impl Default for TrimParams {
    fn default() -> Self {
        Self {
            top_db: 60.0,
            frame_length: 2048,
            hop_length: 512,
        }
    }
}

impl TrimParams {
    /// Replace the default threshold (builder style)
    pub fn with_top_db(mut self, top_db: f64) -> Self {
        self.top_db = top_db;
        self
    }
}

/// Mean power of each centred frame
fn frame_power(signal: &[f32], frame_length: usize, hop_length: usize) -> Vec<f64> {
    let half = (frame_length / 2) as i64;
    let count = 1 + signal.len() / hop_length;
    (0..count)
        .map(|f| {
            let center = (f * hop_length) as i64;
            let sum: f64 = (center - half..center + half)
                .filter(|i| *i >= 0 && (*i as usize) < signal.len())
                .map(|i| {
                    let s = signal[i as usize] as f64;
                    s * s
                })
                .sum();
            sum / frame_length as f64
        })
        .collect()
}

/// Frame range `[start, end)` of the non-silent part of `samples`.
///
/// A clip with no frame above the threshold yields an empty range.
pub fn nonsilent_range(samples: &AudioSamples, params: &TrimParams) -> (usize, usize) {
    let frames = samples.frames();
    if frames == 0 || params.frame_length == 0 || params.hop_length == 0 {
        return (0, frames);
    }

    let mono = samples.to_mono();
    let power = frame_power(&mono.channels()[0], params.frame_length, params.hop_length);
    let reference = power.iter().cloned().fold(0.0, f64::max).max(AMIN);
    let to_db = |p: f64| 10.0 * p.max(AMIN).log10() - 10.0 * reference.log10();

    let mut loud = power
        .iter()
        .enumerate()
        .filter(|(_, p)| to_db(**p) > -params.top_db)
        .map(|(i, _)| i);

    match loud.next() {
        Some(first) => {
            let last = loud.last().unwrap_or(first);
            let start = (first * params.hop_length).min(frames);
            let end = ((last + 1) * params.hop_length).min(frames);
            (start, end)
        }
        None => (0, 0),
    }
}
