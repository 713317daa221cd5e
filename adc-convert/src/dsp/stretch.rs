//! Time stretching (WSOLA) and pitch shifting
//!
//! Waveform-similarity overlap-add: frames are taken from the input at an
//! analysis hop of `rate * SYNTHESIS_HOP`, nudged within a small tolerance
//! to best continue the previous frame, and overlap-added at the synthesis
//! hop with a Hann window. Frame positions are chosen on the mono mix and
//! applied to every channel so channels stay aligned.

use std::f64::consts::PI;

use adc_common::{AudioSamples, Error, Result};

use super::resampler::{resample_by_ratio, ResampleType};

const FRAME_LENGTH: usize = 2048;
const MIN_FRAME_LENGTH: usize = 64;

/// Stride used when scoring candidate offsets
const CORRELATION_STRIDE: usize = 4;

/// Change the speed without changing the pitch.
///
/// `rate` > 1 speeds up (shorter output), `rate` < 1 slows down. The result
/// has `round(frames / rate)` frames.
pub fn time_stretch(samples: &AudioSamples, rate: f64) -> Result<AudioSamples> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(Error::InvalidInput(format!("Stretch rate must be positive: {}", rate)));
    }
    let frames = samples.frames();
    if frames == 0 || (rate - 1.0).abs() < f64::EPSILON {
        return Ok(samples.clone());
    }

    let out_len = ((frames as f64 / rate).round() as usize).max(1);

    let mut frame_length = FRAME_LENGTH;
    while frame_length > MIN_FRAME_LENGTH && frame_length * 2 > frames {
        frame_length /= 2;
    }
    if frame_length * 2 > frames {
        // Too short to overlap-add
        return Ok(samples.map_channels(|ch| linear_stretch(ch, out_len)));
    }

    let mono = samples.to_mono();
    let positions = wsola_positions(&mono.channels()[0], rate, frame_length, out_len);
    Ok(samples.map_channels(|ch| overlap_add(ch, &positions, frame_length, out_len)))
}

/// Shift the pitch by `steps` (fractional) semitone bins, keeping the duration
pub fn pitch_shift(
    samples: &AudioSamples,
    steps: f64,
    bins_per_octave: u32,
    kind: ResampleType,
) -> Result<AudioSamples> {
    if bins_per_octave == 0 {
        return Err(Error::Config("bins_per_octave must be positive".to_string()));
    }
    if steps == 0.0 || samples.is_empty() {
        return Ok(samples.clone());
    }
    let rate = 2f64.powf(-steps / bins_per_octave as f64);
    let stretched = time_stretch(samples, rate)?;
    let shifted = resample_by_ratio(&stretched, rate, kind)?;

    // Rounding in both steps can leave the length off by a frame or two
    let frames = samples.frames();
    Ok(shifted.map_channels(|ch| {
        let mut ch = ch.to_vec();
        ch.resize(frames, 0.0);
        ch
    }))
}

fn hann(length: usize) -> Vec<f32> {
    (0..length)
        .map(|i| (0.5 - 0.5 * (2.0 * PI * i as f64 / length as f64).cos()) as f32)
        .collect()
}

fn sample_at(signal: &[f32], index: i64) -> f32 {
    if index < 0 {
        0.0
    } else {
        signal.get(index as usize).copied().unwrap_or(0.0)
    }
}

/// Input start position for each synthesis frame
fn wsola_positions(signal: &[f32], rate: f64, frame_length: usize, out_len: usize) -> Vec<i64> {
    let hop = frame_length / 4;
    let tolerance = (hop / 2) as i64;
    let analysis_hop = hop as f64 * rate;
    let count = out_len.div_ceil(hop) + 1;

    let mut positions = Vec::with_capacity(count);
    let mut continuation: Option<i64> = None;

    for k in 0..count {
        let nominal = (k as f64 * analysis_hop).round() as i64;
        let position = match continuation {
            None => nominal,
            Some(natural) => {
                let mut best = nominal;
                let mut best_score = f32::MIN;
                for candidate in (nominal - tolerance)..=(nominal + tolerance) {
                    let score: f32 = (0..frame_length)
                        .step_by(CORRELATION_STRIDE)
                        .map(|i| {
                            sample_at(signal, candidate + i as i64) * sample_at(signal, natural + i as i64)
                        })
                        .sum();
                    if score > best_score {
                        best_score = score;
                        best = candidate;
                    }
                }
                best
            }
        };
        positions.push(position);
        continuation = Some(position + hop as i64);
    }

    positions
}

fn overlap_add(signal: &[f32], positions: &[i64], frame_length: usize, out_len: usize) -> Vec<f32> {
    let hop = frame_length / 4;
    let window = hann(frame_length);
    let mut output = vec![0.0f32; out_len + frame_length];
    let mut norm = vec![0.0f32; out_len + frame_length];

    for (k, position) in positions.iter().enumerate() {
        let out_start = k * hop;
        if out_start >= out_len {
            break;
        }
        for (i, w) in window.iter().enumerate() {
            output[out_start + i] += w * sample_at(signal, position + i as i64);
            norm[out_start + i] += w;
        }
    }

    output.truncate(out_len);
    for (sample, weight) in output.iter_mut().zip(norm) {
        if weight > 1e-3 {
            *sample /= weight;
        }
    }
    output
}

fn linear_stretch(signal: &[f32], out_len: usize) -> Vec<f32> {
    if signal.is_empty() {
        return vec![0.0; out_len];
    }
    let step = signal.len() as f64 / out_len as f64;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;
            let a = signal[idx.min(signal.len() - 1)];
            let b = signal[(idx + 1).min(signal.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, rate: u32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    /// Crude frequency estimate from zero crossings
    fn zero_crossings(signal: &[f32]) -> usize {
        signal.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count()
    }

    #[test]
    fn test_stretch_length() {
        let input = AudioSamples::new(vec![sine(440.0, 16000, 16000), sine(220.0, 16000, 16000)]);
        let faster = time_stretch(&input, 2.0).unwrap();
        assert_eq!(faster.frames(), 8000);
        assert_eq!(faster.channel_count(), 2);

        let slower = time_stretch(&input, 0.5).unwrap();
        assert_eq!(slower.frames(), 32000);
    }

    #[test]
    fn test_stretch_keeps_pitch() {
        let input = AudioSamples::mono(sine(440.0, 16000, 16000));
        let slower = time_stretch(&input, 0.5).unwrap();
        // Twice as long at the same frequency: about twice the crossings
        let before = zero_crossings(&input.channels()[0]) as f64;
        let after = zero_crossings(&slower.channels()[0]) as f64;
        assert!((after / before - 2.0).abs() < 0.1, "{} vs {}", before, after);
    }

    #[test]
    fn test_stretch_identity_and_invalid() {
        let input = AudioSamples::mono(sine(440.0, 16000, 1000));
        assert_eq!(time_stretch(&input, 1.0).unwrap(), input);
        assert!(time_stretch(&input, 0.0).is_err());
        assert!(time_stretch(&input, f64::NAN).is_err());
    }

    #[test]
    fn test_short_signal_uses_linear() {
        let input = AudioSamples::mono(vec![0.0, 1.0, 0.0, -1.0]);
        assert_eq!(time_stretch(&input, 0.5).unwrap().frames(), 8);
    }

    #[test]
    fn test_pitch_shift_preserves_length_and_raises_pitch() {
        let input = AudioSamples::mono(sine(440.0, 16000, 16000));
        let shifted = pitch_shift(&input, 12.0, 12, ResampleType::SincBest).unwrap();
        assert_eq!(shifted.frames(), 16000);

        let before = zero_crossings(&input.channels()[0]) as f64;
        let after = zero_crossings(&shifted.channels()[0]) as f64;
        assert!((after / before - 2.0).abs() < 0.15, "{} vs {}", before, after);
    }
}
