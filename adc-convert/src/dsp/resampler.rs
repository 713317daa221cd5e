//! Sample rate conversion using rubato
//!
//! The whole clip is processed as a single chunk, then the resampler is
//! flushed and its output delay removed, so the result lines up with the
//! input and has `round(frames * ratio)` frames.

use adc_common::{AudioSamples, Error, Result};
use clap::ValueEnum;
use rubato::{
    FastFixedIn, PolynomialDegree, Resampler as RubatoResampler, SincFixedIn,
    SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Resampling algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResampleType {
    /// Long sinc filter, cubic interpolation (highest quality)
    #[default]
    #[value(name = "sinc_best")]
    SincBest,
    #[value(name = "sinc_medium")]
    SincMedium,
    #[value(name = "sinc_fastest")]
    SincFastest,
    /// Septic polynomial interpolation
    #[value(name = "polynomial")]
    Polynomial,
    #[value(name = "linear")]
    Linear,
}

impl ResampleType {
    fn sinc_parameters(&self) -> SincInterpolationParameters {
        let (sinc_len, f_cutoff, oversampling_factor, interpolation, window) = match self {
            ResampleType::SincMedium => (
                128,
                0.925,
                128,
                SincInterpolationType::Linear,
                WindowFunction::Blackman2,
            ),
            ResampleType::SincFastest => (
                64,
                0.915,
                64,
                SincInterpolationType::Nearest,
                WindowFunction::Hann2,
            ),
            _ => (
                256,
                0.95,
                256,
                SincInterpolationType::Cubic,
                WindowFunction::BlackmanHarris2,
            ),
        };
        SincInterpolationParameters {
            sinc_len,
            f_cutoff,
            interpolation,
            oversampling_factor,
            window,
        }
    }
}

/// Resample from `from_rate` to `to_rate`. Returns a copy if the rates match.
pub fn resample(samples: &AudioSamples, from_rate: u32, to_rate: u32, kind: ResampleType) -> Result<AudioSamples> {
    if from_rate == 0 || to_rate == 0 {
        return Err(Error::InvalidInput(format!(
            "Invalid sample rates for resampling: {} -> {}",
            from_rate, to_rate
        )));
    }
    if from_rate == to_rate {
        debug!("Sample rate already at {}Hz, skipping resample", to_rate);
        return Ok(samples.clone());
    }
    debug!(from = from_rate, to = to_rate, channels = samples.channel_count(), "Resampling");
    resample_by_ratio(samples, to_rate as f64 / from_rate as f64, kind)
}

/// Resample by an arbitrary output/input ratio
pub fn resample_by_ratio(samples: &AudioSamples, ratio: f64, kind: ResampleType) -> Result<AudioSamples> {
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(Error::InvalidInput(format!("Invalid resampling ratio: {}", ratio)));
    }
    let frames = samples.frames();
    let channels = samples.channel_count();
    if frames == 0 || channels == 0 || (ratio - 1.0).abs() < f64::EPSILON {
        return Ok(samples.clone());
    }

    let planar = match kind {
        ResampleType::SincBest | ResampleType::SincMedium | ResampleType::SincFastest => {
            let resampler = SincFixedIn::<f32>::new(ratio, 1.0, kind.sinc_parameters(), frames, channels)
                .map_err(|e| Error::InvalidInput(format!("Failed to create sinc resampler: {}", e)))?;
            run(resampler, samples.channels(), frames, ratio)?
        }
        ResampleType::Polynomial | ResampleType::Linear => {
            let degree = if kind == ResampleType::Linear {
                PolynomialDegree::Linear
            } else {
                PolynomialDegree::Septic
            };
            let resampler = FastFixedIn::<f32>::new(ratio, 1.0, degree, frames, channels)
                .map_err(|e| Error::InvalidInput(format!("Failed to create resampler: {}", e)))?;
            run(resampler, samples.channels(), frames, ratio)?
        }
    };

    Ok(AudioSamples::new(planar))
}

fn run<R: RubatoResampler<f32>>(
    mut resampler: R,
    input: &[Vec<f32>],
    frames: usize,
    ratio: f64,
) -> Result<Vec<Vec<f32>>> {
    let mut output = resampler
        .process(input, None)
        .map_err(|e| Error::Decode(format!("Resampling failed: {}", e)))?;

    let expected = (frames as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();

    // Flush until the delayed tail is out
    while output.first().map_or(0, Vec::len) < delay + expected {
        let tail = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| Error::Decode(format!("Resampling failed: {}", e)))?;
        if tail.first().map_or(true, Vec::is_empty) {
            break;
        }
        for (out, extra) in output.iter_mut().zip(tail) {
            out.extend(extra);
        }
    }

    debug!(input_frames = frames, output_frames = expected, delay, "Resampled");

    Ok(output
        .into_iter()
        .map(|ch| {
            let end = (delay + expected).min(ch.len());
            let start = delay.min(end);
            ch[start..end].to_vec()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(rate: u32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_resample_same_rate() {
        let input = AudioSamples::mono(vec![0.1, 0.2, 0.3]);
        let output = resample(&input, 44100, 44100, ResampleType::default()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_resample_different_rate() {
        for kind in [ResampleType::SincBest, ResampleType::SincFastest, ResampleType::Polynomial, ResampleType::Linear] {
            let input = AudioSamples::new(vec![sine(48000, 4800), sine(48000, 4800)]);
            let output = resample(&input, 48000, 16000, kind).unwrap();
            assert_eq!(output.channel_count(), 2);
            assert_eq!(output.frames(), 1600, "{:?}", kind);
        }
    }

    #[test]
    fn test_upsample_keeps_energy() {
        let input = AudioSamples::mono(sine(8000, 800));
        let output = resample(&input, 8000, 16000, ResampleType::SincBest).unwrap();
        let rms = |s: &[f32]| (s.iter().map(|x| x * x).sum::<f32>() / s.len() as f32).sqrt();
        let (a, b) = (rms(&input.channels()[0]), rms(&output.channels()[0]));
        assert!((a - b).abs() < 0.05, "rms {} vs {}", a, b);
    }

    #[test]
    fn test_invalid_rate() {
        let input = AudioSamples::mono(vec![0.0; 10]);
        assert!(resample(&input, 0, 16000, ResampleType::Linear).is_err());
    }
}
