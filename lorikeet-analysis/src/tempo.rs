//! Tempo estimation from an onset-strength envelope.

use crate::audio;
use crate::error::{FeatureError, Result};
use ndarray::{s, Array2};

const N_FFT: usize = 2048;
const HOP_LENGTH: usize = 512;

/// Minimum onset envelope length for a usable autocorrelation.
const MIN_ENVELOPE_FRAMES: usize = 64;

/// Tempo estimator over a spectral-flux onset envelope.
#[derive(Clone, Debug)]
pub struct TempoEstimator {
    min_tempo: f32,
    max_tempo: f32,
}

impl Default for TempoEstimator {
    fn default() -> Self {
        Self {
            min_tempo: 40.0,
            max_tempo: 220.0,
        }
    }
}

impl TempoEstimator {
    /// Estimate tempo in BPM from a mono signal at its native rate.
    ///
    /// Computes a spectral-flux onset-strength envelope over an STFT, then
    /// autocorrelates it at lags covering the valid tempo range. The lag with
    /// the highest correlation is the beat period. Octave ambiguity above
    /// 160 BPM is resolved toward the half tempo when its correlation is
    /// nearly as strong.
    pub fn estimate(&self, samples: &[f32], sample_rate: u32) -> Result<f32> {
        let spectrogram = audio::stft(samples, N_FFT, HOP_LENGTH, N_FFT);
        let envelope = onset_strength(&spectrogram);

        if envelope.len() < MIN_ENVELOPE_FRAMES {
            return Err(FeatureError::SignalTooShort {
                frames: envelope.len(),
                min: MIN_ENVELOPE_FRAMES,
            }
            .into());
        }

        let frame_duration = HOP_LENGTH as f32 / sample_rate as f32;

        // Lag range in frames for the valid tempo window
        let min_lag = (60.0 / (self.max_tempo * frame_duration)).floor() as usize;
        let max_lag = (60.0 / (self.min_tempo * frame_duration)).ceil() as usize;
        let max_lag = max_lag.min(envelope.len() / 2);

        if min_lag >= max_lag {
            return Err(FeatureError::SignalTooShort {
                frames: envelope.len(),
                min: MIN_ENVELOPE_FRAMES,
            }
            .into());
        }

        // Remove DC bias before correlating
        let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
        let centered: Vec<f32> = envelope.iter().map(|&x| x - mean).collect();

        let energy: f32 = centered.iter().map(|&x| x * x).sum();
        if energy < 1e-10 {
            return Err(FeatureError::NoPeriodicity.into());
        }

        let n = centered.len();
        let corr_at = |lag: usize| -> f32 {
            centered[..n - lag]
                .iter()
                .zip(centered[lag..].iter())
                .map(|(&a, &b)| a * b)
                .sum::<f32>()
                / energy
        };

        let mut best_lag = min_lag;
        let mut best_corr = f32::NEG_INFINITY;

        for lag in min_lag..=max_lag {
            let corr = corr_at(lag);
            if corr > best_corr {
                best_corr = corr;
                best_lag = lag;
            }
        }

        if best_corr < 0.05 {
            return Err(FeatureError::NoPeriodicity.into());
        }

        // Parabolic interpolation around the peak for sub-frame precision
        let tempo_lag = if best_lag > min_lag && best_lag < max_lag {
            let prev = corr_at(best_lag - 1);
            let curr = best_corr;
            let next = corr_at(best_lag + 1);

            let denom = prev - 2.0 * curr + next;
            if denom.abs() > 1e-10 {
                best_lag as f32 + 0.5 * (prev - next) / denom
            } else {
                best_lag as f32
            }
        } else {
            best_lag as f32
        };

        let beat_period = tempo_lag * frame_duration;
        if beat_period <= 0.0 {
            return Err(FeatureError::NoPeriodicity.into());
        }

        let bpm = 60.0 / beat_period;

        // Octave ambiguity: fast estimates often double the true tempo
        if bpm > 160.0 {
            let half_lag = (tempo_lag * 2.0).round() as usize;
            if half_lag <= max_lag && corr_at(half_lag) > best_corr * 0.6 {
                return Ok(bpm / 2.0);
            }
        }

        Ok(bpm)
    }
}

/// Compute normalized spectral flux from a power spectrogram.
///
/// Each flux value is normalized by frame energy so amplitude does not affect
/// the magnitude of detected changes.
fn onset_strength(spectrogram: &Array2<f32>) -> Vec<f32> {
    let num_frames = spectrogram.shape()[1];
    let mut flux = vec![0.0; num_frames];

    if num_frames < 2 {
        return flux;
    }

    for (i, flux_value) in flux.iter_mut().enumerate().skip(1).take(num_frames - 1) {
        let prev_frame = spectrogram.slice(s![.., i - 1]);
        let curr_frame = spectrogram.slice(s![.., i]);

        let raw: f32 = curr_frame
            .iter()
            .zip(prev_frame.iter())
            .map(|(&curr, &prev)| {
                let d = curr - prev;
                if d > 0.0 {
                    d
                } else {
                    0.0
                }
            })
            .sum();

        // Normalize by geometric mean of frame energies
        let curr_energy: f32 = curr_frame.iter().map(|&m| m * m).sum::<f32>();
        let prev_energy: f32 = prev_frame.iter().map(|&m| m * m).sum::<f32>();
        let norm = (curr_energy * prev_energy).sqrt().max(1e-10).sqrt();

        *flux_value = raw / norm;
    }

    flux
}
