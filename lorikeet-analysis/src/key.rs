//! Musical key estimation from a mean chromagram.

use crate::audio;
use crate::error::{FeatureError, Result};
use std::fmt;

const N_FFT: usize = 4096;
const HOP_LENGTH: usize = 2048;

/// Pitch class names in chromatic order from C.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Estimated musical key.
///
/// Only the pitch class is estimated; the mode is always reported as major.
/// Minor keys are never reported distinctly, a known coarse approximation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Key {
    pub pitch_class: usize,
}

impl Key {
    pub fn name(&self) -> &'static str {
        PITCH_CLASSES[self.pitch_class % 12]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} major", self.name())
    }
}

/// Estimate the key of a mono signal at its native rate.
///
/// Accumulates STFT bin energy into twelve pitch classes (80-4000 Hz band),
/// averages over time, and takes the pitch class with peak energy.
pub fn estimate_key(samples: &[f32], sample_rate: u32) -> Result<Key> {
    let spectrogram = audio::stft(samples, N_FFT, HOP_LENGTH, N_FFT);
    let num_frames = spectrogram.shape()[1];

    if num_frames == 0 {
        return Err(FeatureError::SignalTooShort {
            frames: 0,
            min: 1,
        }
        .into());
    }

    let mut chroma = [0.0f32; 12];

    for frame_idx in 0..num_frames {
        let frame = spectrogram.column(frame_idx);

        for (bin_idx, &magnitude) in frame.iter().enumerate() {
            if magnitude > 1e-6 {
                let freq = bin_idx as f32 * sample_rate as f32 / N_FFT as f32;
                if freq > 80.0 && freq < 4000.0 {
                    chroma[freq_to_pitch_class(freq)] += magnitude;
                }
            }
        }
    }

    let total: f32 = chroma.iter().sum();
    if total <= 0.0 {
        return Err(FeatureError::NoTonalEnergy.into());
    }

    let pitch_class = chroma
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);

    Ok(Key { pitch_class })
}

/// Map a frequency to its pitch class via the MIDI note scale (A4 = 440 Hz).
fn freq_to_pitch_class(freq: f32) -> usize {
    let midi_note = 69.0 + 12.0 * (freq / 440.0).log2();
    ((midi_note.round() as i32) % 12).rem_euclid(12) as usize
}
