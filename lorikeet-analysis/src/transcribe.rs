//! Offline CTC speech recognition via ONNX Runtime.

use crate::audio::{self, MelSpectrogram, ASR_SAMPLE_RATE};
use crate::error::{ModelError, Result};
use crate::traits::SpeechRecognizer;
use crate::types::ModelRepo;
use crate::vocab::Vocabulary;
use eyre::{Result as EyreResult, WrapErr};
use ndarray::prelude::*;
use ndarray_stats::QuantileExt;
use ort::session::builder::SessionBuilder;
use ort::session::Session;
use ort::value::Value;

/// Prefix of the signal used for ambient-noise calibration, in seconds.
const CALIBRATION_PREFIX_SECS: f32 = 0.5;

/// A frame must exceed the calibrated noise floor by this factor to count
/// as speech energy.
const SPEECH_ENERGY_RATIO: f32 = 1.5;

/// Analysis window for the speech-presence check (25ms at 16kHz).
const ENERGY_FRAME: usize = 400;

/// CTC speech recognizer over a pretrained acoustic model.
///
/// Consumes mono 16kHz audio (callers at other rates are resampled), applies
/// mel preprocessing, runs the acoustic model, and greedy-decodes the CTC
/// log-probabilities against a SentencePiece vocabulary.
pub struct CtcRecognizer {
    mel: MelSpectrogram,
    session: Session,
    vocab: Vocabulary,
}

impl CtcRecognizer {
    /// Load the recognizer from a model repository.
    ///
    /// Expects `ctc-model.onnx` (or `model.onnx`) and `vocab.txt`.
    pub fn from_repo(repo: &ModelRepo, session_builder: SessionBuilder) -> EyreResult<Self> {
        let model_path = repo.resolve_any(&["ctc-model.onnx", "model.onnx"])?;
        let vocab_path = repo.resolve("vocab.txt")?;

        let session = session_builder
            .commit_from_file(&model_path)
            .wrap_err("failed to load recognizer session")?;

        let vocab = Vocabulary::from_file(&vocab_path)
            .wrap_err_with(|| format!("failed to load vocabulary: {:?}", vocab_path.display()))?;

        Ok(Self {
            mel: MelSpectrogram::ASR,
            session,
            vocab,
        })
    }

    fn forward(&mut self, features: Array2<f32>) -> Result<Array2<f32>> {
        let num_frames = features.shape()[0];

        let length = Value::from_array(Array1::from_elem((1,), num_frames as i64))?;
        let audio_signal = Value::from_array(features.reversed_axes().insert_axis(Axis(0)))?;

        let mut outputs = self.session.run(ort::inputs!(
            "audio_signal" => audio_signal,
            "length" => length,
        ))?;

        let logprobs = outputs
            .remove("logprobs")
            .ok_or_else(|| ModelError::MissingOutput {
                name: "logprobs".to_string(),
            })?;

        let logprobs = logprobs
            .try_extract_array()?
            .to_owned()
            .into_dimensionality::<Ix3>()?;

        Ok(logprobs.index_axis(Axis(0), 0).to_owned())
    }

    /// Greedy CTC decode: per-frame argmax, collapse repeats, drop blanks.
    fn greedy_decode(&self, logprobs: &Array2<f32>) -> Result<Vec<usize>> {
        let blank_id = self.vocab.size();
        let mut token_ids = Vec::new();
        let mut previous = blank_id;

        for frame in logprobs.axis_iter(Axis(0)) {
            let token_id = frame.argmax()?;

            if token_id != blank_id && token_id != previous {
                token_ids.push(token_id);
            }
            previous = token_id;
        }

        Ok(token_ids)
    }
}

impl SpeechRecognizer for CtcRecognizer {
    fn transcribe(&mut self, samples: &[f32], sample_rate: u32) -> Result<String> {
        let resampled = audio::resample_linear(samples, sample_rate, ASR_SAMPLE_RATE);

        // Calibrate against the leading ambient noise; a track whose energy
        // never rises above the floor carries no intelligible speech.
        if !has_speech_energy(&resampled) {
            tracing::debug!("no frame above calibrated noise floor");
            return Ok(String::new());
        }

        let features = self.mel.apply(&resampled);
        if features.shape()[0] == 0 {
            return Ok(String::new());
        }

        let logprobs = self.forward(features)?;
        let token_ids = self.greedy_decode(&logprobs)?;

        Ok(self.vocab.decode(&token_ids))
    }
}

/// Ambient-noise calibration followed by a speech-presence check.
///
/// The RMS of the leading [`CALIBRATION_PREFIX_SECS`] establishes the noise
/// floor; the rest of the signal must contain at least one analysis frame
/// exceeding it by [`SPEECH_ENERGY_RATIO`].
fn has_speech_energy(samples: &[f32]) -> bool {
    if samples.is_empty() {
        return false;
    }

    let prefix_len = ((CALIBRATION_PREFIX_SECS * ASR_SAMPLE_RATE as f32) as usize)
        .min(samples.len());
    let noise_floor = rms(&samples[..prefix_len]);

    // Threshold never degenerates to zero on digital silence
    let threshold = (noise_floor * SPEECH_ENERGY_RATIO).max(1e-4);

    samples[prefix_len..]
        .chunks(ENERGY_FRAME)
        .any(|frame| rms(frame) > threshold)
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|&s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_has_no_speech_energy() {
        let samples = vec![0.0f32; ASR_SAMPLE_RATE as usize * 2];
        assert!(!has_speech_energy(&samples));
    }

    #[test]
    fn burst_above_noise_floor_is_speech() {
        let mut samples = vec![0.001f32; ASR_SAMPLE_RATE as usize * 2];
        // 100ms burst one second in
        for s in samples[16000..17600].iter_mut() {
            *s = 0.5;
        }
        assert!(has_speech_energy(&samples));
    }

    #[test]
    fn uniform_noise_is_not_speech() {
        // Constant low-level hiss: nothing ever exceeds the calibrated floor
        let samples = vec![0.01f32; ASR_SAMPLE_RATE as usize * 2];
        assert!(!has_speech_energy(&samples));
    }

    #[test]
    fn empty_signal_is_not_speech() {
        assert!(!has_speech_energy(&[]));
    }
}
