//! ONNX-backed multi-label genre tagger.

use crate::audio::{self, MelSpectrogram};
use crate::error::{AudioError, ModelError, Result};
use crate::traits::AudioTagger;
use crate::types::{ModelRepo, Tag};
use eyre::{Result as EyreResult, WrapErr};
use ndarray::prelude::*;
use ort::session::builder::SessionBuilder;
use ort::session::Session;
use ort::value::Value;

/// Number of top-ranked tags reported per file.
pub const TOP_TAGS: usize = 5;

/// Genre tagger backed by a pretrained ONNX audio-tagging model.
///
/// The model consumes a mel spectrogram and emits a taggram: frame-level
/// activations, one column per tag. Activations are averaged over time and
/// the top-ranked labels returned.
pub struct OnnxTagger {
    mel: MelSpectrogram,
    session: Session,
    labels: Vec<String>,
}

impl OnnxTagger {
    /// Load the tagger from a model repository.
    ///
    /// Expects `tagger-model.onnx` (or `model.onnx`) and a newline-delimited
    /// `labels.txt` naming the model's output tags in order.
    pub fn from_repo(repo: &ModelRepo, session_builder: SessionBuilder) -> EyreResult<Self> {
        let model_path = repo.resolve_any(&["tagger-model.onnx", "model.onnx"])?;
        let labels_path = repo.resolve("labels.txt")?;

        let session = session_builder
            .commit_from_file(&model_path)
            .wrap_err("failed to load tagger session")?;

        let labels: Vec<String> = std::fs::read_to_string(&labels_path)
            .wrap_err_with(|| format!("failed to read labels: {:?}", labels_path.display()))?
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        Ok(Self {
            mel: MelSpectrogram::TAGGER,
            session,
            labels,
        })
    }

    fn forward(&mut self, features: Array2<f32>) -> Result<Array1<f32>> {
        let num_frames = features.shape()[0];

        let length = Value::from_array(Array1::from_elem((1,), num_frames as i64))?;
        let features = Value::from_array(features.reversed_axes().insert_axis(Axis(0)))?;

        let mut outputs = self.session.run(ort::inputs!(
            "features" => features,
            "length" => length,
        ))?;

        let taggram = outputs
            .remove("taggram")
            .ok_or_else(|| ModelError::MissingOutput {
                name: "taggram".to_string(),
            })?;

        let taggram = taggram
            .try_extract_array()?
            .to_owned()
            .into_dimensionality::<Ix3>()?;

        // Average frame-level activations over time: [1, frames, tags] -> [tags]
        let mean = taggram
            .index_axis(Axis(0), 0)
            .mean_axis(Axis(0))
            .ok_or(AudioError::EmptySignal)?;

        Ok(mean)
    }
}

impl AudioTagger for OnnxTagger {
    fn tag(&mut self, samples: &[f32], sample_rate: u32) -> Result<Vec<Tag>> {
        if samples.is_empty() {
            return Err(AudioError::EmptySignal.into());
        }

        let resampled = audio::resample_linear(samples, sample_rate, self.mel.sample_rate as u32);
        let features = self.mel.apply(&resampled);

        if features.shape()[0] == 0 {
            return Err(AudioError::EmptySignal.into());
        }

        let activations = self.forward(features)?;

        if activations.len() != self.labels.len() {
            return Err(ModelError::LabelCountMismatch {
                labels: self.labels.len(),
                outputs: activations.len(),
            }
            .into());
        }

        Ok(rank_tags(&self.labels, activations.as_slice().unwrap_or(&[])))
    }
}

/// Pair labels with mean activations, sort by descending score, keep the top
/// [`TOP_TAGS`].
pub fn rank_tags(labels: &[String], activations: &[f32]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = labels
        .iter()
        .zip(activations.iter())
        .map(|(label, &score)| Tag {
            label: label.clone(),
            score,
        })
        .collect();

    tags.sort_by(|a, b| b.score.total_cmp(&a.score));
    tags.truncate(TOP_TAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_by_descending_score() {
        let tags = rank_tags(
            &labels(&["rock", "pop", "jazz"]),
            &[0.2, 0.9, 0.5],
        );

        assert_eq!(tags[0].label, "pop");
        assert_eq!(tags[1].label, "jazz");
        assert_eq!(tags[2].label, "rock");

        for pair in tags.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn keeps_at_most_five() {
        let names = labels(&["a", "b", "c", "d", "e", "f", "g"]);
        let scores = [0.1, 0.7, 0.3, 0.9, 0.2, 0.8, 0.4];

        let tags = rank_tags(&names, &scores);

        assert_eq!(tags.len(), TOP_TAGS);
        assert_eq!(tags[0].label, "d");
        assert_eq!(tags[4].label, "c");
    }

    #[test]
    fn fewer_labels_than_five_is_fine() {
        let tags = rank_tags(&labels(&["rock"]), &[0.5]);
        assert_eq!(tags.len(), 1);
    }
}
