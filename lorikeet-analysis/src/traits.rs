//! Core traits for injected analysis capabilities.
//!
//! The genre tagger and speech recognizer are external pretrained models.
//! Batch orchestration depends on these traits rather than on any concrete
//! backend, so it can be exercised with fake implementations.

use crate::error::Result;
use crate::types::Tag;

/// Multi-label audio tagger over a mono waveform.
pub trait AudioTagger {
    /// Tag the given audio, returning (label, score) pairs sorted by
    /// descending score.
    ///
    /// Note: Takes `&mut self` because ONNX Runtime's Session::run requires it.
    fn tag(&mut self, samples: &[f32], sample_rate: u32) -> Result<Vec<Tag>>;
}

/// Offline speech-to-text recognizer.
pub trait SpeechRecognizer {
    /// Transcribe the given audio.
    ///
    /// An empty string means no intelligible speech, which is not an error.
    /// Backend failures are returned as `Err` and are the caller's decision
    /// to degrade.
    fn transcribe(&mut self, samples: &[f32], sample_rate: u32) -> Result<String>;
}
