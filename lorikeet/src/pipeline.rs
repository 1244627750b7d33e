//! Per-file analysis orchestration.
//!
//! Strictly sequential per file: Normalize -> {Tempo, Key, Genre} ->
//! [vocal only] Transcribe -> Analyze Text -> Cleanup -> Emit Record.
//! Every step's failure is logged with file context and recorded as an
//! absent field; a failed normalization is the only early exit. Nothing
//! here aborts the batch.

use crate::convert;
use crate::record::AnalysisRecord;
use lorikeet_analysis::audio;
use lorikeet_analysis::key;
use lorikeet_analysis::tempo::TempoEstimator;
use lorikeet_analysis::text::TextAnalyzer;
use lorikeet_analysis::traits::{AudioTagger, SpeechRecognizer};
use std::path::Path;

/// Batch analysis pipeline.
///
/// The tagger and recognizer are injected capabilities; either may be absent,
/// in which case the corresponding fields stay unpopulated. The text analyzer
/// is constructed once and reused across all files.
pub struct Pipeline {
    tempo: TempoEstimator,
    text: TextAnalyzer,
    tagger: Option<Box<dyn AudioTagger>>,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
}

impl Pipeline {
    pub fn new(
        tagger: Option<Box<dyn AudioTagger>>,
        recognizer: Option<Box<dyn SpeechRecognizer>>,
    ) -> Self {
        Self {
            tempo: TempoEstimator::default(),
            text: TextAnalyzer::new(),
            tagger,
            recognizer,
        }
    }

    /// Analyze one file, returning its record.
    ///
    /// `has_vocals` is an explicit input: the caller decides the designation
    /// (here, by which root directory the file came from).
    pub fn process_file(&mut self, path: &Path, has_vocals: bool) -> AnalysisRecord {
        let mut record = AnalysisRecord::new(path);
        let file = record.file_name.clone();

        // Normalization failure short-circuits straight to the emitted
        // record; everything downstream stays absent.
        let normalized = match convert::normalize(path) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::warn!(%file, error = %e, "conversion failed, skipping file");
                return record;
            }
        };

        let (samples, sample_rate) = match audio::read_audio_mono(normalized.path()) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(%file, error = %e, "unreadable waveform, skipping file");
                return record;
            }
        };

        // Tempo, key, and genre fail independently of each other
        match self.tempo.estimate(&samples, sample_rate) {
            Ok(bpm) => record.bpm = Some(bpm),
            Err(e) => tracing::warn!(%file, error = %e, "tempo estimation failed"),
        }

        match key::estimate_key(&samples, sample_rate) {
            Ok(key) => record.key = Some(key.to_string()),
            Err(e) => tracing::warn!(%file, error = %e, "key estimation failed"),
        }

        if let Some(tagger) = self.tagger.as_mut() {
            match tagger.tag(&samples, sample_rate) {
                Ok(tags) => record.set_genres(&tags),
                Err(e) => {
                    tracing::warn!(%file, error = %e, "genre tagging failed");
                    record.set_genres(&[]);
                }
            }
        }

        if has_vocals {
            if let Some(recognizer) = self.recognizer.as_mut() {
                // Backend failure degrades to an empty transcript, same as
                // "no intelligible speech"
                let transcript = match recognizer.transcribe(&samples, sample_rate) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(%file, error = %e, "transcription backend failed");
                        String::new()
                    }
                };

                match self.text.analyze(&transcript) {
                    Ok(report) => {
                        record.sentiment = Some(report.sentiment);
                        record.subjects = Some(report.subjects);
                    }
                    Err(e) => tracing::warn!(%file, error = %e, "text analysis failed"),
                }

                record.transcript = Some(transcript);
            } else {
                tracing::debug!(%file, "no recognizer configured, skipping transcription");
            }
        }

        // `normalized` drops here, removing any temp wav
        record
    }
}
