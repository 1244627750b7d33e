//! Per-file analysis record.

use lorikeet_analysis::text::Sentiment;
use lorikeet_analysis::types::Tag;
use std::path::Path;

/// Result of analyzing one audio file.
///
/// Identity fields are always populated; every other field is independently
/// optional so one extraction step's failure never blocks another. Records
/// are immutable once handed to the report writer.
#[derive(Clone, Debug, Default)]
pub struct AnalysisRecord {
    pub file_name: String,
    pub file_path: String,
    /// Tempo estimate in beats per minute
    pub bpm: Option<f32>,
    /// Estimated key, e.g. "A major"
    pub key: Option<String>,
    /// Top genre tags, descending by confidence
    pub genres: Option<Vec<String>>,
    /// Confidence scores parallel to `genres`
    pub genre_scores: Option<Vec<f32>>,
    /// Four-component sentiment of the transcript (vocal tracks only)
    pub sentiment: Option<Sentiment>,
    /// Matched subject-matter categories (vocal tracks only)
    pub subjects: Option<Vec<String>>,
    /// Transcribed lyrics; empty string means no intelligible speech
    pub transcript: Option<String>,
}

impl AnalysisRecord {
    /// Record with only identity fields populated.
    pub fn new(path: &Path) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_path: path.to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    /// Attach ranked genre tags as parallel name/score lists.
    pub fn set_genres(&mut self, tags: &[Tag]) {
        self.genres = Some(tags.iter().map(|t| t.label.clone()).collect());
        self.genre_scores = Some(tags.iter().map(|t| t.score).collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_identity_only() {
        let record = AnalysisRecord::new(Path::new("/music/vocals/song.mp3"));

        assert_eq!(record.file_name, "song.mp3");
        assert_eq!(record.file_path, "/music/vocals/song.mp3");
        assert!(record.bpm.is_none());
        assert!(record.key.is_none());
        assert!(record.genres.is_none());
        assert!(record.genre_scores.is_none());
        assert!(record.sentiment.is_none());
        assert!(record.subjects.is_none());
        assert!(record.transcript.is_none());
    }

    #[test]
    fn genres_and_scores_stay_parallel() {
        let mut record = AnalysisRecord::new(Path::new("a.wav"));
        record.set_genres(&[
            Tag {
                label: "rock".to_string(),
                score: 0.9,
            },
            Tag {
                label: "pop".to_string(),
                score: 0.4,
            },
        ]);

        assert_eq!(record.genres.as_deref().unwrap(), ["rock", "pop"]);
        assert_eq!(record.genre_scores.as_deref().unwrap(), [0.9, 0.4]);
    }
}
