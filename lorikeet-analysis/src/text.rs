//! Sentiment scoring and subject-matter detection for transcribed text.

use crate::error::{Result, TextError};
use serde::Serialize;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Built-in subject-matter categories and their keyword lists.
///
/// A category is flagged when any keyword appears as an exact token in the
/// case-folded text. Substring and stem matches do not count, so multi-word
/// keywords can never match.
const SUBJECTS: &[(&str, &[&str])] = &[
    ("love", &["love", "heart", "romance"]),
    ("work", &["work", "job", "career"]),
    ("heart-ache", &["heartache", "sad", "broken"]),
    ("public-speaking", &["speech", "presentation", "public speaking"]),
    ("traveling-in-italy", &["travel", "italy", "trip"]),
];

/// Four-component lexicon sentiment score.
///
/// negative/neutral/positive are proportions in [0, 1]; compound is the
/// normalized aggregate in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Sentiment {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
    pub compound: f64,
}

impl Sentiment {
    /// All-zero sentiment, reported for empty input.
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Combined text analysis result.
#[derive(Clone, Debug, PartialEq)]
pub struct TextReport {
    pub sentiment: Sentiment,
    /// Matched subject-matter categories, unordered
    pub subjects: Vec<String>,
}

/// Text analyzer holding the sentiment lexicon and subject keyword tables.
///
/// Construct once and reuse across files; the lexicon is loaded at
/// construction time, not per call.
pub struct TextAnalyzer {
    analyzer: SentimentIntensityAnalyzer<'static>,
    subjects: Vec<(String, Vec<String>)>,
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAnalyzer {
    /// Analyzer with the built-in subject categories.
    pub fn new() -> Self {
        let subjects = SUBJECTS
            .iter()
            .map(|(name, keywords)| {
                (
                    name.to_string(),
                    keywords.iter().map(|k| k.to_string()).collect(),
                )
            })
            .collect();

        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            subjects,
        }
    }

    /// Analyzer with custom subject categories.
    pub fn with_subjects(subjects: Vec<(String, Vec<String>)>) -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            subjects,
        }
    }

    /// Score sentiment and flag subject matter for the given text.
    ///
    /// Empty or whitespace-only input yields neutral sentiment and no
    /// subjects.
    pub fn analyze(&self, text: &str) -> Result<TextReport> {
        if text.trim().is_empty() {
            return Ok(TextReport {
                sentiment: Sentiment::neutral(),
                subjects: Vec::new(),
            });
        }

        let scores = self.analyzer.polarity_scores(text);

        let component = |key: &str| -> Result<f64> {
            scores
                .get(key)
                .copied()
                .ok_or_else(|| TextError::MissingScores.into())
        };

        let sentiment = Sentiment {
            negative: component("neg")?,
            neutral: component("neu")?,
            positive: component("pos")?,
            compound: component("compound")?,
        };

        let tokens: HashSet<String> = text
            .to_lowercase()
            .unicode_words()
            .map(|w| w.to_string())
            .collect();

        let subjects = self
            .subjects
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| tokens.contains(k.as_str())))
            .map(|(name, _)| name.clone())
            .collect();

        Ok(TextReport { sentiment, subjects })
    }
}
