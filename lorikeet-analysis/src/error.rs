//! Error types for lorikeet-analysis organized by processing stage.

use ndarray::ShapeError;
use ndarray_stats::errors::MinMaxError;
use thiserror::Error;

/// Analysis error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Audio loading stage error
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Acoustic feature extraction error
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Model inference stage error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Text analysis stage error
    #[error(transparent)]
    Text(#[from] TextError),
}

/// Audio loading and validation errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Signal contains no samples
    #[error("empty audio signal")]
    EmptySignal,

    /// Channel count validation failed
    #[error("invalid channel count: expected mono or stereo, got {0} channels")]
    InvalidChannels(u16),

    /// Sample rate of zero or otherwise unusable
    #[error("invalid sample rate: {0}Hz")]
    InvalidSampleRate(u32),

    /// IO error during audio loading
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WAV file format error
    #[error(transparent)]
    Hound(#[from] hound::Error),
}

/// Acoustic feature extraction errors (tempo, key).
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Signal too short to derive the feature
    #[error("signal too short for analysis: {frames} frames (minimum {min})")]
    SignalTooShort { frames: usize, min: usize },

    /// Onset envelope carries no periodicity usable for tempo
    #[error("no tempo periodicity detected")]
    NoPeriodicity,

    /// Chromagram carries no energy in the analyzed band
    #[error("no tonal energy detected")]
    NoTonalEnergy,
}

/// Model inference errors (ONNX, ndarray operations, vocabularies).
#[derive(Debug, Error)]
pub enum ModelError {
    /// Missing expected output tensor
    #[error("missing model output: {name}")]
    MissingOutput { name: String },

    /// Tag label list does not match the model's output width
    #[error("label count mismatch: {labels} labels for {outputs} model outputs")]
    LabelCountMismatch { labels: usize, outputs: usize },

    /// Vocabulary file could not be parsed
    #[error("invalid vocabulary line {line}: {reason}")]
    InvalidVocabulary { line: usize, reason: String },

    /// ONNX Runtime error
    #[error(transparent)]
    Ort(#[from] ort::Error),

    /// ndarray shape error
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// ndarray-stats min/max error
    #[error(transparent)]
    MinMax(#[from] MinMaxError),
}

/// Text analysis errors.
#[derive(Debug, Error)]
pub enum TextError {
    /// Sentiment lexicon produced no usable scores
    #[error("sentiment analyzer returned no scores")]
    MissingScores,
}

/// Result type alias for lorikeet-analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// hound::Error → AudioError → Error
impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Audio(AudioError::Hound(e))
    }
}

// std::io::Error → AudioError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Audio(AudioError::Io(e))
    }
}

// ort::Error → ModelError → Error
impl From<ort::Error> for Error {
    fn from(e: ort::Error) -> Self {
        Error::Model(ModelError::Ort(e))
    }
}

// ShapeError → ModelError → Error
impl From<ShapeError> for Error {
    fn from(e: ShapeError) -> Self {
        Error::Model(ModelError::Shape(e))
    }
}

// MinMaxError → ModelError → Error
impl From<MinMaxError> for Error {
    fn from(e: MinMaxError) -> Self {
        Error::Model(ModelError::MinMax(e))
    }
}
