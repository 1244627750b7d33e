//! lorikeet-analysis: audio feature extraction and content analysis.
//!
//! This crate provides the per-file analysis capabilities behind the
//! `lorikeet` batch tool:
//!
//! - [`audio`]: WAV loading, resampling, and mel/STFT preprocessing
//! - [`tempo`] / [`key`]: acoustic feature estimation from the waveform
//! - [`tagger`]: pretrained ONNX multi-label genre tagging
//! - [`transcribe`]: offline CTC speech recognition
//! - [`text`]: lexicon sentiment scoring and subject-matter detection
//!
//! The tagger and recognizer are exposed behind the [`traits::AudioTagger`]
//! and [`traits::SpeechRecognizer`] traits so orchestration can run against
//! fake backends in tests.
//!
//! # Quick Start
//!
//! ```ignore
//! use lorikeet_analysis::audio;
//! use lorikeet_analysis::tempo::TempoEstimator;
//!
//! let (samples, sample_rate) = audio::read_audio_mono("track.wav")?;
//! let bpm = TempoEstimator::default().estimate(&samples, sample_rate)?;
//! println!("{bpm:.1} BPM");
//! ```

pub mod audio;
pub mod error;
pub mod key;
pub mod tagger;
pub mod tempo;
pub mod text;
pub mod traits;
pub mod transcribe;
pub mod types;
pub mod vocab;
