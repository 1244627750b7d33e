//! lorikeet: batch audio analysis to a CSV report.
//!
//! Walks two directory trees (vocal and instrumental tracks), normalizes
//! each file to WAV, extracts tempo, key, and genre tags, transcribes and
//! analyzes lyrics for vocal tracks, and writes one flat CSV report.

pub mod cli;
pub mod config;
pub mod convert;
pub mod discover;
pub mod pipeline;
pub mod record;
pub mod report;
