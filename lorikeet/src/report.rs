//! CSV export of analysis records.

use crate::record::AnalysisRecord;
use eyre::{Result, WrapErr};
use std::path::Path;

/// Fixed, deterministic column header.
pub const CSV_HEADER: [&str; 9] = [
    "file_name",
    "file_path",
    "bpm",
    "key",
    "genres",
    "genre_confidence_scores",
    "sentiment",
    "subject_matter",
    "transcribed_text",
];

/// Write all records to a CSV file, one row per input file.
///
/// Absent values render as empty cells; list- and map-valued fields render
/// as their literal JSON representation. Row order is the order records were
/// collected in (vocal batch first, then instrumental).
pub fn write_report(records: &[AnalysisRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .wrap_err_with(|| format!("failed to create report: {:?}", path.display()))?;

    writer.write_record(CSV_HEADER)?;

    for record in records {
        writer.write_record(to_row(record)?)?;
    }

    writer.flush()?;
    Ok(())
}

fn to_row(record: &AnalysisRecord) -> Result<[String; 9]> {
    Ok([
        record.file_name.clone(),
        record.file_path.clone(),
        record.bpm.map(|b| b.to_string()).unwrap_or_default(),
        record.key.clone().unwrap_or_default(),
        json_or_empty(record.genres.as_ref())?,
        json_or_empty(record.genre_scores.as_ref())?,
        json_or_empty(record.sentiment.as_ref())?,
        json_or_empty(record.subjects.as_ref())?,
        record.transcript.clone().unwrap_or_default(),
    ])
}

fn json_or_empty<T: serde::Serialize>(value: Option<&T>) -> Result<String> {
    match value {
        Some(v) => serde_json::to_string(v).wrap_err("failed to serialize report field"),
        None => Ok(String::new()),
    }
}
