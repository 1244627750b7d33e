//! End-to-end batch run against temp directory trees, with fake model
//! backends standing in for ONNX sessions.

use hound::{SampleFormat, WavSpec, WavWriter};
use lorikeet::discover::discover_audio_files;
use lorikeet::pipeline::Pipeline;
use lorikeet::report::write_report;
use lorikeet_analysis::error::Result;
use lorikeet_analysis::traits::{AudioTagger, SpeechRecognizer};
use lorikeet_analysis::types::Tag;
use std::path::Path;

struct FakeTagger;

impl AudioTagger for FakeTagger {
    fn tag(&mut self, _samples: &[f32], _sample_rate: u32) -> Result<Vec<Tag>> {
        Ok(vec![
            Tag {
                label: "rock".to_string(),
                score: 0.91,
            },
            Tag {
                label: "pop".to_string(),
                score: 0.40,
            },
        ])
    }
}

struct FakeRecognizer;

impl SpeechRecognizer for FakeRecognizer {
    fn transcribe(&mut self, _samples: &[f32], _sample_rate: u32) -> Result<String> {
        Ok("i love to travel through italy".to_string())
    }
}

fn write_tone_wav(path: &Path, freq: f32) {
    let sample_rate = 22050u32;
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..(2 * sample_rate) {
        let t = i as f32 / sample_rate as f32;
        let s = (2.0 * std::f32::consts::PI * freq * t).sin() * 0.5;
        writer.write_sample((s * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn batch_run_produces_one_row_per_file() {
    let root = tempfile::tempdir().unwrap();
    let vocals = root.path().join("vocals");
    let instrumentals = root.path().join("instrumentals");
    std::fs::create_dir_all(&vocals).unwrap();
    std::fs::create_dir_all(&instrumentals).unwrap();

    write_tone_wav(&vocals.join("song.wav"), 440.0);
    write_tone_wav(&instrumentals.join("loop.wav"), 261.63);
    // Non-audio clutter must not produce rows
    std::fs::write(vocals.join("notes.txt"), b"ignore me").unwrap();
    std::fs::write(vocals.join("._song.wav"), b"resource fork").unwrap();

    let mut pipeline = Pipeline::new(Some(Box::new(FakeTagger)), Some(Box::new(FakeRecognizer)));

    let mut records = Vec::new();
    for path in discover_audio_files(&vocals) {
        records.push(pipeline.process_file(&path, true));
    }
    for path in discover_audio_files(&instrumentals) {
        records.push(pipeline.process_file(&path, false));
    }

    let report_path = root.path().join("audio_analysis_results.csv");
    write_report(&records, &report_path).unwrap();

    let content = std::fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "file_name,file_path,bpm,key,genres,genre_confidence_scores,sentiment,subject_matter,transcribed_text"
    );

    // Vocal batch comes first
    let vocal_row = lines[1];
    assert!(vocal_row.starts_with("song.wav,"));
    assert!(vocal_row.contains("A major"));
    assert!(vocal_row.contains("rock"));
    assert!(vocal_row.contains("i love to travel through italy"));
    assert!(vocal_row.contains("traveling-in-italy"));
    assert!(vocal_row.contains("love"));

    let instrumental_row = lines[2];
    assert!(instrumental_row.starts_with("loop.wav,"));
    assert!(instrumental_row.contains("C major"));
    // No transcript or text analysis for instrumentals
    assert!(instrumental_row.ends_with(",,"));
    assert!(!instrumental_row.contains("compound"));
}

#[test]
fn batch_run_leaves_no_temp_artifacts() {
    let root = tempfile::tempdir().unwrap();
    let vocals = root.path().join("vocals");
    std::fs::create_dir_all(&vocals).unwrap();

    write_tone_wav(&vocals.join("clean.wav"), 440.0);
    // Undecodable compressed file exercises the conversion failure path
    std::fs::write(vocals.join("broken.mp3"), b"not an mpeg stream").unwrap();

    let mut pipeline = Pipeline::new(None, None);

    let files = discover_audio_files(&vocals);
    assert_eq!(files.len(), 2);

    let records: Vec<_> = files
        .iter()
        .map(|path| pipeline.process_file(path, true))
        .collect();

    // Both files get a row, the broken one with identity fields only
    assert_eq!(records.len(), 2);
    let broken = records
        .iter()
        .find(|r| r.file_name == "broken.mp3")
        .unwrap();
    assert!(broken.bpm.is_none());
    assert!(broken.key.is_none());

    // No *_temp.wav siblings survive the run
    let leftovers: Vec<_> = std::fs::read_dir(&vocals)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with("_temp.wav"))
        .collect();
    assert!(leftovers.is_empty());
}
