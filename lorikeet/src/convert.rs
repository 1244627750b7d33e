//! Format normalization: decode compressed containers to sibling temp WAVs.

use eyre::{eyre, Result, WrapErr};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// A waveform-format view of a source file.
///
/// When the source was already WAV this is the source path itself. Otherwise
/// it is a sibling temp file which is removed on drop, whether or not the
/// analysis that used it succeeded.
#[derive(Debug)]
pub struct NormalizedAudio {
    path: PathBuf,
    temp: bool,
}

impl NormalizedAudio {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temp(&self) -> bool {
        self.temp
    }
}

impl Drop for NormalizedAudio {
    fn drop(&mut self) {
        if self.temp {
            if let Err(e) = std::fs::remove_file(&self.path) {
                // Cleanup failure is logged, never escalated
                tracing::warn!(path = ?self.path.display(), error = %e, "failed to remove temp wav");
            }
        }
    }
}

/// Temp WAV path derived from the source name: `<stem>_temp.wav` sibling.
pub fn temp_wav_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    source.with_file_name(format!("{stem}_temp.wav"))
}

/// Normalize a source file to WAV.
///
/// WAV input is returned unchanged (same path, no copy). Anything else is
/// decoded and written as a sibling 16-bit PCM mono WAV at the source's
/// native sample rate. The source file is never mutated.
pub fn normalize(source: &Path) -> Result<NormalizedAudio> {
    let is_wav = source
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    if is_wav {
        return Ok(NormalizedAudio {
            path: source.to_path_buf(),
            temp: false,
        });
    }

    let (samples, sample_rate) = decode_to_mono(source)
        .wrap_err_with(|| format!("failed to decode: {:?}", source.display()))?;

    let temp_path = temp_wav_path(source);
    write_wav(&temp_path, &samples, sample_rate)
        .wrap_err_with(|| format!("failed to write temp wav: {:?}", temp_path.display()))?;

    Ok(NormalizedAudio {
        path: temp_path,
        temp: true,
    })
}

/// Decode any supported container to mono f32 samples at its native rate.
fn decode_to_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| eyre!("no supported audio track"))?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream or unrecoverable container error
            Err(_) => break,
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count().max(1);

                let buf = sample_buf.get_or_insert_with(|| {
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                });
                buf.copy_interleaved_ref(decoded);

                // Downmix interleaved frames to mono
                samples.extend(
                    buf.samples()
                        .chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                );
            }
            // Corrupted packets are skipped, not fatal
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if samples.is_empty() {
        return Err(eyre!("no audio samples decoded"));
    }

    Ok((samples, sample_rate))
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..1600 {
            writer.write_sample(((i % 100) * 50) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn wav_passes_through_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.wav");
        write_test_wav(&path);

        let before = std::fs::read(&path).unwrap();

        let normalized = normalize(&path).unwrap();
        assert_eq!(normalized.path(), path);
        assert!(!normalized.is_temp());
        drop(normalized);

        // Source neither mutated nor removed
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn renormalizing_wav_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.wav");
        write_test_wav(&path);

        let first = normalize(&path).unwrap();
        let second = normalize(first.path()).unwrap();

        assert_eq!(first.path(), second.path());
    }

    #[test]
    fn temp_path_inserts_marker() {
        let path = temp_wav_path(Path::new("/music/song.mp3"));
        assert_eq!(path, Path::new("/music/song_temp.wav"));
    }

    #[test]
    fn corrupt_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.mp3");
        std::fs::write(&path, b"this is not audio at all").unwrap();

        assert!(normalize(&path).is_err());

        // No temp artifact left behind
        assert!(!temp_wav_path(&path).exists());
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch_temp.wav");
        write_test_wav(&path);

        let normalized = NormalizedAudio {
            path: path.clone(),
            temp: true,
        };
        assert!(path.exists());

        drop(normalized);
        assert!(!path.exists());
    }
}
