//! CLI argument definitions using clap, and the batch run driver.

use crate::config::Config;
use crate::discover::discover_audio_files;
use crate::pipeline::Pipeline;
use crate::record::AnalysisRecord;
use crate::report;
use clap::Parser;
use eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use lorikeet_analysis::tagger::OnnxTagger;
use lorikeet_analysis::traits::{AudioTagger, SpeechRecognizer};
use lorikeet_analysis::transcribe::CtcRecognizer;
use lorikeet_analysis::types::ModelRepo;
#[allow(unused_imports)]
use ort::execution_providers::*;
use ort::session::builder::SessionBuilder;
use ort::session::Session;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "lori")]
#[command(about = "Batch audio analysis: tempo, key, genres, and lyrics to CSV")]
#[command(version)]
pub struct Cli {
    /// Directory of tracks with vocals
    pub vocals_dir: PathBuf,

    /// Directory of instrumental tracks
    pub instrumentals_dir: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = "audio_analysis_results.csv")]
    pub output: PathBuf,

    /// Genre tagger model: local directory or Hugging Face repo id
    #[arg(long)]
    pub tagger_model: Option<String>,

    /// Speech recognition model: local directory or Hugging Face repo id
    #[arg(long)]
    pub asr_model: Option<String>,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    execute(cli.try_into()?)
}

pub fn execute(config: Config) -> Result<()> {
    let tagger = load_tagger(config.tagger_repo.as_ref())?;
    let recognizer = load_recognizer(config.asr_repo.as_ref())?;
    let mut pipeline = Pipeline::new(tagger, recognizer);

    let vocal_files = discover_audio_files(&config.vocals_dir);
    let instrumental_files = discover_audio_files(&config.instrumentals_dir);

    tracing::info!(
        vocal = vocal_files.len(),
        instrumental = instrumental_files.len(),
        "discovered audio files"
    );

    // Vocal batch runs first; report rows keep that order
    let mut records = process_batch(&mut pipeline, &vocal_files, true, "vocal")?;
    records.extend(process_batch(
        &mut pipeline,
        &instrumental_files,
        false,
        "instrumental",
    )?);

    report::write_report(&records, &config.output)
        .wrap_err_with(|| format!("failed to write report: {:?}", config.output.display()))?;

    tracing::info!(
        files = records.len(),
        output = ?config.output.display(),
        "report written"
    );

    Ok(())
}

fn process_batch(
    pipeline: &mut Pipeline,
    files: &[PathBuf],
    has_vocals: bool,
    label: &str,
) -> Result<Vec<AnalysisRecord>> {
    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{msg:>12} [{bar:40}] {pos}/{len}",
    )?);
    bar.set_message(label.to_string());

    let mut records = Vec::with_capacity(files.len());
    for path in files {
        tracing::info!(file = ?path.display(), batch = label, "analyzing");
        records.push(pipeline.process_file(path, has_vocals));
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(records)
}

fn load_tagger(repo: Option<&ModelRepo>) -> Result<Option<Box<dyn AudioTagger>>> {
    let Some(repo) = repo else {
        tracing::warn!("no tagger model configured, genre fields will be empty");
        return Ok(None);
    };

    tracing::info!("loading genre tagger");
    let tagger = OnnxTagger::from_repo(repo, session_builder()?)?;
    Ok(Some(Box::new(tagger)))
}

fn load_recognizer(repo: Option<&ModelRepo>) -> Result<Option<Box<dyn SpeechRecognizer>>> {
    let Some(repo) = repo else {
        tracing::warn!("no speech model configured, vocal tracks will not be transcribed");
        return Ok(None);
    };

    tracing::info!("loading speech recognizer");
    let recognizer = CtcRecognizer::from_repo(repo, session_builder()?)?;
    Ok(Some(Box::new(recognizer)))
}

/// Build a session builder with execution providers configured by Cargo
/// features.
///
/// Providers are tried in priority order; the first available one is used and
/// CPU is always available as fallback.
///
/// # Execution Providers
///
/// Enabled via Cargo features:
/// - `cuda` - NVIDIA CUDA
/// - `tensorrt` - NVIDIA TensorRT
/// - `openvino` - Intel OpenVINO
/// - `directml` - DirectML (Windows)
/// - `coreml` - CoreML (macOS)
///
/// Ensure required hardware, drivers, and runtime dependencies are installed
/// for the desired provider.
fn session_builder() -> Result<SessionBuilder> {
    let builder = Session::builder()?.with_execution_providers([
        #[cfg(feature = "cuda")]
        CUDAExecutionProvider::default().build(),
        #[cfg(feature = "tensorrt")]
        TensorRTExecutionProvider::default().build(),
        #[cfg(feature = "openvino")]
        OpenVINOExecutionProvider::default()
            .with_device_type("HETERO:GPU,CPU")
            .with_cache_dir(".cache/ort")
            .with_precision("FP16")
            .build(),
        #[cfg(feature = "directml")]
        DirectMLExecutionProvider::default().build(),
        #[cfg(feature = "coreml")]
        CoreMLExecutionProvider::default().build(),
    ])?;

    Ok(builder)
}
