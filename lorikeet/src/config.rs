//! Configuration types for resolved CLI arguments.
//!
//! This module contains the Config struct and its TryFrom implementation.
//! The Cli struct (for argument parsing) remains in cli.rs.

use crate::cli::Cli;
use eyre::Result;
use hf_hub::api::sync::Api;
use lorikeet_analysis::types::ModelRepo;
use std::path::PathBuf;

/// Resolved run configuration.
///
/// Converted from Cli via TryFrom. Model identifiers are resolved to
/// ModelRepo values ready to fetch files from.
#[derive(Debug)]
pub struct Config {
    pub vocals_dir: PathBuf,
    pub instrumentals_dir: PathBuf,
    pub output: PathBuf,
    pub tagger_repo: Option<ModelRepo>,
    pub asr_repo: Option<ModelRepo>,
}

impl TryFrom<Cli> for Config {
    type Error = eyre::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        Ok(Self {
            vocals_dir: cli.vocals_dir,
            instrumentals_dir: cli.instrumentals_dir,
            output: cli.output,
            tagger_repo: cli.tagger_model.map(resolve_repo).transpose()?,
            asr_repo: cli.asr_model.map(resolve_repo).transpose()?,
        })
    }
}

/// Resolve a model identifier: an existing local directory wins, anything
/// else is treated as a Hugging Face Hub repo id.
fn resolve_repo(model_id: String) -> Result<ModelRepo> {
    let path = PathBuf::from(&model_id);
    if path.is_dir() {
        Ok(ModelRepo::Path(path))
    } else {
        let api = Api::new()?;
        Ok(ModelRepo::Api(api.model(model_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn local_directory_resolves_to_path_repo() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "lori",
            "vocals",
            "instrumentals",
            "--tagger-model",
            dir.path().to_str().unwrap(),
        ]);

        let config = Config::try_from(cli).unwrap();

        match config.tagger_repo {
            Some(ModelRepo::Path(path)) => assert_eq!(path, dir.path()),
            other => panic!("unexpected repo: {:?}", other),
        }
        assert!(config.asr_repo.is_none());
    }

    #[test]
    fn missing_models_resolve_to_none() {
        let cli = Cli::parse_from(["lori", "vocals", "instrumentals"]);

        let config = Config::try_from(cli).unwrap();

        assert!(config.tagger_repo.is_none());
        assert!(config.asr_repo.is_none());
        assert_eq!(config.output, PathBuf::from("audio_analysis_results.csv"));
    }
}
