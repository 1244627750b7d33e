//! Core types for lorikeet-analysis

use eyre::{ContextCompat, OptionExt, Result, WrapErr};
use hf_hub::api::sync::ApiRepo;
use hf_hub::CacheRepo;
use std::path::PathBuf;

/// A genre tag with its confidence score.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    /// Tag label (e.g. "rock")
    pub label: String,
    /// Mean activation over time, in the model's score range
    pub score: f32,
}

/// Model repository sources.
#[derive(Debug)]
pub enum ModelRepo {
    /// Local filesystem path
    Path(PathBuf),
    /// HuggingFace cache repository
    Cache(CacheRepo),
    /// HuggingFace API repository
    Api(ApiRepo),
}

impl ModelRepo {
    /// Resolve a file name to its full path in this repository.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        match self {
            ModelRepo::Path(path) => path
                .join(file_name)
                .canonicalize()
                .wrap_err(format!("failed to resolve model: {file_name}")),
            ModelRepo::Cache(cache_repo) => cache_repo
                .get(file_name)
                .wrap_err(format!("failed to download from cache: {file_name}")),
            ModelRepo::Api(api_repo) => api_repo
                .get(file_name)
                .wrap_err(format!("failed to download from api: {file_name}")),
        }
    }

    /// Try resolving multiple file names, return first successful match.
    pub fn resolve_any(&self, candidates: &[&str]) -> Result<PathBuf> {
        candidates
            .iter()
            .find_map(|name| self.resolve(name).ok())
            .ok_or_eyre("no model found from candidates")
    }
}
