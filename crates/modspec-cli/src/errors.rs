//! Error types for the modspec CLI

use modspec_config::ConfigError;
use modspec_manifest::ManifestError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("No manifest found at {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("{failed} of {total} manifest(s) failed to parse")]
    CheckFailed { failed: usize, total: usize },

    #[error("Could not start parser pool: {0}")]
    ThreadPool(String),
}
