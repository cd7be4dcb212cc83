//! Resolve command line paths to manifest files

use crate::errors::CliError;
use std::path::{Path, PathBuf};

/// A directory resolves to `<dir>/<file_name>`, anything else is taken as is.
pub fn resolve_manifest_path(path: &Path, file_name: &str) -> Result<PathBuf, CliError> {
    let candidate = if path.is_dir() {
        path.join(file_name)
    } else {
        path.to_path_buf()
    };

    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(CliError::ManifestNotFound(candidate))
    }
}

#[cfg(test)]
mod tests {
    use crate::manifest_lookup::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_directory_resolves_to_manifest_file() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let manifest = dir.path().join("mod.json");
        if fs::write(&manifest, "{}").is_err() {
            return;
        }

        let resolved = resolve_manifest_path(dir.path(), "mod.json");
        assert!(resolved.is_ok_and(|path| path == manifest));
    }

    #[test]
    fn test_missing_manifest_is_reported() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let resolved = resolve_manifest_path(dir.path(), "quilt.mod.json");
        assert!(matches!(
            resolved,
            Err(CliError::ManifestNotFound(ref path)) if path.ends_with("quilt.mod.json")
        ));
    }

    #[test]
    fn test_file_is_taken_as_is() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let manifest = dir.path().join("custom.json");
        if fs::write(&manifest, "{}").is_err() {
            return;
        }
        let resolved = resolve_manifest_path(&manifest, "mod.json");
        assert!(resolved.is_ok_and(|path| path == manifest));
    }
}
