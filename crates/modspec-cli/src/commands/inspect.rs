use crate::config_manager::Config;
use crate::errors::CliError;
use crate::logger;
use crate::manifest_lookup::resolve_manifest_path;
use modspec_manifest::{parse_metadata, parse_metadata_with_version, Manifest};
use std::path::PathBuf;

pub struct InspectCommand {
    pub path: PathBuf,
    /// Skip detection and parse with this schema version
    pub schema_version: Option<i64>,
}

pub fn load_manifest(cmd: &InspectCommand, config: &Config) -> Result<Manifest, CliError> {
    let path = resolve_manifest_path(&cmd.path, config.manifest_file_name())?;
    logger::debug(&format!("Reading manifest from {}", path.display()));

    let manifest = match cmd.schema_version {
        Some(version) => parse_metadata_with_version(&path, version)?,
        None => parse_metadata(&path)?,
    };
    Ok(manifest)
}

/// Parse one manifest and print it as JSON on stdout.
pub fn handle_inspect(cmd: InspectCommand) -> Result<(), CliError> {
    let config = Config::load()?;
    let manifest = load_manifest(&cmd, &config)?;
    println!("{}", manifest.to_json_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::commands::inspect::*;
    use modspec_manifest::ManifestError;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, name: &str, body: &str) -> Option<PathBuf> {
        let path = dir.path().join(name);
        fs::write(&path, body).ok()?;
        Some(path)
    }

    #[test]
    fn test_directory_uses_configured_file_name() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let body = r#"{"schemaVersion": 1, "id": "inspected", "version": "2.0.0"}"#;
        if write_manifest(&dir, "unit.json", body).is_none() {
            return;
        }

        let mut config = Config::default();
        if config.set("manifest-file-name", "unit.json".to_string()).is_err() {
            return;
        }
        let cmd = InspectCommand {
            path: dir.path().to_path_buf(),
            schema_version: None,
        };
        let manifest = load_manifest(&cmd, &config);
        assert!(manifest.is_ok_and(|m| m.id() == "inspected"));
    }

    #[test]
    fn test_forced_schema_version_is_used() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let body = r#"{"id": "forced", "version": "1.0.0"}"#;
        let Some(path) = write_manifest(&dir, "mod.json", body) else {
            return;
        };
        let cmd = InspectCommand {
            path,
            schema_version: Some(7),
        };
        let result = load_manifest(&cmd, &Config::default());
        assert!(matches!(
            result,
            Err(CliError::Manifest(ref err))
                if matches!(err.kind(), ManifestError::UnsupportedSchemaVersion(7))
        ));
    }
}
