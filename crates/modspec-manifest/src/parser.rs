//! Manifest parsing entry points
//!
//! `parse_metadata` runs detection and hands the same reader to the grammar
//! when the version tag comes first. Otherwise the source is opened a second
//! time. Every reader is dropped before the call returns, on success or not.

use crate::detect::{detect, Detection};
use crate::errors::ManifestError;
use crate::grammar;
use crate::source::ManifestSource;
use crate::token::JsonTokenReader;
use crate::types::{Manifest, SchemaVersion};
use rayon::prelude::*;

/// Parse the manifest held by `source`, detecting its schema version.
///
/// Errors are attributed to `source` (see [`ManifestError::source_name`]).
pub fn parse_metadata<S: ManifestSource + ?Sized>(source: &S) -> Result<Manifest, ManifestError> {
    parse_detected(source).map_err(|error| error.in_source(source.describe()))
}

/// Parse the manifest held by `source` with a schema version known up front.
///
/// Detection is skipped; a `schemaVersion` field in the document must still
/// agree with `version`.
pub fn parse_metadata_with_version<S: ManifestSource + ?Sized>(
    source: &S,
    version: i64,
) -> Result<Manifest, ManifestError> {
    parse_known(source, version).map_err(|error| error.in_source(source.describe()))
}

/// Parse several manifests in parallel; results keep the order of `sources`.
pub fn parse_all<S: ManifestSource + Sync>(sources: &[S]) -> Vec<Result<Manifest, ManifestError>> {
    sources.par_iter().map(|source| parse_metadata(source)).collect()
}

fn parse_detected<S: ManifestSource + ?Sized>(source: &S) -> Result<Manifest, ManifestError> {
    let reader = JsonTokenReader::new(source.open()?);
    match detect(reader)? {
        Detection::FirstField {
            version,
            mut reader,
        } => {
            let version = SchemaVersion::try_from(version)?;
            grammar::parse_remaining(&mut reader, version)
        }
        Detection::Rescan { version } => {
            tracing::debug!(
                "Re-reading '{}' with schema version {}",
                source.describe(),
                version
            );
            parse_known(source, version)
        }
    }
}

fn parse_known<S: ManifestSource + ?Sized>(
    source: &S,
    version: i64,
) -> Result<Manifest, ManifestError> {
    let version = SchemaVersion::try_from(version)?;
    let mut reader = JsonTokenReader::new(source.open()?);
    grammar::parse_document(&mut reader, version)
}
