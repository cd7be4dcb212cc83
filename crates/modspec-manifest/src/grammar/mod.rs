//! Per-version field grammars
//!
//! One module per schema version, selected by [`SchemaVersion`]. Grammars
//! share their nested readers through `common`.

pub(crate) mod common;
pub mod v0;
pub mod v1;

use crate::errors::ManifestError;
use crate::token::{TokenKind, TokenStream};
use crate::types::{Manifest, SchemaVersion};

/// Decode the rest of an already entered top-level object with the grammar of `version`.
pub(crate) fn parse_fields<T: TokenStream + ?Sized>(
    reader: &mut T,
    version: SchemaVersion,
) -> Result<Manifest, ManifestError> {
    match version {
        SchemaVersion::V0 => v0::parse_fields(reader),
        SchemaVersion::V1 => v1::parse_fields(reader),
    }
}

/// Decode the rest of the top-level object, then require the end of input.
pub(crate) fn parse_remaining<T: TokenStream + ?Sized>(
    reader: &mut T,
    version: SchemaVersion,
) -> Result<Manifest, ManifestError> {
    let manifest = parse_fields(reader, version)?;
    reader.finish()?;
    Ok(manifest)
}

/// Decode a whole document with the grammar of `version`.
pub(crate) fn parse_document<T: TokenStream + ?Sized>(
    reader: &mut T,
    version: SchemaVersion,
) -> Result<Manifest, ManifestError> {
    if reader.peek()? != TokenKind::Object {
        return Err(ManifestError::MalformedRoot);
    }
    reader.begin_object()?;
    parse_remaining(reader, version)
}
