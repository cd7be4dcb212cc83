//! Schema version detection
//!
//! The version tag is usually the first field, in which case the same reader
//! goes on to the grammar. Anywhere else, the whole document is drained to find
//! it and the caller has to reopen the source for a second pass.

use crate::errors::ManifestError;
use crate::grammar::common::read_schema_version;
use crate::token::{TokenKind, TokenStream};
use crate::types::SchemaVersion;

/// Result of scanning a document for its schema version
#[derive(Debug)]
pub enum Detection<T> {
    /// The tag was the first field; `reader` sits right after its value.
    FirstField { version: i64, reader: T },
    /// The document was fully consumed; reopen and parse with `version`.
    Rescan { version: i64 },
}

impl<T> Detection<T> {
    pub fn version(&self) -> i64 {
        match self {
            Detection::FirstField { version, .. } | Detection::Rescan { version } => *version,
        }
    }
}

/// Find the schema version of the document at the start of `reader`.
pub fn detect<T: TokenStream>(mut reader: T) -> Result<Detection<T>, ManifestError> {
    if reader.peek()? != TokenKind::Object {
        return Err(ManifestError::MalformedRoot);
    }
    reader.begin_object()?;

    let mut found: Option<i64> = None;
    let mut first = true;
    while let Some(key) = reader.next_key()? {
        if key != SchemaVersion::FIELD {
            reader.skip_value()?;
            first = false;
            continue;
        }

        let version = read_schema_version(&mut reader)?;
        if first {
            tracing::debug!("Schema version {} found in first position", version);
            return Ok(Detection::FirstField { version, reader });
        }

        match found {
            Some(previous) if previous != version => {
                return Err(ManifestError::DuplicateVersionMismatch {
                    first: previous,
                    duplicate: version,
                });
            }
            _ => found = Some(version),
        }
    }

    let version = found.unwrap_or_else(|| SchemaVersion::DEFAULT.as_i64());
    tracing::debug!(
        "Schema version {} not in first position, document needs a second pass",
        version
    );
    Ok(Detection::Rescan { version })
}

#[cfg(test)]
mod tests {
    use crate::detect::*;
    use crate::token::JsonTokenReader;

    fn detect_str(text: &str) -> Result<Detection<JsonTokenReader<&[u8]>>, ManifestError> {
        detect(JsonTokenReader::new(text.as_bytes()))
    }

    #[test]
    fn test_first_field_keeps_reader() {
        let Ok(Detection::FirstField { version, mut reader }) =
            detect_str(r#"{"schemaVersion": 1, "id": "x"}"#)
        else {
            panic!("expected first-field detection");
        };
        assert_eq!(version, 1);
        assert!(matches!(reader.next_key(), Ok(Some(key)) if key == "id"));
    }

    #[test]
    fn test_later_field_requires_rescan() {
        let detection = detect_str(r#"{"id": "x", "schemaVersion": 1}"#);
        assert!(matches!(detection, Ok(Detection::Rescan { version: 1 })));
    }

    #[test]
    fn test_missing_tag_defaults_to_zero() {
        assert!(matches!(
            detect_str(r#"{"id": "x"}"#),
            Ok(Detection::Rescan { version: 0 })
        ));
        assert!(matches!(detect_str("{}"), Ok(Detection::Rescan { version: 0 })));
    }

    #[test]
    fn test_duplicate_tags() {
        assert!(matches!(
            detect_str(r#"{"id": "x", "schemaVersion": 1, "schemaVersion": 1}"#),
            Ok(Detection::Rescan { version: 1 })
        ));
        assert!(matches!(
            detect_str(r#"{"id": "x", "schemaVersion": 1, "name": "n", "schemaVersion": 0}"#),
            Err(ManifestError::DuplicateVersionMismatch { first: 1, duplicate: 0 })
        ));
    }

    #[test]
    fn test_root_and_tag_kind_errors() {
        assert!(matches!(detect_str("[1, 2]"), Err(ManifestError::MalformedRoot)));
        assert!(matches!(detect_str(r#""text""#), Err(ManifestError::MalformedRoot)));
        assert!(matches!(
            detect_str(r#"{"schemaVersion": "1"}"#),
            Err(ManifestError::TypeMismatch { .. })
        ));
    }
}
