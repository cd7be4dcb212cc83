use std::io;
use thiserror::Error;

/// Errors that can occur while loading a mod manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed manifest at byte {offset}: {message}")]
    Decode { offset: u64, message: String },

    #[error("Root of the manifest must be an object")]
    MalformedRoot,

    #[error("Field '{field}' must be {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Missing required field '{0}'")]
    MissingRequired(String),

    #[error("'{first}' and '{second}' must not be set at the same time (mod id '{unit}')")]
    MutuallyExclusiveFields {
        first: &'static str,
        second: &'static str,
        unit: String,
    },

    #[error(
        "Found duplicate \"schemaVersion\" field with different value. \
         First read value was \"{first}\" and the duplicate value was \"{duplicate}\""
    )]
    DuplicateVersionMismatch { first: i64, duplicate: i64 },

    #[error("Unsupported schema version \"{0}\"")]
    UnsupportedSchemaVersion(i64),

    #[error("Malformed version constraint '{constraint}': {reason}")]
    MalformedConstraint { constraint: String, reason: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid version '{0}': version must be a non-empty string")]
    InvalidVersion(String),

    #[error("Failed to parse manifest '{source_name}': {error}")]
    Source {
        source_name: String,
        #[source]
        error: Box<ManifestError>,
    },
}

impl ManifestError {
    pub(crate) fn type_mismatch(field: impl Into<String>, expected: &'static str) -> Self {
        ManifestError::TypeMismatch {
            field: field.into(),
            expected,
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ManifestError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_constraint(constraint: &str, reason: impl Into<String>) -> Self {
        ManifestError::MalformedConstraint {
            constraint: constraint.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the name of the manifest source this error was raised for.
    pub(crate) fn in_source(self, source_name: String) -> Self {
        match self {
            already @ ManifestError::Source { .. } => already,
            error => ManifestError::Source {
                source_name,
                error: Box::new(error),
            },
        }
    }

    /// The underlying error, looking through any source attribution.
    pub fn kind(&self) -> &ManifestError {
        match self {
            ManifestError::Source { error, .. } => error.kind(),
            other => other,
        }
    }

    /// Name of the source this error was raised for, if known.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            ManifestError::Source { source_name, .. } => Some(source_name),
            _ => None,
        }
    }
}
