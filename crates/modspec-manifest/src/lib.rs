//! Mod manifest parsing
//!
//! Reads a mod manifest document into a validated [`Manifest`]. Documents come
//! in two incompatible schema versions; the version tag may appear anywhere in
//! the top-level object and is found without building a document tree. Fields
//! the parser does not know are kept as [`CustomValue`] trees in the newest
//! schema version.
//!
//! ```no_run
//! use modspec_manifest::parse_metadata;
//! use std::path::Path;
//!
//! let manifest = parse_metadata(Path::new("mods/example/mod.json"))?;
//! println!("{} {}", manifest.id(), manifest.version());
//! # Ok::<(), modspec_manifest::ManifestError>(())
//! ```

pub mod custom_value;
pub mod detect;
pub mod errors;
pub mod fields;
pub mod grammar;
pub mod manifest;
pub mod parser;
pub mod source;
pub mod token;
pub mod types;
pub mod version;

pub use custom_value::{CustomValue, CustomValueKind};
pub use errors::ManifestError;
pub use parser::{parse_all, parse_metadata, parse_metadata_with_version};
pub use source::{InMemorySource, ManifestSource};
pub use types::{
    ContactInformation, Dependencies, DependencyKind, EntrypointMetadata, Environment, Icon,
    Manifest, MixinEntry, ModDependency, NestedJar, Person, Role, SchemaVersion,
};
pub use version::{Constraint, Version, VersionRange};
