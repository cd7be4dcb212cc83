//! Normalized manifest model
//!
//! Everything here is immutable once a grammar has produced it. Strings are
//! `Arc<str>` so manifests can be shared across threads and cloned cheaply
//! into registries.

use crate::custom_value::CustomValue;
use crate::errors::ManifestError;
use crate::version::{Version, VersionRange};
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// MANIFEST
// =============================================================================

/// A validated mod manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub(crate) schema_version: SchemaVersion,
    pub(crate) id: Arc<str>,
    pub(crate) version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) authors: Vec<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) contributors: Vec<Person>,
    #[serde(skip_serializing_if = "ContactInformation::is_empty")]
    pub(crate) contact: ContactInformation,
    #[serde(skip_serializing_if = "SmallVec::is_empty")]
    pub(crate) license: SmallVec<[Arc<str>; 1]>,
    pub(crate) environment: Environment,
    #[serde(skip_serializing_if = "Dependencies::is_empty")]
    pub(crate) dependencies: Dependencies,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) entrypoints: BTreeMap<Arc<str>, Vec<EntrypointMetadata>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) jars: Vec<NestedJar>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) mixins: Vec<MixinEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) access_widener: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) icon: Option<Icon>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) language_adapters: BTreeMap<Arc<str>, Arc<str>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) custom: BTreeMap<Arc<str>, CustomValue>,
}

// =============================================================================
// SCHEMA VERSION
// =============================================================================

/// Supported manifest schema versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaVersion {
    V0,
    V1,
}

impl SchemaVersion {
    /// Name of the version tag field
    pub const FIELD: &'static str = "schemaVersion";

    /// Version assumed when a document carries no tag
    pub const DEFAULT: SchemaVersion = SchemaVersion::V0;

    pub const LATEST: SchemaVersion = SchemaVersion::V1;

    pub fn as_i64(self) -> i64 {
        match self {
            SchemaVersion::V0 => 0,
            SchemaVersion::V1 => 1,
        }
    }
}

impl TryFrom<i64> for SchemaVersion {
    type Error = ManifestError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SchemaVersion::V0),
            1 => Ok(SchemaVersion::V1),
            other => Err(ManifestError::UnsupportedSchemaVersion(other)),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Side of the game a mod or mixin applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Universal,
    Client,
    Server,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Universal => "universal",
            Environment::Client => "client",
            Environment::Server => "server",
        }
    }

    /// Whether something declared for `self` should load on `runtime`.
    pub fn applies_to(self, runtime: Environment) -> bool {
        self == Environment::Universal || runtime == Environment::Universal || self == runtime
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DEPENDENCIES
// =============================================================================

/// Kind of a dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Depends,
    Recommends,
    Suggests,
    Conflicts,
    Breaks,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 5] = [
        DependencyKind::Depends,
        DependencyKind::Recommends,
        DependencyKind::Suggests,
        DependencyKind::Conflicts,
        DependencyKind::Breaks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DependencyKind::Depends => "depends",
            DependencyKind::Recommends => "recommends",
            DependencyKind::Suggests => "suggests",
            DependencyKind::Conflicts => "conflicts",
            DependencyKind::Breaks => "breaks",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All dependency edges of a manifest, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dependencies(BTreeMap<DependencyKind, BTreeMap<Arc<str>, VersionRange>>);

impl Dependencies {
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    /// Edges of one kind keyed by target id
    pub fn get(&self, kind: DependencyKind) -> Option<&BTreeMap<Arc<str>, VersionRange>> {
        self.0.get(&kind)
    }

    pub fn of_kind(&self, kind: DependencyKind) -> impl Iterator<Item = ModDependency<'_>> {
        self.0.get(&kind).into_iter().flat_map(move |edges| {
            edges.iter().map(move |(id, range)| ModDependency { kind, id, range })
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = ModDependency<'_>> {
        self.0.iter().flat_map(|(kind, edges)| {
            edges.iter().map(move |(id, range)| ModDependency {
                kind: *kind,
                id,
                range,
            })
        })
    }

    /// Replace all edges of `kind`.
    pub(crate) fn set(&mut self, kind: DependencyKind, edges: BTreeMap<Arc<str>, VersionRange>) {
        self.0.insert(kind, edges);
    }

    /// Add edges to `kind`, keeping existing targets that are not overridden.
    pub(crate) fn merge(&mut self, kind: DependencyKind, edges: BTreeMap<Arc<str>, VersionRange>) {
        self.0.entry(kind).or_default().extend(edges);
    }
}

/// Borrowed view of one dependency edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModDependency<'a> {
    pub kind: DependencyKind,
    pub id: &'a str,
    pub range: &'a VersionRange,
}

impl ModDependency<'_> {
    pub fn matches(&self, version: &Version) -> bool {
        self.range.matches(version)
    }
}

// =============================================================================
// ENTRYPOINTS, JARS, MIXINS
// =============================================================================

/// A callback reference declared under an entrypoint stage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntrypointMetadata {
    pub adapter: Arc<str>,
    pub value: Arc<str>,
}

impl EntrypointMetadata {
    pub const DEFAULT_ADAPTER: &'static str = "default";

    pub fn new(value: &str) -> Self {
        EntrypointMetadata {
            adapter: Arc::from(Self::DEFAULT_ADAPTER),
            value: Arc::from(value),
        }
    }

    pub fn with_adapter(adapter: &str, value: &str) -> Self {
        EntrypointMetadata {
            adapter: Arc::from(adapter),
            value: Arc::from(value),
        }
    }
}

/// Reference to an archive nested inside the mod
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedJar {
    pub file: Arc<str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixinEntry {
    pub config: Arc<str>,
    pub environment: Environment,
}

// =============================================================================
// ICON
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Icon {
    Single(Arc<str>),
    /// Paths keyed by pixel size, sizes start at 1
    Sized(BTreeMap<u32, Arc<str>>),
}

impl Icon {
    /// Best path for a square icon of `size` pixels: the smallest declared
    /// size that is at least `size`, else the largest one.
    pub fn path(&self, size: u32) -> Option<&str> {
        match self {
            Icon::Single(path) => Some(path),
            Icon::Sized(paths) => paths
                .range(size..)
                .next()
                .or_else(|| paths.iter().next_back())
                .map(|(_, path)| path.as_ref()),
        }
    }
}

// =============================================================================
// PEOPLE
// =============================================================================

/// Channel name -> URI-like string (`email`, `homepage`, `issues`, `sources`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContactInformation(BTreeMap<Arc<str>, Arc<str>>);

impl ContactInformation {
    pub fn get(&self, channel: &str) -> Option<&str> {
        self.0.get(channel).map(AsRef::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    pub(crate) fn insert(&mut self, channel: &str, value: &str) {
        self.0.insert(Arc::from(channel), Arc::from(value));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: Arc<str>,
    #[serde(skip_serializing_if = "ContactInformation::is_empty")]
    pub contact: ContactInformation,
}

impl Person {
    pub fn new(name: &str) -> Self {
        Person {
            name: Arc::from(name),
            contact: ContactInformation::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Author,
    Contributor,
}

#[cfg(test)]
mod tests {
    use crate::types::*;

    #[test]
    fn test_schema_version_dispatch() {
        assert!(matches!(SchemaVersion::try_from(0), Ok(SchemaVersion::V0)));
        assert!(matches!(SchemaVersion::try_from(1), Ok(SchemaVersion::V1)));
        assert!(matches!(
            SchemaVersion::try_from(2),
            Err(ManifestError::UnsupportedSchemaVersion(2))
        ));
        assert!(matches!(
            SchemaVersion::try_from(-1),
            Err(ManifestError::UnsupportedSchemaVersion(-1))
        ));
        assert_eq!(SchemaVersion::LATEST.as_i64(), 1);
    }

    #[test]
    fn test_icon_path_selection() {
        let mut paths = BTreeMap::new();
        paths.insert(16, Arc::from("icon16.png"));
        paths.insert(64, Arc::from("icon64.png"));
        let icon = Icon::Sized(paths);

        assert_eq!(icon.path(1), Some("icon16.png"));
        assert_eq!(icon.path(32), Some("icon64.png"));
        assert_eq!(icon.path(64), Some("icon64.png"));
        assert_eq!(icon.path(512), Some("icon64.png"));
        assert_eq!(Icon::Single(Arc::from("a.png")).path(8), Some("a.png"));
    }

    #[test]
    fn test_environment_applies_to() {
        assert!(Environment::Universal.applies_to(Environment::Client));
        assert!(Environment::Client.applies_to(Environment::Client));
        assert!(!Environment::Client.applies_to(Environment::Server));
    }

    #[test]
    fn test_dependencies_views() {
        let mut deps = Dependencies::default();
        assert!(deps.is_empty());

        let range = VersionRange::parse(">=1.0.0").unwrap_or_default();
        let mut edges = BTreeMap::new();
        edges.insert(Arc::from("lib"), range);
        deps.set(DependencyKind::Depends, edges);

        let all: Vec<_> = deps.iter().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "lib");
        assert_eq!(all[0].kind, DependencyKind::Depends);
        assert_eq!(deps.of_kind(DependencyKind::Breaks).count(), 0);

        let version = Version::parse("1.2.0");
        assert!(version.is_ok_and(|v| all[0].matches(&v)));
    }
}
