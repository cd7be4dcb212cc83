//! Manifest queries
//!
//! Read-only accessors over a parsed [`Manifest`]. A manifest never changes
//! after its grammar has produced it.

use crate::custom_value::CustomValue;
use crate::types::{
    ContactInformation, Dependencies, EntrypointMetadata, Environment, Icon, Manifest,
    MixinEntry, NestedJar, Person, Role, SchemaVersion,
};
use crate::version::Version;
use std::collections::BTreeMap;
use std::sync::Arc;

impl Manifest {
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Display name, falling back to the id
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn authors(&self) -> &[Person] {
        &self.authors
    }

    pub fn contributors(&self) -> &[Person] {
        &self.contributors
    }

    /// Authors then contributors, each tagged with its role
    pub fn people(&self) -> impl Iterator<Item = (Role, &Person)> {
        self.authors
            .iter()
            .map(|person| (Role::Author, person))
            .chain(
                self.contributors
                    .iter()
                    .map(|person| (Role::Contributor, person)),
            )
    }

    pub fn contact(&self) -> &ContactInformation {
        &self.contact
    }

    pub fn licenses(&self) -> &[Arc<str>] {
        &self.license
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Entrypoints declared for `stage`, in declaration order
    pub fn entrypoints(&self, stage: &str) -> &[EntrypointMetadata] {
        self.entrypoints
            .get(stage)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn entrypoint_stages(&self) -> impl Iterator<Item = &str> {
        self.entrypoints.keys().map(AsRef::as_ref)
    }

    pub fn jars(&self) -> &[NestedJar] {
        &self.jars
    }

    pub fn mixins(&self) -> &[MixinEntry] {
        &self.mixins
    }

    /// Mixin configs that apply when running on `environment`
    pub fn mixin_configs(&self, environment: Environment) -> impl Iterator<Item = &str> {
        self.mixins
            .iter()
            .filter(move |entry| entry.environment.applies_to(environment))
            .map(|entry| entry.config.as_ref())
    }

    pub fn access_widener(&self) -> Option<&str> {
        self.access_widener.as_deref()
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    /// Icon path best suited for `size` pixels
    pub fn icon_path(&self, size: u32) -> Option<&str> {
        self.icon.as_ref().and_then(|icon| icon.path(size))
    }

    pub fn language_adapters(&self) -> &BTreeMap<Arc<str>, Arc<str>> {
        &self.language_adapters
    }

    pub fn custom_values(&self) -> &BTreeMap<Arc<str>, CustomValue> {
        &self.custom
    }

    pub fn custom_value(&self, key: &str) -> Option<&CustomValue> {
        self.custom.get(key)
    }

    /// Serialize this manifest to a JSON string
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }
}
