//! Known top-level manifest fields and the schema versions they belong to

use crate::types::SchemaVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestField {
    SchemaVersion,
    Id,
    Version,
    Name,
    Description,
    Authors,
    Contributors,
    License,
    Requires,
    Conflicts,
    Recommends,
    Mixins,
    // v0 only
    Side,
    Initializer,
    Initializers,
    Links,
    // v1 only
    Environment,
    Entrypoints,
    Jars,
    AccessWidener,
    Depends,
    Suggests,
    Breaks,
    Contact,
    Icon,
    LanguageAdapters,
    Custom,
}

const V0: &[SchemaVersion] = &[SchemaVersion::V0];
const V1: &[SchemaVersion] = &[SchemaVersion::V1];
const BOTH: &[SchemaVersion] = &[SchemaVersion::V0, SchemaVersion::V1];

/// name, field, versions where the name is recognized
const TABLE: &[(&str, ManifestField, &[SchemaVersion])] = &[
    ("schemaVersion", ManifestField::SchemaVersion, BOTH),
    ("id", ManifestField::Id, BOTH),
    ("version", ManifestField::Version, BOTH),
    ("name", ManifestField::Name, BOTH),
    ("description", ManifestField::Description, BOTH),
    ("authors", ManifestField::Authors, BOTH),
    ("contributors", ManifestField::Contributors, BOTH),
    ("license", ManifestField::License, BOTH),
    ("requires", ManifestField::Requires, BOTH),
    ("conflicts", ManifestField::Conflicts, BOTH),
    ("recommends", ManifestField::Recommends, BOTH),
    ("mixins", ManifestField::Mixins, BOTH),
    ("side", ManifestField::Side, V0),
    ("initializer", ManifestField::Initializer, V0),
    ("initializers", ManifestField::Initializers, V0),
    ("links", ManifestField::Links, V0),
    ("environment", ManifestField::Environment, V1),
    ("entrypoints", ManifestField::Entrypoints, V1),
    ("jars", ManifestField::Jars, V1),
    ("accessWidener", ManifestField::AccessWidener, V1),
    ("depends", ManifestField::Depends, V1),
    ("suggests", ManifestField::Suggests, V1),
    ("breaks", ManifestField::Breaks, V1),
    ("contact", ManifestField::Contact, V1),
    ("icon", ManifestField::Icon, V1),
    ("languageAdapters", ManifestField::LanguageAdapters, V1),
    ("custom", ManifestField::Custom, V1),
];

impl ManifestField {
    /// Field recognized under `name` in documents of `version`
    pub fn lookup(name: &str, version: SchemaVersion) -> Option<ManifestField> {
        TABLE
            .iter()
            .find(|(key, _, versions)| *key == name && versions.contains(&version))
            .map(|(_, field, _)| *field)
    }

    pub fn name(self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, field, _)| *field == self)
            .map_or("", |(key, _, _)| *key)
    }

    pub fn versions(self) -> &'static [SchemaVersion] {
        TABLE
            .iter()
            .find(|(_, field, _)| *field == self)
            .map_or(&[] as &[SchemaVersion], |(_, _, versions)| *versions)
    }

    pub fn applies_to(self, version: SchemaVersion) -> bool {
        self.versions().contains(&version)
    }
}

#[cfg(test)]
mod tests {
    use crate::fields::*;

    #[test]
    fn test_version_scoped_lookup() {
        assert_eq!(
            ManifestField::lookup("initializer", SchemaVersion::V0),
            Some(ManifestField::Initializer)
        );
        assert_eq!(ManifestField::lookup("initializer", SchemaVersion::V1), None);
        assert_eq!(
            ManifestField::lookup("entrypoints", SchemaVersion::V1),
            Some(ManifestField::Entrypoints)
        );
        assert_eq!(ManifestField::lookup("entrypoints", SchemaVersion::V0), None);
        assert_eq!(ManifestField::lookup("unknown", SchemaVersion::V1), None);
    }

    #[test]
    fn test_every_field_has_a_name() {
        for (name, field, versions) in TABLE {
            assert_eq!(field.name(), *name);
            assert!(!versions.is_empty());
            assert!(versions.iter().all(|v| field.applies_to(*v)));
        }
    }
}
