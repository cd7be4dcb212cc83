//! Schema version 1
//!
//! Unknown top-level fields are not errors: they are kept in the custom map
//! so documents written for a newer loader survive a round through this one.

use crate::custom_value::CustomValue;
use crate::errors::ManifestError;
use crate::fields::ManifestField;
use crate::grammar::common::{
    check_schema_version, expect_kind, read_arc_str, read_contact, read_custom,
    read_dependencies, read_entrypoints, read_icon, read_jars, read_people, read_string,
    read_string_map, read_string_or_array, read_version, ManifestDraft,
};
use crate::token::{TokenKind, TokenStream};
use crate::types::{
    ContactInformation, DependencyKind, Environment, Manifest, MixinEntry, Person, SchemaVersion,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Decode the remaining fields of an already entered top-level object.
pub(crate) fn parse_fields<T: TokenStream + ?Sized>(
    reader: &mut T,
) -> Result<Manifest, ManifestError> {
    let mut draft = ManifestDraft::default();
    let mut unknown: BTreeMap<Arc<str>, CustomValue> = BTreeMap::new();
    let mut requires = None;

    while let Some(key) = reader.next_key()? {
        let Some(field) = ManifestField::lookup(&key, SchemaVersion::V1) else {
            unknown.insert(Arc::from(key), CustomValue::read(reader)?);
            continue;
        };

        match field {
            ManifestField::SchemaVersion => check_schema_version(reader, SchemaVersion::V1)?,
            ManifestField::Id => draft.id = Some(read_arc_str(reader, "id")?),
            ManifestField::Version => draft.version = Some(read_version(reader)?),
            ManifestField::Environment => draft.environment = read_environment(reader, "environment")?,
            ManifestField::Entrypoints => draft.entrypoints = read_entrypoints(reader)?,
            ManifestField::Jars => draft.jars = read_jars(reader)?,
            ManifestField::Mixins => draft.mixins = read_mixins(reader)?,
            ManifestField::AccessWidener => {
                draft.access_widener = Some(read_arc_str(reader, "accessWidener")?);
            }
            ManifestField::Depends
            | ManifestField::Recommends
            | ManifestField::Suggests
            | ManifestField::Conflicts
            | ManifestField::Breaks => {
                let kind = dependency_kind(field);
                let edges = read_dependencies(reader, kind.as_str())?;
                draft.dependencies.set(kind, edges);
            }
            ManifestField::Requires => {
                tracing::warn!(
                    "'requires' is deprecated in schema version 1, use 'depends' instead"
                );
                requires = Some(read_dependencies(reader, "requires")?);
            }
            ManifestField::Name => draft.name = Some(read_arc_str(reader, "name")?),
            ManifestField::Description => {
                draft.description = Some(read_arc_str(reader, "description")?);
            }
            ManifestField::Authors => draft.authors = read_people(reader, "authors", read_person)?,
            ManifestField::Contributors => {
                draft.contributors = read_people(reader, "contributors", read_person)?;
            }
            ManifestField::Contact => draft.contact = read_contact(reader, "contact")?,
            ManifestField::License => {
                draft.license = read_string_or_array(reader, "license")?
                    .into_iter()
                    .map(Arc::from)
                    .collect();
            }
            ManifestField::Icon => draft.icon = Some(read_icon(reader)?),
            ManifestField::LanguageAdapters => {
                draft.language_adapters = read_string_map(reader, "languageAdapters")?;
            }
            ManifestField::Custom => draft.custom = read_custom(reader)?,
            other => {
                tracing::debug!("Ignoring field '{}' in a v1 manifest", other.name());
                reader.skip_value()?;
            }
        }
    }

    if let Some(edges) = requires {
        // An explicit `depends` entry for the same target wins
        let mut merged = edges;
        if let Some(depends) = draft.dependencies.get(DependencyKind::Depends) {
            merged.extend(depends.iter().map(|(k, v)| (Arc::clone(k), v.clone())));
        }
        draft.dependencies.merge(DependencyKind::Depends, merged);
    }

    // Explicit `custom` entries win over unknown fields with the same name
    for (key, value) in unknown {
        draft.custom.entry(key).or_insert(value);
    }

    draft.finish(SchemaVersion::V1)
}

fn dependency_kind(field: ManifestField) -> DependencyKind {
    match field {
        ManifestField::Recommends => DependencyKind::Recommends,
        ManifestField::Suggests => DependencyKind::Suggests,
        ManifestField::Conflicts => DependencyKind::Conflicts,
        ManifestField::Breaks => DependencyKind::Breaks,
        _ => DependencyKind::Depends,
    }
}

/// `""` and `"*"` mean universal, otherwise `client` or `server` in any case
fn read_environment<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<Environment, ManifestError> {
    let text = read_string(reader, field)?;
    match text.to_ascii_lowercase().as_str() {
        "" | "*" => Ok(Environment::Universal),
        "client" => Ok(Environment::Client),
        "server" => Ok(Environment::Server),
        other => Err(ManifestError::invalid_value(
            field,
            format!("invalid environment type '{other}'"),
        )),
    }
}

/// `["config.json" | {"config": "..", "environment": ".."}, ...]`
fn read_mixins<T: TokenStream + ?Sized>(reader: &mut T) -> Result<Vec<MixinEntry>, ManifestError> {
    expect_kind(reader, TokenKind::Array, "mixins", "an array")?;
    reader.begin_array()?;
    let mut mixins = Vec::new();
    while reader.has_next()? {
        match reader.peek()? {
            TokenKind::String => mixins.push(MixinEntry {
                config: Arc::from(reader.read_string()?),
                environment: Environment::Universal,
            }),
            TokenKind::Object => {
                reader.begin_object()?;
                let mut config = None;
                let mut environment = Environment::Universal;
                while let Some(key) = reader.next_key()? {
                    match key.as_str() {
                        "config" => config = Some(read_arc_str(reader, "mixins.config")?),
                        "environment" => {
                            environment = read_environment(reader, "mixins.environment")?;
                        }
                        _ => reader.skip_value()?,
                    }
                }
                let config =
                    config.ok_or_else(|| ManifestError::MissingRequired("config".to_string()))?;
                mixins.push(MixinEntry {
                    config,
                    environment,
                });
            }
            _ => {
                return Err(ManifestError::type_mismatch(
                    "mixins",
                    "an array of strings or objects",
                ))
            }
        }
    }
    Ok(mixins)
}

/// A bare name or `{"name": "..", "contact": {..}}`
fn read_person<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<Person, ManifestError> {
    match reader.peek()? {
        TokenKind::String => Ok(Person::new(&reader.read_string()?)),
        TokenKind::Object => {
            reader.begin_object()?;
            let mut name = None;
            let mut contact = ContactInformation::default();
            while let Some(key) = reader.next_key()? {
                match key.as_str() {
                    "name" => name = Some(read_arc_str(reader, &format!("{field}.name"))?),
                    "contact" => contact = read_contact(reader, &format!("{field}.contact"))?,
                    _ => reader.skip_value()?,
                }
            }
            let name = name.ok_or_else(|| ManifestError::MissingRequired("name".to_string()))?;
            Ok(Person { name, contact })
        }
        _ => Err(ManifestError::type_mismatch(field, "a string or an object")),
    }
}
