//! Schema version 0
//!
//! The legacy layout: `side` instead of `environment`, `initializer(s)`
//! instead of entrypoints, mixins grouped by side and `links` for contact
//! information. Unknown fields are skipped silently.

use crate::errors::ManifestError;
use crate::fields::ManifestField;
use crate::grammar::common::{
    check_schema_version, expect_kind, read_arc_str, read_contact, read_dependencies,
    read_people, read_string, read_string_array, read_version, ManifestDraft,
};
use crate::token::{TokenKind, TokenStream};
use crate::types::{
    ContactInformation, DependencyKind, EntrypointMetadata, Environment, Manifest, MixinEntry,
    Person, SchemaVersion,
};
use smallvec::smallvec;
use std::sync::Arc;

/// Stage legacy initializers are registered under
pub const INITIALIZER_STAGE: &str = "main";

/// Decode the remaining fields of an already entered top-level object.
pub(crate) fn parse_fields<T: TokenStream + ?Sized>(
    reader: &mut T,
) -> Result<Manifest, ManifestError> {
    let mut draft = ManifestDraft::default();
    let mut initializer: Option<String> = None;
    let mut initializers: Vec<String> = Vec::new();

    while let Some(key) = reader.next_key()? {
        let Some(field) = ManifestField::lookup(&key, SchemaVersion::V0) else {
            tracing::trace!("Skipping unknown v0 field '{}'", key);
            reader.skip_value()?;
            continue;
        };

        match field {
            ManifestField::SchemaVersion => check_schema_version(reader, SchemaVersion::V0)?,
            ManifestField::Id => draft.id = Some(read_arc_str(reader, "id")?),
            ManifestField::Version => draft.version = Some(read_version(reader)?),
            ManifestField::Name => draft.name = Some(read_arc_str(reader, "name")?),
            ManifestField::Description => {
                draft.description = Some(read_arc_str(reader, "description")?);
            }
            ManifestField::Authors => draft.authors = read_people(reader, "authors", read_person)?,
            ManifestField::Contributors => {
                draft.contributors = read_people(reader, "contributors", read_person)?;
            }
            ManifestField::License => draft.license = smallvec![read_arc_str(reader, "license")?],
            ManifestField::Requires => {
                let edges = read_dependencies(reader, "requires")?;
                draft.dependencies.set(DependencyKind::Depends, edges);
            }
            ManifestField::Recommends => {
                let edges = read_dependencies(reader, "recommends")?;
                draft.dependencies.set(DependencyKind::Recommends, edges);
            }
            ManifestField::Conflicts => {
                let edges = read_dependencies(reader, "conflicts")?;
                draft.dependencies.set(DependencyKind::Conflicts, edges);
            }
            ManifestField::Mixins => draft.mixins = read_mixins(reader)?,
            ManifestField::Side => draft.environment = read_side(reader)?,
            ManifestField::Initializer => initializer = Some(read_string(reader, "initializer")?),
            ManifestField::Initializers => {
                initializers = read_string_array(reader, "initializers")?;
            }
            ManifestField::Links => draft.contact = read_links(reader)?,
            other => {
                // Not reachable through the v0 lookup table
                tracing::debug!("Ignoring field '{}' in a v0 manifest", other.name());
                reader.skip_value()?;
            }
        }
    }

    let (id, _) = draft.require()?;
    // An empty `initializers` list does not conflict with `initializer`.
    let initializers = match (initializer, initializers) {
        (Some(_), many) if !many.is_empty() => {
            return Err(ManifestError::MutuallyExclusiveFields {
                first: "initializer",
                second: "initializers",
                unit: id.to_string(),
            });
        }
        (Some(single), _) => vec![single],
        (None, many) => many,
    };

    if !initializers.is_empty() {
        let entries = initializers
            .iter()
            .map(|value| EntrypointMetadata::new(value))
            .collect();
        draft.entrypoints.insert(Arc::from(INITIALIZER_STAGE), entries);
    }

    draft.finish(SchemaVersion::V0)
}

fn read_side<T: TokenStream + ?Sized>(reader: &mut T) -> Result<Environment, ManifestError> {
    let side = read_string(reader, "side")?;
    match side.as_str() {
        "universal" => Ok(Environment::Universal),
        "client" => Ok(Environment::Client),
        "server" => Ok(Environment::Server),
        other => Err(ManifestError::invalid_value(
            "side",
            format!("expected universal, client or server, got '{other}'"),
        )),
    }
}

/// `{"client": .., "common": .., "server": ..}`, each null, a string or a string array
fn read_mixins<T: TokenStream + ?Sized>(reader: &mut T) -> Result<Vec<MixinEntry>, ManifestError> {
    expect_kind(reader, TokenKind::Object, "mixins", "an object")?;
    reader.begin_object()?;

    let mut client = Vec::new();
    let mut common = Vec::new();
    let mut server = Vec::new();
    while let Some(key) = reader.next_key()? {
        let slot = match key.as_str() {
            "client" => &mut client,
            "common" => &mut common,
            "server" => &mut server,
            _ => {
                reader.skip_value()?;
                continue;
            }
        };
        let path = format!("mixins.{key}");
        *slot = match reader.peek()? {
            TokenKind::Null => {
                reader.read_null()?;
                Vec::new()
            }
            TokenKind::String => vec![reader.read_string()?],
            TokenKind::Array => read_string_array(reader, &path)?,
            _ => {
                return Err(ManifestError::type_mismatch(
                    path,
                    "a string or an array of strings",
                ))
            }
        };
    }

    let entries = client
        .into_iter()
        .map(|config| (config, Environment::Client))
        .chain(common.into_iter().map(|config| (config, Environment::Universal)))
        .chain(server.into_iter().map(|config| (config, Environment::Server)))
        .map(|(config, environment)| MixinEntry {
            config: Arc::from(config),
            environment,
        })
        .collect();
    Ok(entries)
}

/// A homepage string or an object of contact channels
fn read_links<T: TokenStream + ?Sized>(
    reader: &mut T,
) -> Result<ContactInformation, ManifestError> {
    match reader.peek()? {
        TokenKind::String => {
            let mut contact = ContactInformation::default();
            contact.insert("homepage", &reader.read_string()?);
            Ok(contact)
        }
        TokenKind::Object => read_contact(reader, "links"),
        _ => Err(ManifestError::type_mismatch(
            "links",
            "a string or an object",
        )),
    }
}

fn read_person<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<Person, ManifestError> {
    match reader.peek()? {
        TokenKind::String => parse_person(&reader.read_string()?),
        TokenKind::Object => {
            reader.begin_object()?;
            let mut person = Person::new("");
            while let Some(key) = reader.next_key()? {
                let path = format!("{field}.{key}");
                match key.as_str() {
                    "name" => person.name = read_arc_str(reader, &path)?,
                    "email" | "website" => {
                        let value = read_string(reader, &path)?;
                        person.contact.insert(&key, &value);
                    }
                    _ => reader.skip_value()?,
                }
            }
            if person.name.is_empty() {
                return Err(ManifestError::MissingRequired("name".to_string()));
            }
            Ok(person)
        }
        _ => Err(ManifestError::type_mismatch(field, "a string or an object")),
    }
}

/// `Name <email> (website)`, both suffixes optional
fn parse_person(text: &str) -> Result<Person, ManifestError> {
    let mut parts: Vec<&str> = text.split(' ').collect();
    let mut contact = ContactInformation::default();

    if let Some(website) = parts.last().and_then(|last| enclosed(last, '(', ')')) {
        contact.insert("website", website);
        parts.pop();
    }
    if let Some(email) = parts.last().and_then(|last| enclosed(last, '<', '>')) {
        contact.insert("email", email);
        parts.pop();
    }

    let name = parts.join(" ");
    if name.trim().is_empty() {
        return Err(ManifestError::MissingRequired("name".to_string()));
    }
    Ok(Person {
        name: Arc::from(name),
        contact,
    })
}

fn enclosed(part: &str, open: char, close: char) -> Option<&str> {
    part.strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .filter(|inner| !inner.is_empty())
}

#[cfg(test)]
mod tests {
    use crate::grammar::v0::*;
    use crate::token::JsonTokenReader;

    fn parse(text: &str) -> Result<Manifest, ManifestError> {
        let mut reader = JsonTokenReader::new(text.as_bytes());
        reader.begin_object()?;
        parse_fields(&mut reader)
    }

    #[test]
    fn test_person_string_form() {
        let Ok(person) = parse_person("Jane Q. Doe <jane@example.com> (https://example.com)") else {
            panic!("person should parse");
        };
        assert_eq!(&*person.name, "Jane Q. Doe");
        assert_eq!(person.contact.get("email"), Some("jane@example.com"));
        assert_eq!(person.contact.get("website"), Some("https://example.com"));

        let Ok(plain) = parse_person("Solo") else {
            panic!("plain name should parse");
        };
        assert_eq!(&*plain.name, "Solo");
        assert!(plain.contact.is_empty());

        assert!(matches!(
            parse_person("<only@mail>"),
            Err(ManifestError::MissingRequired(field)) if field == "name"
        ));
    }

    #[test]
    fn test_initializers_become_main_entrypoints() {
        let manifest = parse(r#"{"id": "legacy", "version": "1.0", "initializers": ["a.A", "b.B"]}"#);
        let Ok(manifest) = manifest else {
            panic!("v0 manifest should parse");
        };
        let main = manifest.entrypoints(INITIALIZER_STAGE);
        assert_eq!(main.len(), 2);
        assert_eq!(&*main[0].value, "a.A");
        assert_eq!(&*main[1].adapter, EntrypointMetadata::DEFAULT_ADAPTER);
    }

    #[test]
    fn test_empty_initializers_do_not_conflict() {
        let manifest = parse(
            r#"{"id": "legacy", "version": "1.0", "initializer": "a.A", "initializers": []}"#,
        );
        let Ok(manifest) = manifest else {
            panic!("empty initializers should be accepted");
        };
        let main = manifest.entrypoints(INITIALIZER_STAGE);
        assert_eq!(main.len(), 1);
        assert_eq!(&*main[0].value, "a.A");
    }

    #[test]
    fn test_initializer_and_initializers_are_exclusive() {
        let result = parse(
            r#"{"id": "legacy", "version": "1.0", "initializer": "a.A", "initializers": ["b.B"]}"#,
        );
        match result {
            Err(ManifestError::MutuallyExclusiveFields { first, second, unit }) => {
                assert_eq!((first, second), ("initializer", "initializers"));
                assert_eq!(unit, "legacy");
            }
            other => panic!("expected exclusivity error, got {other:?}"),
        }
    }

    #[test]
    fn test_mixins_grouped_by_side() {
        let manifest = parse(
            r#"{"id": "legacy", "version": "1.0",
                "mixins": {"client": "c.json", "common": ["a.json", "b.json"], "server": null}}"#,
        );
        let Ok(manifest) = manifest else {
            panic!("v0 manifest should parse");
        };
        let mixins = manifest.mixins();
        assert_eq!(mixins.len(), 3);
        assert_eq!(mixins[0].environment, Environment::Client);
        assert_eq!(mixins[1].environment, Environment::Universal);
        assert_eq!(&*mixins[2].config, "b.json");
    }

    #[test]
    fn test_side_links_and_requires() {
        let manifest = parse(
            r#"{"id": "legacy", "version": "1.0", "side": "client",
                "links": "https://example.com", "requires": {"core": ">=2.0.0"},
                "license": "MIT", "unknownLegacy": {"x": 1}}"#,
        );
        let Ok(manifest) = manifest else {
            panic!("v0 manifest should parse");
        };
        assert_eq!(manifest.environment(), Environment::Client);
        assert_eq!(manifest.contact().get("homepage"), Some("https://example.com"));
        assert_eq!(manifest.licenses().len(), 1);
        assert_eq!(
            manifest.dependencies().of_kind(DependencyKind::Depends).count(),
            1
        );
        assert!(manifest.custom_values().is_empty());
    }

    #[test]
    fn test_invalid_side_is_rejected() {
        assert!(matches!(
            parse(r#"{"id": "legacy", "version": "1.0", "side": "both"}"#),
            Err(ManifestError::InvalidValue { field, .. }) if field == "side"
        ));
    }

    #[test]
    fn test_v1_only_fields_are_ignored() {
        let manifest = parse(r#"{"id": "legacy", "version": "1.0", "entrypoints": {"main": ["x"]}}"#);
        assert!(manifest.is_ok_and(|m| m.entrypoint_stages().count() == 0));
    }
}
