//! Readers shared by every grammar
//!
//! Each reader expects the token stream positioned at the value of the field
//! it decodes and leaves it positioned after that value. Unknown keys inside
//! nested objects are consumed and ignored.

use crate::custom_value::CustomValue;
use crate::errors::ManifestError;
use crate::token::{TokenKind, TokenStream};
use crate::types::{
    ContactInformation, Dependencies, EntrypointMetadata, Environment, Icon, Manifest, MixinEntry,
    NestedJar, Person, SchemaVersion,
};
use crate::version::{Version, VersionRange};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Conventional bounds of a mod id, only warned about
const ID_LENGTH: std::ops::RangeInclusive<usize> = 3..=64;

/// A manifest under construction; required fields are checked in `finish`
#[derive(Debug, Default)]
pub(crate) struct ManifestDraft {
    pub id: Option<Arc<str>>,
    pub version: Option<Version>,
    pub name: Option<Arc<str>>,
    pub description: Option<Arc<str>>,
    pub authors: Vec<Person>,
    pub contributors: Vec<Person>,
    pub contact: ContactInformation,
    pub license: SmallVec<[Arc<str>; 1]>,
    pub environment: Environment,
    pub dependencies: Dependencies,
    pub entrypoints: BTreeMap<Arc<str>, Vec<EntrypointMetadata>>,
    pub jars: Vec<NestedJar>,
    pub mixins: Vec<MixinEntry>,
    pub access_widener: Option<Arc<str>>,
    pub icon: Option<Icon>,
    pub language_adapters: BTreeMap<Arc<str>, Arc<str>>,
    pub custom: BTreeMap<Arc<str>, CustomValue>,
}

impl ManifestDraft {
    /// Fail with `MissingRequired` for the first unset mandatory field.
    pub fn require(&self) -> Result<(&Arc<str>, &Version), ManifestError> {
        let id = self
            .id
            .as_ref()
            .ok_or_else(|| ManifestError::MissingRequired("id".to_string()))?;
        let version = self
            .version
            .as_ref()
            .ok_or_else(|| ManifestError::MissingRequired("version".to_string()))?;
        Ok((id, version))
    }

    pub fn finish(self, schema_version: SchemaVersion) -> Result<Manifest, ManifestError> {
        let id = self
            .id
            .ok_or_else(|| ManifestError::MissingRequired("id".to_string()))?;
        let version = self
            .version
            .ok_or_else(|| ManifestError::MissingRequired("version".to_string()))?;

        if !ID_LENGTH.contains(&id.chars().count()) {
            tracing::warn!(
                "Mod id '{}' should be between {} and {} characters long",
                id,
                ID_LENGTH.start(),
                ID_LENGTH.end()
            );
        }

        Ok(Manifest {
            schema_version,
            id,
            version,
            name: self.name,
            description: self.description,
            authors: self.authors,
            contributors: self.contributors,
            contact: self.contact,
            license: self.license,
            environment: self.environment,
            dependencies: self.dependencies,
            entrypoints: self.entrypoints,
            jars: self.jars,
            mixins: self.mixins,
            access_widener: self.access_widener,
            icon: self.icon,
            language_adapters: self.language_adapters,
            custom: self.custom,
        })
    }
}

pub(crate) fn expect_kind<T: TokenStream + ?Sized>(
    reader: &mut T,
    kind: TokenKind,
    field: &str,
    expected: &'static str,
) -> Result<(), ManifestError> {
    if reader.peek()? == kind {
        Ok(())
    } else {
        Err(ManifestError::type_mismatch(field, expected))
    }
}

pub(crate) fn read_string<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<String, ManifestError> {
    expect_kind(reader, TokenKind::String, field, "a string")?;
    reader.read_string()
}

pub(crate) fn read_arc_str<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<Arc<str>, ManifestError> {
    read_string(reader, field).map(Arc::from)
}

/// Array whose elements must all be strings
pub(crate) fn read_string_array<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<Vec<String>, ManifestError> {
    expect_kind(reader, TokenKind::Array, field, "an array of strings")?;
    reader.begin_array()?;
    let mut values = Vec::new();
    while reader.has_next()? {
        if reader.peek()? != TokenKind::String {
            return Err(ManifestError::type_mismatch(field, "an array of strings"));
        }
        values.push(reader.read_string()?);
    }
    Ok(values)
}

/// A single string or an array of strings
pub(crate) fn read_string_or_array<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<Vec<String>, ManifestError> {
    match reader.peek()? {
        TokenKind::String => Ok(vec![reader.read_string()?]),
        TokenKind::Array => read_string_array(reader, field),
        _ => Err(ManifestError::type_mismatch(
            field,
            "a string or an array of strings",
        )),
    }
}

/// Integral value of a `schemaVersion` field
pub(crate) fn read_schema_version<T: TokenStream + ?Sized>(
    reader: &mut T,
) -> Result<i64, ManifestError> {
    expect_kind(reader, TokenKind::Number, SchemaVersion::FIELD, "a number")?;
    let number = reader.read_number()?;
    if let Some(version) = number.as_i64() {
        return Ok(version);
    }

    // Fractions are truncated toward zero; values outside i64 are rejected.
    number
        .as_f64()
        .filter(|value| value.is_finite() && *value >= i64::MIN as f64 && *value < i64::MAX as f64)
        .map(|value| {
            if value.fract().abs() > 0.0 {
                tracing::debug!("Truncating schema version {} to {}", value, value.trunc());
            }
            value.trunc() as i64
        })
        .ok_or_else(|| ManifestError::type_mismatch(SchemaVersion::FIELD, "an integer"))
}

/// A `schemaVersion` met by a grammar must agree with the version it was dispatched for.
pub(crate) fn check_schema_version<T: TokenStream + ?Sized>(
    reader: &mut T,
    dispatched: SchemaVersion,
) -> Result<(), ManifestError> {
    let found = read_schema_version(reader)?;
    if found == dispatched.as_i64() {
        Ok(())
    } else {
        Err(ManifestError::DuplicateVersionMismatch {
            first: dispatched.as_i64(),
            duplicate: found,
        })
    }
}

pub(crate) fn read_version<T: TokenStream + ?Sized>(
    reader: &mut T,
) -> Result<Version, ManifestError> {
    let text = read_string(reader, "version")?;
    Version::parse(&text)
}

/// `{"<mod id>": "<constraint>" | ["<constraint>", ...]}`
pub(crate) fn read_dependencies<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<BTreeMap<Arc<str>, VersionRange>, ManifestError> {
    expect_kind(reader, TokenKind::Object, field, "an object")?;
    reader.begin_object()?;
    let mut edges = BTreeMap::new();
    while let Some(target) = reader.next_key()? {
        let path = format!("{field}.{target}");
        let constraints = read_string_or_array(reader, &path)?;
        let range = VersionRange::parse_all(&constraints)?;
        edges.insert(Arc::from(target), range);
    }
    Ok(edges)
}

/// `{"<stage>": ["<value>" | {"adapter": "..", "value": ".."}, ...]}`
pub(crate) fn read_entrypoints<T: TokenStream + ?Sized>(
    reader: &mut T,
) -> Result<BTreeMap<Arc<str>, Vec<EntrypointMetadata>>, ManifestError> {
    expect_kind(reader, TokenKind::Object, "entrypoints", "an object")?;
    reader.begin_object()?;
    let mut stages = BTreeMap::new();
    while let Some(stage) = reader.next_key()? {
        let path = format!("entrypoints.{stage}");
        expect_kind(reader, TokenKind::Array, &path, "an array")?;
        reader.begin_array()?;
        let mut entries = Vec::new();
        while reader.has_next()? {
            entries.push(read_entrypoint(reader, &path)?);
        }
        // Empty stages are kept
        stages.insert(Arc::from(stage), entries);
    }
    Ok(stages)
}

pub(crate) fn read_entrypoint<T: TokenStream + ?Sized>(
    reader: &mut T,
    path: &str,
) -> Result<EntrypointMetadata, ManifestError> {
    match reader.peek()? {
        TokenKind::String => Ok(EntrypointMetadata::new(&reader.read_string()?)),
        TokenKind::Object => {
            reader.begin_object()?;
            let mut adapter = None;
            let mut value = None;
            while let Some(key) = reader.next_key()? {
                match key.as_str() {
                    "adapter" => adapter = Some(read_string(reader, &format!("{path}.adapter"))?),
                    "value" => {
                        value = match reader.peek()? {
                            TokenKind::Null => {
                                reader.read_null()?;
                                None
                            }
                            _ => Some(read_string(reader, &format!("{path}.value"))?),
                        };
                    }
                    _ => reader.skip_value()?,
                }
            }
            let value = value.ok_or_else(|| ManifestError::MissingRequired("value".to_string()))?;
            Ok(EntrypointMetadata::with_adapter(
                adapter
                    .as_deref()
                    .unwrap_or(EntrypointMetadata::DEFAULT_ADAPTER),
                &value,
            ))
        }
        _ => Err(ManifestError::type_mismatch(
            path,
            "a string or an object with a \"value\" field",
        )),
    }
}

/// `[{"file": ".."}, ...]`
pub(crate) fn read_jars<T: TokenStream + ?Sized>(
    reader: &mut T,
) -> Result<Vec<NestedJar>, ManifestError> {
    expect_kind(reader, TokenKind::Array, "jars", "an array")?;
    reader.begin_array()?;
    let mut jars = Vec::new();
    while reader.has_next()? {
        expect_kind(reader, TokenKind::Object, "jars", "an array of objects")?;
        reader.begin_object()?;
        let mut file = None;
        while let Some(key) = reader.next_key()? {
            if key == "file" {
                file = Some(read_arc_str(reader, "jars.file")?);
            } else {
                reader.skip_value()?;
            }
        }
        let file = file.ok_or_else(|| ManifestError::MissingRequired("file".to_string()))?;
        jars.push(NestedJar { file });
    }
    Ok(jars)
}

/// Object of string values, e.g. contact channels or language adapters
pub(crate) fn read_string_map<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<BTreeMap<Arc<str>, Arc<str>>, ManifestError> {
    expect_kind(reader, TokenKind::Object, field, "an object")?;
    reader.begin_object()?;
    let mut map = BTreeMap::new();
    while let Some(key) = reader.next_key()? {
        let value = read_arc_str(reader, &format!("{field}.{key}"))?;
        map.insert(Arc::from(key), value);
    }
    Ok(map)
}

pub(crate) fn read_contact<T: TokenStream + ?Sized>(
    reader: &mut T,
    field: &str,
) -> Result<ContactInformation, ManifestError> {
    let mut contact = ContactInformation::default();
    for (channel, value) in read_string_map(reader, field)? {
        contact.insert(&channel, &value);
    }
    Ok(contact)
}

/// Array of people, each decoded by the grammar specific `read_person`
pub(crate) fn read_people<T, F>(
    reader: &mut T,
    field: &str,
    mut read_person: F,
) -> Result<Vec<Person>, ManifestError>
where
    T: TokenStream + ?Sized,
    F: FnMut(&mut T, &str) -> Result<Person, ManifestError>,
{
    expect_kind(reader, TokenKind::Array, field, "an array")?;
    reader.begin_array()?;
    let mut people = Vec::new();
    while reader.has_next()? {
        people.push(read_person(reader, field)?);
    }
    Ok(people)
}

/// `"path"` or `{"<size>": "path", ...}` with sizes >= 1
pub(crate) fn read_icon<T: TokenStream + ?Sized>(reader: &mut T) -> Result<Icon, ManifestError> {
    match reader.peek()? {
        TokenKind::String => Ok(Icon::Single(Arc::from(reader.read_string()?))),
        TokenKind::Object => {
            reader.begin_object()?;
            let mut paths = BTreeMap::new();
            while let Some(key) = reader.next_key()? {
                let path = read_arc_str(reader, "icon")?;
                let size = key.trim().parse::<i64>().map_err(|_| {
                    ManifestError::invalid_value("icon", format!("could not parse icon size '{key}'"))
                })?;
                let size = u32::try_from(size)
                    .ok()
                    .filter(|size| *size >= 1)
                    .ok_or_else(|| {
                        ManifestError::invalid_value(
                            "icon",
                            format!("icon size must be positive, got {size}"),
                        )
                    })?;
                paths.insert(size, path);
            }
            if paths.is_empty() {
                return Err(ManifestError::invalid_value(
                    "icon",
                    "icon object must not be empty",
                ));
            }
            Ok(Icon::Sized(paths))
        }
        _ => Err(ManifestError::type_mismatch(
            "icon",
            "a string or an object",
        )),
    }
}

/// Object of arbitrary values
pub(crate) fn read_custom<T: TokenStream + ?Sized>(
    reader: &mut T,
) -> Result<BTreeMap<Arc<str>, CustomValue>, ManifestError> {
    expect_kind(reader, TokenKind::Object, "custom", "an object")?;
    reader.begin_object()?;
    let mut values = BTreeMap::new();
    while let Some(key) = reader.next_key()? {
        values.insert(Arc::from(key), CustomValue::read(reader)?);
    }
    Ok(values)
}
