//! Dynamic value tree for fields whose shape the schema does not fix

use crate::errors::ManifestError;
use crate::token::{TokenKind, TokenStream};
use serde::Serialize;
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shape of a [`CustomValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomValueKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl fmt::Display for CustomValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CustomValueKind::Object => "object",
            CustomValueKind::Array => "array",
            CustomValueKind::String => "string",
            CustomValueKind::Number => "number",
            CustomValueKind::Boolean => "boolean",
            CustomValueKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// An arbitrary value read from a manifest, kept exactly as written
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CustomValue {
    Object(BTreeMap<Arc<str>, CustomValue>),
    Array(Vec<CustomValue>),
    String(Arc<str>),
    Number(Number),
    Boolean(bool),
    Null,
}

impl CustomValue {
    /// Materialize the value at the current position of `reader`.
    pub fn read<T: TokenStream + ?Sized>(reader: &mut T) -> Result<Self, ManifestError> {
        match reader.peek()? {
            TokenKind::Object => {
                reader.begin_object()?;
                let mut entries = BTreeMap::new();
                while let Some(key) = reader.next_key()? {
                    let value = CustomValue::read(reader)?;
                    entries.insert(Arc::from(key), value);
                }
                Ok(CustomValue::Object(entries))
            }
            TokenKind::Array => {
                reader.begin_array()?;
                let mut entries = Vec::new();
                while reader.has_next()? {
                    entries.push(CustomValue::read(reader)?);
                }
                Ok(CustomValue::Array(entries))
            }
            TokenKind::String => Ok(CustomValue::String(Arc::from(reader.read_string()?))),
            TokenKind::Number => Ok(CustomValue::Number(reader.read_number()?)),
            TokenKind::Boolean => Ok(CustomValue::Boolean(reader.read_bool()?)),
            TokenKind::Null => {
                reader.read_null()?;
                Ok(CustomValue::Null)
            }
        }
    }

    pub fn kind(&self) -> CustomValueKind {
        match self {
            CustomValue::Object(_) => CustomValueKind::Object,
            CustomValue::Array(_) => CustomValueKind::Array,
            CustomValue::String(_) => CustomValueKind::String,
            CustomValue::Number(_) => CustomValueKind::Number,
            CustomValue::Boolean(_) => CustomValueKind::Boolean,
            CustomValue::Null => CustomValueKind::Null,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<Arc<str>, CustomValue>> {
        match self {
            CustomValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CustomValue]> {
        match self {
            CustomValue::Array(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CustomValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            CustomValue::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CustomValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CustomValue::Null)
    }

    /// Member lookup on object values
    pub fn get(&self, key: &str) -> Option<&CustomValue> {
        self.as_object().and_then(|entries| entries.get(key))
    }
}

#[cfg(test)]
mod tests {
    use crate::custom_value::*;
    use crate::token::JsonTokenReader;

    fn read(text: &str) -> Result<CustomValue, ManifestError> {
        CustomValue::read(&mut JsonTokenReader::new(text.as_bytes()))
    }

    #[test]
    fn test_reads_nested_shape() {
        let value = read(r#"{"flags": [true, false, null], "depth": {"n": 2, "f": 2.5}, "s": "x"}"#);
        let Ok(value) = value else {
            panic!("custom value should parse");
        };

        assert_eq!(value.kind(), CustomValueKind::Object);
        assert_eq!(value.as_object().map(BTreeMap::len), Some(3));

        let flags = value.get("flags").and_then(CustomValue::as_array);
        assert_eq!(
            flags,
            Some(
                &[
                    CustomValue::Boolean(true),
                    CustomValue::Boolean(false),
                    CustomValue::Null
                ][..]
            )
        );

        let depth = value.get("depth");
        assert!(depth
            .and_then(|d| d.get("n"))
            .and_then(CustomValue::as_number)
            .is_some_and(Number::is_i64));
        assert!(depth
            .and_then(|d| d.get("f"))
            .and_then(CustomValue::as_number)
            .is_some_and(Number::is_f64));
        assert_eq!(value.get("s").and_then(CustomValue::as_str), Some("x"));
    }

    #[test]
    fn test_wrong_shape_accessors_return_none() {
        let value = CustomValue::String(Arc::from("text"));
        assert!(value.as_object().is_none());
        assert!(value.as_array().is_none());
        assert!(value.as_number().is_none());
        assert!(value.as_bool().is_none());
        assert!(!value.is_null());
        assert!(value.get("any").is_none());
    }

    #[test]
    fn test_malformed_tokens_fail() {
        assert!(matches!(read(r#"{"a": [1, 2"#), Err(ManifestError::Decode { .. })));
        assert!(matches!(read("nul"), Err(ManifestError::Decode { .. })));
    }

    #[test]
    fn test_serializes_back_to_json() {
        let Ok(value) = read(r#"{"b": [1, "two", null], "a": true}"#) else {
            panic!("custom value should parse");
        };
        let json = serde_json::to_string(&value).unwrap_or_default();
        assert_eq!(json, r#"{"a":true,"b":[1,"two",null]}"#);
    }
}
