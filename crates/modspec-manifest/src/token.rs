//! Forward-only token stream over a JSON document
//!
//! The parser never builds a document tree. It pulls tokens one at a time
//! through [`TokenStream`], which is the only thing the grammars depend on.
//! [`JsonTokenReader`] is the stock implementation: it finds token boundaries
//! itself and hands scalar decoding (string escapes, number representation)
//! to `serde_json`.
//!
//! Duplicate object keys are reported exactly as they appear in the input.

use crate::errors::ManifestError;
use serde_json::Number;
use std::fmt;
use std::io::{self, BufReader, Read};

/// Nesting depth after which the reader refuses to descend further
const MAX_DEPTH: usize = 128;

/// Kind of the value at the current position of a token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Object => "object",
            TokenKind::Array => "array",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull interface over a structured document.
///
/// Every value must be consumed exactly once, either by the matching
/// `read_*`/`begin_*` call or by [`TokenStream::skip_value`].
pub trait TokenStream {
    /// Kind of the value at the current position, without consuming it.
    fn peek(&mut self) -> Result<TokenKind, ManifestError>;

    /// Enter the object at the current position.
    fn begin_object(&mut self) -> Result<(), ManifestError>;

    /// Next key of the current object, or `None` once the object is closed.
    fn next_key(&mut self) -> Result<Option<String>, ManifestError>;

    /// Enter the array at the current position.
    fn begin_array(&mut self) -> Result<(), ManifestError>;

    /// Whether the current array has another element; `false` closes it.
    fn has_next(&mut self) -> Result<bool, ManifestError>;

    fn read_string(&mut self) -> Result<String, ManifestError>;

    fn read_number(&mut self) -> Result<Number, ManifestError>;

    fn read_bool(&mut self) -> Result<bool, ManifestError>;

    fn read_null(&mut self) -> Result<(), ManifestError>;

    /// Check that nothing but whitespace follows the top-level value.
    fn finish(&mut self) -> Result<(), ManifestError>;

    /// Consume the value at the current position, whatever its shape.
    fn skip_value(&mut self) -> Result<(), ManifestError> {
        match self.peek()? {
            TokenKind::Object => {
                self.begin_object()?;
                while self.next_key()?.is_some() {
                    self.skip_value()?;
                }
                Ok(())
            }
            TokenKind::Array => {
                self.begin_array()?;
                while self.has_next()? {
                    self.skip_value()?;
                }
                Ok(())
            }
            TokenKind::String => self.read_string().map(drop),
            TokenKind::Number => self.read_number().map(drop),
            TokenKind::Boolean => self.read_bool().map(drop),
            TokenKind::Null => self.read_null(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Object { first: bool },
    Array { first: bool },
}

/// Streaming JSON tokenizer over any byte source
pub struct JsonTokenReader<R: Read> {
    input: BufReader<R>,
    peeked: Option<u8>,
    offset: u64,
    stack: Vec<Frame>,
}

impl<R: Read> JsonTokenReader<R> {
    pub fn new(input: R) -> Self {
        JsonTokenReader {
            input: BufReader::new(input),
            peeked: None,
            offset: 0,
            stack: Vec::new(),
        }
    }

    /// Number of bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn decode_error(&self, message: impl Into<String>) -> ManifestError {
        ManifestError::Decode {
            offset: self.offset,
            message: message.into(),
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, ManifestError> {
        if self.peeked.is_none() {
            let mut buf = [0u8; 1];
            loop {
                match self.input.read(&mut buf) {
                    Ok(0) => return Ok(None),
                    Ok(_) => {
                        self.peeked = Some(buf[0]);
                        break;
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(ManifestError::Io(e)),
                }
            }
        }
        Ok(self.peeked)
    }

    fn next_byte(&mut self) -> Result<u8, ManifestError> {
        match self.peek_byte()? {
            Some(byte) => {
                self.peeked = None;
                self.offset += 1;
                Ok(byte)
            }
            None => Err(self.decode_error("unexpected end of input")),
        }
    }

    /// Skip whitespace and return the next significant byte without consuming it
    fn peek_significant(&mut self) -> Result<u8, ManifestError> {
        loop {
            match self.peek_byte()? {
                Some(b' ' | b'\t' | b'\n' | b'\r') => {
                    self.next_byte()?;
                }
                Some(byte) => return Ok(byte),
                None => return Err(self.decode_error("unexpected end of input")),
            }
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<(), ManifestError> {
        let found = self.peek_significant()?;
        if found != expected {
            return Err(self.decode_error(format!(
                "expected '{}' but found '{}'",
                expected as char,
                found.escape_ascii()
            )));
        }
        self.next_byte()?;
        Ok(())
    }

    fn expect_literal(&mut self, literal: &'static [u8]) -> Result<(), ManifestError> {
        self.peek_significant()?;
        for &expected in literal {
            let found = self.next_byte()?;
            if found != expected {
                return Err(self.decode_error(format!(
                    "invalid literal, expected '{}'",
                    String::from_utf8_lossy(literal)
                )));
            }
        }
        Ok(())
    }

    fn push(&mut self, frame: Frame) -> Result<(), ManifestError> {
        if self.stack.len() >= MAX_DEPTH {
            return Err(self.decode_error("recursion limit exceeded"));
        }
        self.stack.push(frame);
        Ok(())
    }

    /// Collect the raw bytes of a string token, quotes included
    fn raw_string(&mut self) -> Result<Vec<u8>, ManifestError> {
        self.expect_byte(b'"')?;
        let mut raw = vec![b'"'];
        let mut escaped = false;
        loop {
            let byte = self.next_byte()?;
            raw.push(byte);
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                return Ok(raw);
            }
        }
    }

    fn raw_number(&mut self) -> Result<Vec<u8>, ManifestError> {
        self.peek_significant()?;
        let mut raw = Vec::new();
        while let Some(byte) = self.peek_byte()? {
            if !matches!(byte, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                break;
            }
            raw.push(self.next_byte()?);
        }
        Ok(raw)
    }
}

impl<R: Read> TokenStream for JsonTokenReader<R> {
    fn peek(&mut self) -> Result<TokenKind, ManifestError> {
        match self.peek_significant()? {
            b'{' => Ok(TokenKind::Object),
            b'[' => Ok(TokenKind::Array),
            b'"' => Ok(TokenKind::String),
            b't' | b'f' => Ok(TokenKind::Boolean),
            b'n' => Ok(TokenKind::Null),
            b'-' | b'0'..=b'9' => Ok(TokenKind::Number),
            other => Err(self.decode_error(format!(
                "unexpected character '{}'",
                other.escape_ascii()
            ))),
        }
    }

    fn begin_object(&mut self) -> Result<(), ManifestError> {
        self.expect_byte(b'{')?;
        self.push(Frame::Object { first: true })
    }

    fn next_key(&mut self) -> Result<Option<String>, ManifestError> {
        let Some(Frame::Object { first }) = self.stack.last().copied() else {
            return Err(self.decode_error("next_key called outside of an object"));
        };

        if self.peek_significant()? == b'}' {
            self.next_byte()?;
            self.stack.pop();
            return Ok(None);
        }
        if !first {
            self.expect_byte(b',')?;
        }
        if self.peek_significant()? != b'"' {
            return Err(self.decode_error("expected object key"));
        }

        let key = self.read_string()?;
        self.expect_byte(b':')?;
        if let Some(Frame::Object { first }) = self.stack.last_mut() {
            *first = false;
        }
        Ok(Some(key))
    }

    fn begin_array(&mut self) -> Result<(), ManifestError> {
        self.expect_byte(b'[')?;
        self.push(Frame::Array { first: true })
    }

    fn has_next(&mut self) -> Result<bool, ManifestError> {
        let Some(Frame::Array { first }) = self.stack.last().copied() else {
            return Err(self.decode_error("has_next called outside of an array"));
        };

        if self.peek_significant()? == b']' {
            self.next_byte()?;
            self.stack.pop();
            return Ok(false);
        }
        if !first {
            self.expect_byte(b',')?;
        }
        if let Some(Frame::Array { first }) = self.stack.last_mut() {
            *first = false;
        }
        Ok(true)
    }

    fn read_string(&mut self) -> Result<String, ManifestError> {
        let raw = self.raw_string()?;
        serde_json::from_slice(&raw).map_err(|e| self.decode_error(e.to_string()))
    }

    fn read_number(&mut self) -> Result<Number, ManifestError> {
        let raw = self.raw_number()?;
        if raw.is_empty() {
            return Err(self.decode_error("expected a number"));
        }
        serde_json::from_slice(&raw).map_err(|e| self.decode_error(e.to_string()))
    }

    fn read_bool(&mut self) -> Result<bool, ManifestError> {
        match self.peek_significant()? {
            b't' => self.expect_literal(b"true").map(|()| true),
            b'f' => self.expect_literal(b"false").map(|()| false),
            _ => Err(self.decode_error("expected a boolean")),
        }
    }

    fn read_null(&mut self) -> Result<(), ManifestError> {
        self.expect_literal(b"null")
    }

    fn finish(&mut self) -> Result<(), ManifestError> {
        while let Some(byte) = self.peek_byte()? {
            if !matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
                return Err(self.decode_error(format!(
                    "trailing content '{}' after the document",
                    byte.escape_ascii()
                )));
            }
            self.next_byte()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::token::*;

    fn reader(text: &str) -> JsonTokenReader<&[u8]> {
        JsonTokenReader::new(text.as_bytes())
    }

    #[test]
    fn test_walks_object_in_document_order() {
        let mut r = reader(r#" { "b": 1, "a": [true, null], "c": "x" } "#);
        assert_eq!(r.peek().ok(), Some(TokenKind::Object));
        assert!(r.begin_object().is_ok());

        assert_eq!(r.next_key().ok().flatten().as_deref(), Some("b"));
        assert!(r.read_number().is_ok_and(|n| n.as_i64() == Some(1)));

        assert_eq!(r.next_key().ok().flatten().as_deref(), Some("a"));
        assert!(r.begin_array().is_ok());
        assert!(r.has_next().is_ok_and(|more| more));
        assert!(r.read_bool().is_ok_and(|b| b));
        assert!(r.has_next().is_ok_and(|more| more));
        assert!(r.read_null().is_ok());
        assert!(r.has_next().is_ok_and(|more| !more));

        assert_eq!(r.next_key().ok().flatten().as_deref(), Some("c"));
        assert_eq!(r.read_string().ok().as_deref(), Some("x"));
        assert!(r.next_key().is_ok_and(|k| k.is_none()));
    }

    #[test]
    fn test_duplicate_keys_are_surfaced() {
        let mut r = reader(r#"{"k": 1, "k": 2}"#);
        assert!(r.begin_object().is_ok());
        let mut keys = Vec::new();
        while let Ok(Some(key)) = r.next_key() {
            keys.push(key);
            assert!(r.skip_value().is_ok());
        }
        assert_eq!(keys, vec!["k", "k"]);
    }

    #[test]
    fn test_numbers_keep_integer_or_float_representation() {
        let mut r = reader("[3, 3.0, -1e2]");
        assert!(r.begin_array().is_ok());
        assert!(r.has_next().is_ok());
        assert!(r.read_number().is_ok_and(|n| n.is_i64()));
        assert!(r.has_next().is_ok());
        assert!(r.read_number().is_ok_and(|n| n.is_f64()));
        assert!(r.has_next().is_ok());
        assert!(r.read_number().is_ok_and(|n| n.is_f64()));
    }

    #[test]
    fn test_string_escapes_are_decoded() {
        let mut r = reader(r#""a\"b\\cé""#);
        assert_eq!(r.read_string().ok().as_deref(), Some("a\"b\\cé"));
    }

    #[test]
    fn test_skip_nested_value() {
        let mut r = reader(r#"{"skip": {"x": [1, {"y": []}]}, "keep": "v"}"#);
        assert!(r.begin_object().is_ok());
        assert!(r.next_key().is_ok());
        assert!(r.skip_value().is_ok());
        assert_eq!(r.next_key().ok().flatten().as_deref(), Some("keep"));
        assert_eq!(r.read_string().ok().as_deref(), Some("v"));
    }

    #[test]
    fn test_malformed_input_is_decode_error() {
        let mut r = reader(r#"{"a" 1}"#);
        assert!(r.begin_object().is_ok());
        assert!(matches!(r.next_key(), Err(ManifestError::Decode { .. })));

        let mut r = reader("[1,]");
        assert!(r.begin_array().is_ok());
        assert!(r.has_next().is_ok());
        assert!(r.read_number().is_ok());
        assert!(r.has_next().is_ok());
        assert!(matches!(r.peek(), Err(ManifestError::Decode { .. })));

        let mut r = reader(r#"{"a": tru}"#);
        assert!(r.begin_object().is_ok());
        assert!(r.next_key().is_ok());
        assert!(matches!(r.read_bool(), Err(ManifestError::Decode { .. })));

        let mut r = reader(r#"{"a": "#);
        assert!(r.begin_object().is_ok());
        assert!(r.next_key().is_ok());
        assert!(matches!(r.peek(), Err(ManifestError::Decode { .. })));
    }

    #[test]
    fn test_finish_rejects_trailing_content() {
        let mut r = reader("{} \n\t");
        assert!(r.skip_value().is_ok());
        assert!(r.finish().is_ok());

        let mut r = reader("{}  x");
        assert!(r.skip_value().is_ok());
        assert!(matches!(
            r.finish(),
            Err(ManifestError::Decode { offset: 4, .. })
        ));
    }

    #[test]
    fn test_recursion_limit() {
        let text = "[".repeat(MAX_DEPTH + 1);
        let mut r = reader(&text);
        let mut result = Ok(());
        for _ in 0..=MAX_DEPTH {
            result = r.begin_array().and_then(|()| r.has_next().map(drop));
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(ManifestError::Decode { .. })));
    }
}
