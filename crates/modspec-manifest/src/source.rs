//! Byte sources a manifest can be (re)read from
//!
//! Detection may need a second pass over a document, so sources hand out a
//! fresh reader on every `open`. Readers are owned by the parse call that
//! opened them and dropped on every exit path.

use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something a manifest document can be opened from, any number of times
pub trait ManifestSource {
    type Reader: io::Read;

    /// Open a new reader positioned at the start of the document.
    fn open(&self) -> io::Result<Self::Reader>;

    /// Human readable name used to attribute errors.
    fn describe(&self) -> String;
}

impl ManifestSource for Path {
    type Reader = File;

    fn open(&self) -> io::Result<File> {
        File::open(self)
    }

    fn describe(&self) -> String {
        self.display().to_string()
    }
}

impl ManifestSource for PathBuf {
    type Reader = File;

    fn open(&self) -> io::Result<File> {
        self.as_path().open()
    }

    fn describe(&self) -> String {
        self.as_path().describe()
    }
}

impl<S: ManifestSource + ?Sized> ManifestSource for &S {
    type Reader = S::Reader;

    fn open(&self) -> io::Result<S::Reader> {
        (**self).open()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A manifest held in memory (embedded resources, tests, archive entries)
#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: Arc<str>,
    bytes: Arc<[u8]>,
}

impl InMemorySource {
    pub fn new(name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        InMemorySource {
            name: Arc::from(name),
            bytes: Arc::from(bytes.into()),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ManifestSource for InMemorySource {
    type Reader = Cursor<Arc<[u8]>>;

    fn open(&self) -> io::Result<Self::Reader> {
        Ok(Cursor::new(Arc::clone(&self.bytes)))
    }

    fn describe(&self) -> String {
        self.name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::source::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_source_reopens_from_start() {
        let source = InMemorySource::new("inline", r#"{"id":"x"}"#);
        for _ in 0..2 {
            let mut text = String::new();
            let read = source.open().and_then(|mut r| r.read_to_string(&mut text));
            assert!(read.is_ok());
            assert_eq!(text, r#"{"id":"x"}"#);
        }
        assert_eq!(source.describe(), "inline");
    }

    #[test]
    fn test_path_source_missing_file() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("mod.json");
        assert!(path.open().is_err());
        assert!(path.describe().ends_with("mod.json"));
    }
}
