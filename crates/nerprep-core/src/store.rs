//! Serialized document store
//!
//! An ordered collection of documents written to disk as one JSON file
//! with a format version and creation timestamp.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::doc::Doc;
use crate::{NerprepError, Result};

/// Current on-disk format version
pub const STORE_VERSION: u32 = 1;

#[derive(Serialize)]
struct StoreFileRef<'a, T> {
    version: u32,
    created_at: DateTime<Utc>,
    docs: &'a [T],
}

#[derive(Deserialize)]
struct StoreFile<T> {
    version: u32,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
    docs: Vec<T>,
}

/// Ordered collection of documents
#[derive(Debug, Clone, PartialEq)]
pub struct DocStore<T = Doc> {
    docs: Vec<T>,
}

impl<T> Default for DocStore<T> {
    fn default() -> Self {
        Self { docs: Vec::new() }
    }
}

impl<T> DocStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document
    pub fn add(&mut self, doc: T) {
        self.docs.push(doc);
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.docs.iter()
    }

    pub fn into_docs(self) -> Vec<T> {
        self.docs
    }
}

impl<T> FromIterator<T> for DocStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            docs: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for DocStore<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}

impl<T: Serialize + DeserializeOwned> DocStore<T> {
    /// Write the store to `path`, creating parent directories
    pub fn to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| NerprepError::IoError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        let payload = StoreFileRef {
            version: STORE_VERSION,
            created_at: Utc::now(),
            docs: &self.docs,
        };
        serde_json::to_writer(&mut writer, &payload)
            .map_err(|e| NerprepError::SerializationError(e.to_string()))?;
        writer.flush().map_err(io_err)?;

        tracing::debug!("Wrote {} documents to {}", self.docs.len(), path.display());
        Ok(())
    }

    /// Read a store previously written with `to_disk`
    pub fn from_disk(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| NerprepError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        let stored: StoreFile<T> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| NerprepError::SerializationError(format!("{}: {e}", path.display())))?;
        if stored.version != STORE_VERSION {
            return Err(NerprepError::UnsupportedVersion {
                found: stored.version,
                expected: STORE_VERSION,
            });
        }

        Ok(Self { docs: stored.docs })
    }
}
