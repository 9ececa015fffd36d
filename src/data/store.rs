//! Persistence of the release record.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::data::{from_yaml, to_yaml, Document};

/// Failures reading or writing the persisted document.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The document exists but could not be read.
    #[error("Failed to read release record {path}")]
    Read {
        /// Location of the document.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The document is not valid YAML for a release record.
    #[error("Release record {path} is corrupt")]
    Parse {
        /// Location of the document.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_yaml::Error,
    },

    /// The document could not be written.
    #[error("Failed to write release record {path}")]
    Write {
        /// Location of the document.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Read-modify-write access to a persisted document.
pub trait DocumentStore {
    /// Loads the document, returning an empty one when none exists yet.
    fn load(&self) -> Result<Document, StoreError>;

    /// Replaces the persisted document. Readers never observe a partial write.
    fn save(&self, document: &Document) -> Result<(), StoreError>;
}

/// A document stored as a YAML file.
#[derive(Debug, Clone)]
pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    /// Creates a store backed by the file at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl DocumentStore for YamlFileStore {
    fn load(&self) -> Result<Document, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Release record not found, starting empty");
                return Ok(Document::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        from_yaml(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Stage next to the target so the final rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        staged
            .write_all(to_yaml(document).as_bytes())
            .map_err(|e| self.write_error(e))?;
        staged.flush().map_err(|e| self.write_error(e))?;
        staged
            .persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        debug!(
            path = %self.path.display(),
            changes = document.changes.len(),
            dependencies = document.dependencies.len(),
            "Saved release record"
        );
        Ok(())
    }
}
