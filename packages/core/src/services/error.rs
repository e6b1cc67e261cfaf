//! Archive Error Types
//!
//! Errors raised while reading or writing `.sketch` archives. Structural
//! failures (missing `document.json`, an undispatchable layer) abort the
//! whole operation. Field-level problems never surface here: they are
//! recovered by coercion defaults.

use crate::models::SchemaError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::result::ZipError;

/// Archive read/write errors
#[derive(Error, Debug)]
pub enum SketchError {
    /// The path does not name a `.sketch` archive
    #[error("Not a sketch file: {}", .path.display())]
    NotASketchFile { path: PathBuf },

    /// The archive container could not be opened
    #[error("Corrupt archive {}: {source}", .path.display())]
    CorruptArchive {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    /// The archive lacks `document.json`
    #[error("Archive {} has no document.json entry", .path.display())]
    MissingDocumentEntry { path: PathBuf },

    /// An entry is not valid JSON
    #[error("Invalid JSON in entry '{entry}': {source}")]
    InvalidJson {
        entry: String,
        #[source]
        source: serde_json::Error,
    },

    /// Decoding a node tree failed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The external image of a bitmap layer is absent at write time
    #[error("Missing sidecar image for layer '{layer}': {}", .path.display())]
    MissingSidecar { layer: String, path: PathBuf },

    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip operation failed after the archive was opened
    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),
}

impl SketchError {
    /// Create a not-a-sketch-file error
    pub fn not_a_sketch_file(path: impl AsRef<Path>) -> Self {
        Self::NotASketchFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a corrupt archive error
    pub fn corrupt_archive(path: impl AsRef<Path>, source: ZipError) -> Self {
        Self::CorruptArchive {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a missing document entry error
    pub fn missing_document_entry(path: impl AsRef<Path>) -> Self {
        Self::MissingDocumentEntry {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an invalid JSON error
    pub fn invalid_json(entry: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            entry: entry.into(),
            source,
        }
    }

    /// Create a missing sidecar error
    pub fn missing_sidecar(layer: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::MissingSidecar {
            layer: layer.into(),
            path: path.as_ref().to_path_buf(),
        }
    }
}
