//! Error types

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkError>;

/// Failures surfaced to the caller of the normalizer
#[derive(Debug, Error)]
pub enum LinkError {
    /// Wrong command-line arguments
    #[error("{0}")]
    Usage(String),

    /// Input cannot be read, or output cannot be written
    #[error("cannot access {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not a well-formed XLSX package
    #[error("{} is not a valid XLSX workbook", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: PackageError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LinkError {
    pub fn file_access(path: impl AsRef<Path>, source: io::Error) -> Self {
        LinkError::FileAccess {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn format(path: impl AsRef<Path>, source: PackageError) -> Self {
        LinkError::Format {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Structural problems found while reading or rewriting the ZIP package
#[derive(Debug, Error)]
pub enum PackageError {
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error("missing part {0}")]
    MissingPart(String),

    #[error("cannot read part {part}")]
    Read {
        part: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed XML in {part}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("sheet '{sheet}' points to unknown relationship '{rel_id}'")]
    UnresolvedSheet { sheet: String, rel_id: String },
}

impl PackageError {
    pub fn xml(part: &str, source: impl Into<quick_xml::Error>) -> Self {
        PackageError::Xml {
            part: part.to_string(),
            source: source.into(),
        }
    }
}
