//! Error types for the configuration tree
//!
//! Provides error handling for:
//! - Tree construction and validation
//! - Script serialization (tree → file)
//! - Script reading (markup → tree)

use std::path::PathBuf;

/// Malformed configuration tree or tree source
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Element with an empty name
    #[error("element at {path} has an empty name")]
    EmptyName { path: String },

    /// Element name that cannot be written as markup
    #[error("invalid element name: '{0}'")]
    InvalidName(String),

    /// Attribute with an empty or unwritable key
    #[error("invalid attribute key '{key}' on element '{element}'")]
    InvalidAttributeKey { element: String, key: String },

    /// JSON source could not be decoded
    #[error("invalid json configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML source could not be decoded
    #[error("invalid yaml configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors while serializing a tree to a script file
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// IO error while creating or writing the destination
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tree rejected before any output was produced
    #[error("invalid configuration tree: {0}")]
    InvalidTree(#[from] TreeError),
}

impl WriteError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while reading markup into a tree
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// Malformed markup, positions are 1-based
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
