//! Error types for the bridge
//!
//! Provides error handling for:
//! - Invalid or removed configuration
//! - Unresolved dependency artifacts
//! - Script generation and filesystem failures
//! - Failures reported by the script runner
//! - Custom task failures inside the runner

use crate::orchestrator::Stage;
use crate::runner::BuildFailure;
use antrun_artifact::UnresolvedArtifactError;
use antrun_config::WriteError;
use std::path::PathBuf;

/// Main bridge error type
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Missing, invalid or removed configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A path or property needed an artifact file that was never resolved
    #[error(transparent)]
    UnresolvedArtifact(#[from] UnresolvedArtifactError),

    /// Filesystem failure outside the serializer
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script could not be generated
    #[error("script generation failed: {0}")]
    Script(#[from] WriteError),

    /// The runner reported a build failure
    #[error("{message}")]
    RunnerExecution {
        /// Failure text enriched with the script fragment, if any
        message: String,
        /// Failure as reported by the runner
        failure: BuildFailure,
    },

    /// Any other failure during a run
    #[error("error executing tasks during {stage}: {message}")]
    Unexpected { stage: Stage, message: String },
}

impl BridgeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error fails the build even when failures are tolerated
    ///
    /// Only runner-reported build failures can be tolerated.
    #[inline]
    #[must_use]
    pub fn is_fatal_regardless_of_tolerance(&self) -> bool {
        !matches!(self, Self::RunnerExecution { .. })
    }
}

/// Failure of a custom task executed by a runner
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Required task attribute is absent
    #[error("{0} is a required parameter")]
    MissingParameter(&'static str),

    /// Referenced file does not exist
    #[error("file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Reference id absent from the reference table or of the wrong kind
    #[error("{kind} reference not found: {id}")]
    ReferenceNotFound { kind: &'static str, id: String },

    /// Vocabulary resource this bridge does not provide
    #[error("unknown task vocabulary resource: {0}")]
    UnknownResource(String),

    /// Artifact without a resolved file
    #[error(transparent)]
    UnresolvedArtifact(#[from] UnresolvedArtifactError),
}

impl TaskError {
    pub(crate) fn reference_not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
