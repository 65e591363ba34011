//! Script runner seam
//!
//! The embedded runner is an external collaborator; the bridge drives it only
//! through [`ScriptRunner`].

use crate::error::TaskError;
use crate::properties::PropertySpace;
use crate::reference::ReferenceTable;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Runner message verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageLevel {
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
}

impl MessageLevel {
    /// Level matching a tracing max level; logging switched off maps to `Verbose`
    #[must_use]
    pub fn from_max_level(filter: LevelFilter) -> Self {
        match filter.into_level() {
            None => Self::Verbose,
            Some(level) if level >= Level::DEBUG => Self::Debug,
            Some(level) if level == Level::INFO => Self::Info,
            Some(level) if level == Level::WARN => Self::Warn,
            Some(_) => Self::Error,
        }
    }

    /// Level matching the currently installed subscriber
    #[must_use]
    pub fn current() -> Self {
        Self::from_max_level(LevelFilter::current())
    }
}

/// Position inside a script, 1-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<PathBuf>,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: Some(file.into()),
            line,
            column,
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file.display(), self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

/// Structured failure raised by a script
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BuildFailure {
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl BuildFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl From<TaskError> for BuildFailure {
    fn from(err: TaskError) -> Self {
        Self::new(err.to_string())
    }
}

/// Errors a runner can report
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The script failed; subject to failure tolerance
    #[error("{0}")]
    Build(BuildFailure),

    /// The runner itself broke
    #[error("internal runner error: {0}")]
    Internal(String),
}

impl From<BuildFailure> for RunnerError {
    fn from(failure: BuildFailure) -> Self {
        Self::Build(failure)
    }
}

/// An embedded script runner
///
/// Calls arrive in a fixed order during one run: message level, configure,
/// base directory, references, vocabulary, properties, execute, properties.
pub trait ScriptRunner {
    fn set_message_level(&mut self, level: MessageLevel);

    fn set_base_dir(&mut self, dir: &Path);

    /// Load `script` and bind its root element as the target `target`
    ///
    /// # Errors
    /// `RunnerError::Build` if the script cannot be loaded
    fn configure(&mut self, script: &Path, target: &str) -> Result<(), RunnerError>;

    /// Define a task vocabulary from a resource, optionally under a namespace URI
    ///
    /// # Errors
    /// `RunnerError::Build` if the resource is unknown
    fn define_vocabulary(&mut self, resource: &str, uri: Option<&str>) -> Result<(), RunnerError>;

    fn references(&self) -> &ReferenceTable;

    fn references_mut(&mut self) -> &mut ReferenceTable;

    fn properties(&self) -> &PropertySpace;

    fn properties_mut(&mut self) -> &mut PropertySpace;

    /// Run a named target to completion
    ///
    /// # Errors
    /// `RunnerError::Build` with a source location when the script fails
    fn execute_target(&mut self, target: &str) -> Result<(), RunnerError>;
}
