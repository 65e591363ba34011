//! Antrun Core
//!
//! Bridges a build tool's project model to an embedded script runner: the
//! target tree is written out as a script, the build context is registered
//! with the runner, properties are exported before and imported after the
//! run, and runner failures are reported with the offending script line.
//!
//! # Core Concepts
//!
//! - [`BridgeOrchestrator`]: Sequences one run and decides which failures are fatal
//! - [`PropertyBridge`]: Export overwrites runner properties; import never overwrites host ones
//! - [`ScriptRunner`]: Seam to the embedded runner
//! - [`ReferenceTable`]: Named objects shared with the runner
//! - [`TaskVocabulary`]: Custom tasks (`attachartifact`, `dependencyfilesets`)
//! - [`RunConfig`]: Parameters of one run, loadable from YAML or JSON
//!
//! # Example
//!
//! ```rust
//! use antrun_core::{Project, PropertyBridge, PropertySpace};
//! use antrun_artifact::LocalRepository;
//!
//! let project = Project::new("org.example", "demo", "1.0", "/work/demo");
//! let mut runner_properties = PropertySpace::new();
//!
//! PropertyBridge::new()
//!     .with_prefix("mvn.")
//!     .export(&project, &PropertySpace::new(), &LocalRepository::new("/repo"), &mut runner_properties)
//!     .unwrap();
//!
//! assert_eq!(runner_properties.get("mvn.project.version"), Some("1.0"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod bridge;
mod config;
mod diagnostics;
mod error;
mod orchestrator;
mod project;
mod properties;
mod reference;
mod runner;
pub mod tasks;

pub use bridge::{ImportReport, PropertyBridge, ANT_FILE_PROPERTY, DEFAULT_VERSIONS_PROPERTY};
pub use config::{RunConfig, DEFAULT_TARGET_NAME, LEGACY_TASK_URI};
pub use diagnostics::{describe_failure, find_fragment};
pub use error::{BridgeError, BridgeResult, TaskError};
pub use orchestrator::{BridgeOrchestrator, RunOutcome, Stage};
pub use project::{
    AttachingProjectHelper, BuildLayout, BuildSession, Project, ProjectHandle, ProjectHelper,
};
pub use properties::PropertySpace;
pub use reference::{
    FileSet, Reference, ReferenceTable, COMPILE_CLASSPATH_REF, DEPENDENCY_CLASSPATH_REF,
    LOCAL_REPOSITORY_REF, PLUGIN_CLASSPATH_REF, PROJECT_HANDLE_REF, PROJECT_HELPER_REF,
    PROJECT_REF, RUNTIME_CLASSPATH_REF, TEST_CLASSPATH_REF,
};
pub use runner::{BuildFailure, MessageLevel, RunnerError, ScriptRunner, SourceLocation};
pub use tasks::{Task, TaskContext, TaskVocabulary, ANTLIB_RESOURCE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
