//! Antrun Artifact Model
//!
//! Resolved dependency records as supplied by the host build tool, and the
//! pure operations the bridge performs on them.
//!
//! # Core Concepts
//!
//! - [`ArtifactRecord`]: One resolved dependency (coordinates, scope, resolved file)
//! - [`ArtifactSet`]: Insertion-ordered set of records
//! - [`ArtifactFilter`]: Predicate over records; [`filter_artifacts`] combines scope and type filters
//! - [`PathExpression`]: Ordered list of files rendered with the platform path separator
//! - [`LocalRepository`]: Local repository base directory and artifact layout
//!
//! # Example
//!
//! ```rust
//! use antrun_artifact::{filter_artifacts, ArtifactRecord, ArtifactSet, PathExpression};
//!
//! let artifacts: ArtifactSet = vec![
//!     ArtifactRecord::new("org.example", "core", "1.0").with_file("/repo/core-1.0.jar"),
//!     ArtifactRecord::new("org.example", "testkit", "1.0").with_scope("test"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let compile = filter_artifacts(&artifacts, Some("compile"), None);
//! assert_eq!(compile.len(), 1);
//!
//! let path = PathExpression::from_artifacts(compile.iter()).unwrap();
//! assert_eq!(path.to_string(), "/repo/core-1.0.jar");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod filter;
mod path;
mod repository;

pub use artifact::{ArtifactRecord, ArtifactSet, UnresolvedArtifactError};
pub use filter::{filter_artifacts, AndFilter, ArtifactFilter, ScopeFilter, TypeFilter};
pub use path::{compose_artifact_path, compose_path, PathExpression, PATH_SEPARATOR};
pub use repository::LocalRepository;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
