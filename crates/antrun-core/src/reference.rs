//! Named-object table shared with the runner
//!
//! The bridge registers classpaths, the project, the attachment service and
//! the local repository here before the script runs; custom tasks read and
//! add entries while it runs.

use crate::project::{Project, ProjectHandle, ProjectHelper};
use antrun_artifact::{LocalRepository, PathExpression};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Deprecated alias of the compile classpath
pub const DEPENDENCY_CLASSPATH_REF: &str = "maven.dependency.classpath";
pub const COMPILE_CLASSPATH_REF: &str = "maven.compile.classpath";
pub const RUNTIME_CLASSPATH_REF: &str = "maven.runtime.classpath";
pub const TEST_CLASSPATH_REF: &str = "maven.test.classpath";
pub const PLUGIN_CLASSPATH_REF: &str = "maven.plugin.classpath";
/// Frozen project snapshot
pub const PROJECT_REF: &str = "maven.project";
/// Live project handle
pub const PROJECT_HANDLE_REF: &str = "maven.project.ref";
pub const PROJECT_HELPER_REF: &str = "maven.project.helper";
pub const LOCAL_REPOSITORY_REF: &str = "maven.local.repository";

/// Set of files: either one file or a base directory with include/exclude patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    dir: Option<PathBuf>,
    file: Option<PathBuf>,
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl FileSet {
    /// A set holding exactly one file
    #[must_use]
    pub fn single(file: impl Into<PathBuf>) -> Self {
        Self {
            dir: None,
            file: Some(file.into()),
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    /// A set rooted at `dir`, initially without patterns
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            file: None,
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn add_include(&mut self, pattern: impl Into<String>) {
        self.includes.push(pattern.into());
    }

    pub fn add_exclude(&mut self, pattern: impl Into<String>) {
        self.excludes.push(pattern.into());
    }

    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    #[must_use]
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }
}

/// An object registered with the runner
///
/// Two entries describe the project with different identity guarantees:
/// [`Reference::Project`] is a snapshot that every clone sees frozen, while
/// [`Reference::ProjectHandle`] is shared so changes made through it reach
/// the host.
#[derive(Debug, Clone)]
pub enum Reference {
    Path(PathExpression),
    Project(Arc<Project>),
    ProjectHandle(ProjectHandle),
    ProjectHelper(Arc<dyn ProjectHelper>),
    LocalRepository(LocalRepository),
    FileSet(FileSet),
}

impl Reference {
    /// Short name of the variant, for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Project(_) => "project",
            Self::ProjectHandle(_) => "project handle",
            Self::ProjectHelper(_) => "project helper",
            Self::LocalRepository(_) => "local repository",
            Self::FileSet(_) => "fileset",
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&PathExpression> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_project(&self) -> Option<&Arc<Project>> {
        match self {
            Self::Project(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_project_handle(&self) -> Option<&ProjectHandle> {
        match self {
            Self::ProjectHandle(h) => Some(h),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_project_helper(&self) -> Option<&Arc<dyn ProjectHelper>> {
        match self {
            Self::ProjectHelper(h) => Some(h),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_local_repository(&self) -> Option<&LocalRepository> {
        match self {
            Self::LocalRepository(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_file_set(&self) -> Option<&FileSet> {
        match self {
            Self::FileSet(f) => Some(f),
            _ => None,
        }
    }
}

/// Id-to-object table with overwrite semantics
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    entries: IndexMap<String, Reference>,
}

impl ReferenceTable {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object, returning the one it replaced
    pub fn add(&mut self, id: impl Into<String>, reference: Reference) -> Option<Reference> {
        let id = id.into();
        tracing::trace!("Adding reference {} ({})", id, reference.kind());
        self.entries.insert(id, reference)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Reference> {
        self.entries.get(id)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Reference> {
        self.entries.shift_remove(id)
    }

    /// Ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
