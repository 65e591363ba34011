//! Host project model
//!
//! The subset of the build tool's project and session the bridge reads and
//! writes: coordinates, build layout, properties, resolved artifacts and
//! classpath elements.

use crate::error::TaskError;
use crate::properties::PropertySpace;
use antrun_artifact::{ArtifactRecord, ArtifactSet, LocalRepository};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build directories of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildLayout {
    /// Build output root (`target`)
    pub directory: PathBuf,
    pub output_directory: PathBuf,
    pub test_output_directory: PathBuf,
    pub source_directory: PathBuf,
    pub test_source_directory: PathBuf,
}

impl BuildLayout {
    /// Conventional layout under a project base directory
    #[must_use]
    pub fn under(basedir: &Path) -> Self {
        let directory = basedir.join("target");
        Self {
            output_directory: directory.join("classes"),
            test_output_directory: directory.join("test-classes"),
            source_directory: basedir.join("src").join("main").join("java"),
            test_source_directory: basedir.join("src").join("test").join("java"),
            directory,
        }
    }
}

/// The host's project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub name: String,
    pub packaging: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Project base directory
    pub basedir: PathBuf,
    /// Project descriptor file
    pub file: PathBuf,
    pub build: BuildLayout,
    /// Base property space
    #[serde(default)]
    pub properties: PropertySpace,
    /// Full resolved dependency set
    #[serde(default)]
    pub artifacts: ArtifactSet,
    #[serde(default)]
    pub compile_classpath_elements: Vec<PathBuf>,
    #[serde(default)]
    pub runtime_classpath_elements: Vec<PathBuf>,
    #[serde(default)]
    pub test_classpath_elements: Vec<PathBuf>,
    /// Secondary artifacts attached during the build
    #[serde(default)]
    pub attached_artifacts: Vec<ArtifactRecord>,
}

impl Project {
    /// Create a `jar` project rooted at `basedir` with the conventional layout
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        basedir: impl Into<PathBuf>,
    ) -> Self {
        let artifact_id = artifact_id.into();
        let basedir = basedir.into();
        Self {
            group_id: group_id.into(),
            name: artifact_id.clone(),
            artifact_id,
            version: version.into(),
            packaging: "jar".to_string(),
            description: None,
            file: basedir.join("pom.xml"),
            build: BuildLayout::under(&basedir),
            basedir,
            properties: PropertySpace::new(),
            artifacts: ArtifactSet::new(),
            compile_classpath_elements: Vec::new(),
            runtime_classpath_elements: Vec::new(),
            test_classpath_elements: Vec::new(),
            attached_artifacts: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.set(key, value);
        self
    }

    /// Add a resolved dependency; classpath elements are not derived from it
    #[inline]
    #[must_use]
    pub fn with_artifact(mut self, artifact: ArtifactRecord) -> Self {
        self.artifacts.insert(artifact);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_compile_classpath(mut self, elements: Vec<PathBuf>) -> Self {
        self.compile_classpath_elements = elements;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_runtime_classpath(mut self, elements: Vec<PathBuf>) -> Self {
        self.runtime_classpath_elements = elements;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_test_classpath(mut self, elements: Vec<PathBuf>) -> Self {
        self.test_classpath_elements = elements;
        self
    }

    /// Attach a secondary artifact, replacing one with the same conflict id
    pub fn attach(&mut self, artifact: ArtifactRecord) {
        let id = artifact.conflict_id();
        match self
            .attached_artifacts
            .iter_mut()
            .find(|a| a.conflict_id() == id)
        {
            Some(existing) => *existing = artifact,
            None => self.attached_artifacts.push(artifact),
        }
    }
}

/// Live, shared handle to the host project
///
/// Clones share the same project: a mutation through any clone is visible
/// to the host and to every other clone.
#[derive(Debug, Clone)]
pub struct ProjectHandle(Arc<RwLock<Project>>);

impl ProjectHandle {
    #[must_use]
    pub fn new(project: Project) -> Self {
        Self(Arc::new(RwLock::new(project)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Project> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Project> {
        self.0.write()
    }

    /// Frozen copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> Arc<Project> {
        Arc::new(self.0.read().clone())
    }

    /// Whether two handles point at the same project
    #[inline]
    #[must_use]
    pub fn same_project(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Project> for ProjectHandle {
    fn from(project: Project) -> Self {
        Self::new(project)
    }
}

/// Per-build session state supplied alongside the project
#[derive(Debug, Clone)]
pub struct BuildSession {
    pub project: ProjectHandle,
    /// Session-level overrides of project properties
    pub user_properties: PropertySpace,
    pub local_repository: LocalRepository,
    /// Resolved dependencies of the bridge itself
    pub plugin_artifacts: ArtifactSet,
}

impl BuildSession {
    #[must_use]
    pub fn new(project: impl Into<ProjectHandle>, local_repository: LocalRepository) -> Self {
        Self {
            project: project.into(),
            user_properties: PropertySpace::new(),
            local_repository,
            plugin_artifacts: ArtifactSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_user_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_properties.set(key, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_plugin_artifact(mut self, artifact: ArtifactRecord) -> Self {
        self.plugin_artifacts.insert(artifact);
        self
    }
}

/// Service that attaches secondary artifacts to a project
pub trait ProjectHelper: Debug + Send + Sync {
    /// Attach `file` to the project as an artifact of type `kind`
    ///
    /// # Errors
    /// Implementation-defined
    fn attach_artifact(
        &self,
        project: &ProjectHandle,
        kind: &str,
        classifier: Option<&str>,
        file: &Path,
    ) -> Result<ArtifactRecord, TaskError>;
}

/// Attaches artifacts under the project's own coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachingProjectHelper;

impl ProjectHelper for AttachingProjectHelper {
    fn attach_artifact(
        &self,
        project: &ProjectHandle,
        kind: &str,
        classifier: Option<&str>,
        file: &Path,
    ) -> Result<ArtifactRecord, TaskError> {
        let mut project = project.write();
        let mut artifact = ArtifactRecord::new(
            project.group_id.clone(),
            project.artifact_id.clone(),
            project.version.clone(),
        )
        .with_type(kind)
        .with_file(file);
        if let Some(classifier) = classifier {
            artifact = artifact.with_classifier(classifier);
        }
        project.attach(artifact.clone());
        tracing::debug!("Attached {} to {}", artifact, project.artifact_id);
        Ok(artifact)
    }
}
