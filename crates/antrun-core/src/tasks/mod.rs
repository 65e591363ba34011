//! Custom task vocabulary
//!
//! Tasks the bridge contributes to the runner. A runner loads them with
//! [`TaskVocabulary::load`] when asked to define the vocabulary resource
//! and dispatches matching script elements through [`TaskVocabulary::resolve`].

mod attach_artifact;
mod dependency_filesets;

pub use attach_artifact::AttachArtifactTask;
pub use dependency_filesets::{DependencyFilesetsTask, DEFAULT_PROJECT_DEPENDENCIES_ID};

use crate::error::TaskError;
use crate::reference::ReferenceTable;
use antrun_config::ConfigurationNode;
use indexmap::IndexMap;
use std::path::Path;

/// Resource identifier of the custom task vocabulary
pub const ANTLIB_RESOURCE: &str = "org/apache/maven/ant/tasks/antlib.xml";

/// What a task sees of the runner while it executes
#[derive(Debug)]
pub struct TaskContext<'a> {
    /// Base directory relative file attributes resolve against
    pub base_dir: &'a Path,
    pub references: &'a mut ReferenceTable,
}

/// A task runnable from a script element
pub trait Task: std::fmt::Debug + Send + Sync {
    /// Local element name
    fn name(&self) -> &'static str;

    /// Run with the attributes of `element`, already property-expanded
    ///
    /// # Errors
    /// Task-specific; see each task
    fn execute(&self, element: &ConfigurationNode, ctx: &mut TaskContext<'_>) -> Result<(), TaskError>;
}

/// Tasks defined by one vocabulary resource
#[derive(Debug)]
pub struct TaskVocabulary {
    uri: Option<String>,
    tasks: IndexMap<&'static str, Box<dyn Task>>,
}

impl TaskVocabulary {
    /// Load the vocabulary named by `resource`
    ///
    /// With a `uri`, its tasks are addressed through a namespace prefix bound
    /// to that URI; without one they are addressed by bare name.
    ///
    /// # Errors
    /// `TaskError::UnknownResource` for any resource other than [`ANTLIB_RESOURCE`]
    pub fn load(resource: &str, uri: Option<&str>) -> Result<Self, TaskError> {
        if resource != ANTLIB_RESOURCE {
            return Err(TaskError::UnknownResource(resource.to_string()));
        }
        let mut vocabulary = Self {
            uri: uri.map(str::to_string),
            tasks: IndexMap::new(),
        };
        vocabulary.register(Box::new(AttachArtifactTask));
        vocabulary.register(Box::new(DependencyFilesetsTask));
        tracing::debug!(
            "Initialized task vocabulary {} ({} tasks)",
            uri.unwrap_or("<default namespace>"),
            vocabulary.tasks.len()
        );
        Ok(vocabulary)
    }

    fn register(&mut self, task: Box<dyn Task>) {
        self.tasks.insert(task.name(), task);
    }

    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Task names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tasks.keys().copied()
    }

    /// Task for an element name appearing in the script rooted at `root`
    ///
    /// A prefixed name matches when the root binds that prefix to this
    /// vocabulary's URI; a bare name matches only a vocabulary without URI.
    #[must_use]
    pub fn resolve(&self, root: &ConfigurationNode, element: &str) -> Option<&dyn Task> {
        let local = match (element.split_once(':'), self.uri.as_deref()) {
            (Some((prefix, local)), Some(uri)) => {
                let bound = root.attribute(&format!("xmlns:{prefix}"))?;
                (bound == uri).then_some(local)?
            }
            (None, None) => element,
            _ => return None,
        };
        self.tasks.get(local).map(|task| &**task)
    }
}

/// Attribute value, treating an empty string as absent
pub(crate) fn attribute<'a>(element: &'a ConfigurationNode, key: &str) -> Option<&'a str> {
    element.attribute(key).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use antrun_config::TASK_URI;

    #[test]
    fn load_known_resource() {
        let vocabulary = TaskVocabulary::load(ANTLIB_RESOURCE, None).unwrap();
        assert_eq!(
            vocabulary.names().collect::<Vec<_>>(),
            vec!["attachartifact", "dependencyfilesets"]
        );
    }

    #[test]
    fn unknown_resource_rejected() {
        assert!(matches!(
            TaskVocabulary::load("com/acme/antlib.xml", None),
            Err(TaskError::UnknownResource(_))
        ));
    }

    #[test]
    fn resolve_with_namespace() {
        let vocabulary = TaskVocabulary::load(ANTLIB_RESOURCE, Some(TASK_URI)).unwrap();
        let root = ConfigurationNode::new("main").with_attribute("xmlns:mvn", TASK_URI);

        assert_eq!(
            vocabulary.resolve(&root, "mvn:attachartifact").map(|t| t.name()),
            Some("attachartifact")
        );
        assert!(vocabulary.resolve(&root, "attachartifact").is_none());
        assert!(vocabulary.resolve(&root, "other:attachartifact").is_none());
        assert!(vocabulary.resolve(&root, "mvn:unknown").is_none());
    }

    #[test]
    fn resolve_without_namespace() {
        let vocabulary = TaskVocabulary::load(ANTLIB_RESOURCE, None).unwrap();
        let root = ConfigurationNode::new("main");
        assert!(vocabulary.resolve(&root, "dependencyfilesets").is_some());
        assert!(vocabulary.resolve(&root, "mvn:dependencyfilesets").is_none());
    }
}
