//! `dependencyfilesets`: expose project dependencies as filesets

use super::{attribute, Task, TaskContext};
use crate::error::TaskError;
use crate::reference::{FileSet, Reference, LOCAL_REPOSITORY_REF, PROJECT_REF};
use antrun_artifact::filter_artifacts;
use antrun_config::ConfigurationNode;

/// Default id of the aggregate fileset
pub const DEFAULT_PROJECT_DEPENDENCIES_ID: &str = "maven.project.dependencies";

/// Registers one fileset per selected dependency and one aggregate fileset
///
/// Attributes: `mavenProjectId` (defaults to the project snapshot),
/// `prefix`, `scopes`, `types`, `projectDependenciesId`.
///
/// Each selected artifact gets a single-file fileset under
/// `<prefix><conflictId>`. The aggregate, under
/// `<prefix><projectDependenciesId>`, is rooted at the local repository with
/// one include per artifact; an empty selection includes `.` and excludes
/// `**` so nothing in the repository is scanned.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyFilesetsTask;

impl Task for DependencyFilesetsTask {
    fn name(&self) -> &'static str {
        "dependencyfilesets"
    }

    fn execute(&self, element: &ConfigurationNode, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let project_id = attribute(element, "mavenProjectId").unwrap_or(PROJECT_REF);
        let artifacts = match ctx.references.get(project_id) {
            Some(Reference::Project(project)) => project.artifacts.clone(),
            Some(Reference::ProjectHandle(handle)) => handle.read().artifacts.clone(),
            _ => return Err(TaskError::reference_not_found("project", project_id)),
        };
        let repository = ctx
            .references
            .get(LOCAL_REPOSITORY_REF)
            .and_then(Reference::as_local_repository)
            .ok_or_else(|| TaskError::reference_not_found("local repository", LOCAL_REPOSITORY_REF))?
            .clone();

        let selected = filter_artifacts(
            &artifacts,
            attribute(element, "scopes"),
            attribute(element, "types"),
        );
        let prefix = element.attribute("prefix").unwrap_or_default();
        let aggregate_id = format!(
            "{prefix}{}",
            attribute(element, "projectDependenciesId").unwrap_or(DEFAULT_PROJECT_DEPENDENCIES_ID)
        );

        let mut aggregate = FileSet::in_dir(repository.basedir());
        if selected.is_empty() {
            aggregate.add_include(".");
            aggregate.add_exclude("**");
        }
        let mut singles = Vec::with_capacity(selected.len());
        for artifact in &selected {
            aggregate.add_include(repository.path_of(artifact));
            singles.push((
                format!("{prefix}{}", artifact.conflict_id()),
                FileSet::single(artifact.resolved_file()?),
            ));
        }

        tracing::debug!(
            "Registering {} dependency filesets under '{}'",
            singles.len(),
            aggregate_id
        );
        for (id, set) in singles {
            ctx.references.add(id, Reference::FileSet(set));
        }
        ctx.references.add(aggregate_id, Reference::FileSet(aggregate));
        Ok(())
    }
}
