//! `attachartifact`: attach a produced file to the live project

use super::{attribute, Task, TaskContext};
use crate::error::TaskError;
use crate::reference::{Reference, PROJECT_HANDLE_REF, PROJECT_HELPER_REF};
use antrun_config::ConfigurationNode;

/// Attaches `file` to the project through the registered project helper
///
/// Attributes: `file` (required), `classifier`, `type` (defaults to the file
/// extension), `mavenProjectRefId` (defaults to the live project handle).
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachArtifactTask;

impl Task for AttachArtifactTask {
    fn name(&self) -> &'static str {
        "attachartifact"
    }

    fn execute(&self, element: &ConfigurationNode, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let file = attribute(element, "file").ok_or(TaskError::MissingParameter("file"))?;
        let file = ctx.base_dir.join(file);
        if !file.exists() {
            return Err(TaskError::FileNotFound(file));
        }

        let project_ref = attribute(element, "mavenProjectRefId").unwrap_or(PROJECT_HANDLE_REF);
        let project = ctx
            .references
            .get(project_ref)
            .and_then(Reference::as_project_handle)
            .ok_or_else(|| TaskError::reference_not_found("project", project_ref))?;

        let kind = attribute(element, "type").map_or_else(
            || {
                file.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default()
            },
            str::to_string,
        );

        let helper = ctx
            .references
            .get(PROJECT_HELPER_REF)
            .and_then(Reference::as_project_helper)
            .ok_or_else(|| TaskError::reference_not_found("project helper", PROJECT_HELPER_REF))?;

        tracing::debug!("Attaching {} as an attached artifact", file.display());
        helper.attach_artifact(project, &kind, attribute(element, "classifier"), &file)?;
        Ok(())
    }
}
