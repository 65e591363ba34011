//! Bridge orchestrator
//!
//! Drives one run of the bridge:
//! - Validates configuration and handles the skip and no-target exits
//! - Serializes the target tree to a script file
//! - Registers the build context with the runner and exports properties
//! - Executes the target
//! - Imports properties back into the project
//!
//! Runner build failures are tolerated when `failOnError` is off; every other
//! failure is fatal.

use crate::bridge::{ImportReport, PropertyBridge};
use crate::config::{RunConfig, DEFAULT_TARGET_NAME};
use crate::diagnostics::describe_failure;
use crate::error::{BridgeError, BridgeResult};
use crate::project::{AttachingProjectHelper, BuildSession, Project, ProjectHelper};
use crate::reference::{
    Reference, COMPILE_CLASSPATH_REF, DEPENDENCY_CLASSPATH_REF, LOCAL_REPOSITORY_REF,
    PLUGIN_CLASSPATH_REF, PROJECT_HANDLE_REF, PROJECT_HELPER_REF, PROJECT_REF,
    RUNTIME_CLASSPATH_REF, TEST_CLASSPATH_REF,
};
use crate::runner::{MessageLevel, RunnerError, ScriptRunner};
use crate::tasks::ANTLIB_RESOURCE;
use antrun_artifact::PathExpression;
use antrun_config::{
    resolve_target_name, ConfigurationNode, ScriptWriter, NAME_ATTRIBUTE, TASK_URI,
};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Position of a run in the bridge state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    ResolveConfig,
    WriteScript,
    RegisterContext,
    InvokeRunner,
    ExportBack,
    /// Terminal: skipped by configuration
    Skipped,
    /// Terminal: no target configured
    NoTarget,
    /// Terminal: completed
    Done,
    /// Terminal: the run failed, tolerated or not
    Failed,
}

impl Stage {
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Skipped | Self::NoTarget | Self::Done | Self::Failed)
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::ResolveConfig => "resolve-config",
            Self::WriteScript => "write-script",
            Self::RegisterContext => "register-context",
            Self::InvokeRunner => "invoke-runner",
            Self::ExportBack => "export-back",
            Self::Skipped => "skipped",
            Self::NoTarget => "no-target",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a run ended without a fatal error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped,
    NoTarget,
    /// Target executed; `import` is `None` when property import is disabled
    Completed {
        script: PathBuf,
        import: Option<ImportReport>,
    },
    /// The script failed but failures are tolerated; nothing was imported
    Tolerated { script: PathBuf, message: String },
}

/// Sequences one bridge run
#[derive(Debug)]
pub struct BridgeOrchestrator {
    config: RunConfig,
    helper: Arc<dyn ProjectHelper>,
    stage: Stage,
}

impl BridgeOrchestrator {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            helper: Arc::new(AttachingProjectHelper),
            stage: Stage::Init,
        }
    }

    /// Use a different artifact attachment service
    #[inline]
    #[must_use]
    pub fn with_helper(mut self, helper: Arc<dyn ProjectHelper>) -> Self {
        self.helper = helper;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Stage reached by the last run
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the configured target against `runner`
    ///
    /// # Errors
    /// - `BridgeError::Configuration` for removed parameters
    /// - `BridgeError::Script` / `BridgeError::Io` if the script cannot be written
    /// - `BridgeError::UnresolvedArtifact` if a classpath or property needs an unresolved artifact
    /// - `BridgeError::RunnerExecution` if the script fails and `failOnError` is set
    /// - `BridgeError::Unexpected` for internal runner failures
    pub fn run<R>(&mut self, runner: &mut R, session: &BuildSession) -> BridgeResult<RunOutcome>
    where
        R: ScriptRunner + ?Sized,
    {
        self.advance(Stage::Init);
        if let Err(err) = self.config.check_removed_parameters() {
            self.advance(Stage::Failed);
            return Err(err);
        }
        if self.config.skip {
            tracing::info!("Skipping execution");
            self.advance(Stage::Skipped);
            return Ok(RunOutcome::Skipped);
        }
        let Some(mut target) = self.config.target.clone() else {
            tracing::info!("No target defined - SKIPPED");
            self.advance(Stage::NoTarget);
            return Ok(RunOutcome::NoTarget);
        };

        self.advance(Stage::ResolveConfig);
        let target_name = resolve_target_name(&target, DEFAULT_TARGET_NAME);
        target.set_attribute(NAME_ATTRIBUTE, target_name.as_str());
        let prefix = self.config.task_prefix(&target);
        let project = session.project.snapshot();
        let script = self.config.script_path(&project.build.directory, &target_name);

        let result = self.execute(
            runner,
            session,
            &project,
            &target,
            &target_name,
            prefix.as_deref(),
            &script,
        );
        match result {
            Ok(import) => {
                self.advance(Stage::Done);
                Ok(RunOutcome::Completed { script, import })
            }
            Err(err) => {
                self.advance(Stage::Failed);
                match err {
                    BridgeError::RunnerExecution { message, .. } if !self.config.fail_on_error => {
                        tracing::info!("{}", message);
                        Ok(RunOutcome::Tolerated { script, message })
                    }
                    err => Err(err),
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn execute<R>(
        &mut self,
        runner: &mut R,
        session: &BuildSession,
        project: &Arc<Project>,
        target: &ConfigurationNode,
        target_name: &str,
        prefix: Option<&str>,
        script: &Path,
    ) -> BridgeResult<Option<ImportReport>>
    where
        R: ScriptRunner + ?Sized,
    {
        self.advance(Stage::WriteScript);
        if let Some(parent) = script.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BridgeError::io_error(parent, e))?;
        }
        ScriptWriter::new().write(target, script, prefix.unwrap_or_default(), target_name)?;
        runner.set_message_level(MessageLevel::current());
        runner
            .configure(script, target_name)
            .map_err(|e| self.runner_error(e))?;

        self.advance(Stage::RegisterContext);
        runner.set_base_dir(&project.basedir);
        self.register_references(runner, session, project)?;
        tracing::debug!("Initializing custom task vocabulary");
        runner
            .define_vocabulary(ANTLIB_RESOURCE, prefix.map(|_| TASK_URI))
            .map_err(|e| self.runner_error(e))?;
        let bridge = PropertyBridge::new()
            .with_prefix(self.config.property_prefix.as_str())
            .with_versions_property(self.config.versions_property_name.as_str())
            .with_import(self.config.export_ant_properties);
        bridge.export(
            project,
            &session.user_properties,
            &session.local_repository,
            runner.properties_mut(),
        )?;

        self.advance(Stage::InvokeRunner);
        tracing::info!("Executing tasks");
        runner
            .execute_target(target_name)
            .map_err(|e| self.runner_error(e))?;
        tracing::info!("Executed tasks");

        self.advance(Stage::ExportBack);
        let mut host = session.project.write();
        let report = bridge.import(runner.properties(), &mut host.properties);
        if let Some(report) = &report {
            tracing::debug!(
                "Imported {} properties, skipped {}",
                report.imported.len(),
                report.skipped.len()
            );
        }
        Ok(report)
    }

    fn register_references<R>(
        &self,
        runner: &mut R,
        session: &BuildSession,
        project: &Arc<Project>,
    ) -> BridgeResult<()>
    where
        R: ScriptRunner + ?Sized,
    {
        let plugin = PathExpression::from_artifacts(session.plugin_artifacts.iter())?;
        let compile = PathExpression::from_files(&project.compile_classpath_elements);
        let runtime = PathExpression::from_files(&project.runtime_classpath_elements);
        let test = PathExpression::from_files(&project.test_classpath_elements);

        let references = runner.references_mut();
        references.add(DEPENDENCY_CLASSPATH_REF, Reference::Path(compile.clone()));
        references.add(COMPILE_CLASSPATH_REF, Reference::Path(compile));
        references.add(RUNTIME_CLASSPATH_REF, Reference::Path(runtime));
        references.add(TEST_CLASSPATH_REF, Reference::Path(test));
        references.add(PLUGIN_CLASSPATH_REF, Reference::Path(plugin));
        references.add(PROJECT_REF, Reference::Project(Arc::clone(project)));
        references.add(
            PROJECT_HANDLE_REF,
            Reference::ProjectHandle(session.project.clone()),
        );
        references.add(
            PROJECT_HELPER_REF,
            Reference::ProjectHelper(Arc::clone(&self.helper)),
        );
        references.add(
            LOCAL_REPOSITORY_REF,
            Reference::LocalRepository(session.local_repository.clone()),
        );
        Ok(())
    }

    fn runner_error(&self, err: RunnerError) -> BridgeError {
        match err {
            RunnerError::Build(failure) => BridgeError::RunnerExecution {
                message: describe_failure(&failure),
                failure,
            },
            RunnerError::Internal(message) => BridgeError::Unexpected {
                stage: self.stage,
                message,
            },
        }
    }

    fn advance(&mut self, stage: Stage) {
        tracing::trace!("Bridge stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }
}
