//! Testing utilities for the antrun workspace
//!
//! Shared fixtures, a scripted runner, and tracing setup for tests.

#![allow(missing_docs)]

mod runner;

pub use runner::ScriptedRunner;

use antrun_artifact::{ArtifactRecord, LocalRepository};
use antrun_config::ConfigurationNode;
use antrun_core::{BuildSession, Project};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Temporary project directory with a local repository beside it
#[derive(Debug)]
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn project_dir(&self) -> PathBuf {
        self.path().join("project")
    }

    pub fn repository(&self) -> LocalRepository {
        LocalRepository::new(self.path().join("repository"))
    }

    /// Write `contents` to `relative` under the project directory
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.project_dir().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Artifact whose file exists in the local repository
    pub fn resolved_artifact(&self, group_id: &str, artifact_id: &str, version: &str) -> ArtifactRecord {
        let artifact = ArtifactRecord::new(group_id, artifact_id, version);
        let repository = self.repository();
        let file = repository.basedir().join(repository.path_of(&artifact));
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, b"jar").unwrap();
        artifact.with_file(file)
    }

    /// `org.example:demo:1.0.0` with one compile and one test dependency
    pub fn project(&self) -> Project {
        let basedir = self.project_dir();
        std::fs::create_dir_all(&basedir).unwrap();
        let classes = basedir.join("target/classes");
        Project::new("org.example", "demo", "1.0.0", &basedir)
            .with_description("Demo project")
            .with_property("encoding", "UTF-8")
            .with_artifact(self.resolved_artifact("org.lib", "core", "2.1"))
            .with_artifact(self.resolved_artifact("org.junit", "junit", "4.13").with_scope("test"))
            .with_compile_classpath(vec![classes.clone()])
            .with_runtime_classpath(vec![classes.clone()])
            .with_test_classpath(vec![basedir.join("target/test-classes"), classes])
    }

    pub fn session(&self) -> BuildSession {
        BuildSession::new(self.project(), self.repository())
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// `<target>` holding `children` in order
pub fn target(children: impl IntoIterator<Item = ConfigurationNode>) -> ConfigurationNode {
    children
        .into_iter()
        .fold(ConfigurationNode::new("target"), ConfigurationNode::with_child)
}

pub fn echo(message: &str) -> ConfigurationNode {
    ConfigurationNode::new("echo").with_attribute("message", message)
}

pub fn property(name: &str, value: &str) -> ConfigurationNode {
    ConfigurationNode::new("property")
        .with_attribute("name", name)
        .with_attribute("value", value)
}

pub fn fail(message: &str) -> ConfigurationNode {
    ConfigurationNode::new("fail").with_attribute("message", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use antrun_config::write_script;
    use antrun_core::{BuildFailure, RunnerError, ScriptRunner};

    fn configured(tree: &ConfigurationNode) -> (TestWorkspace, ScriptedRunner) {
        let workspace = TestWorkspace::new();
        let script = workspace.path().join("build-main.xml");
        write_script(tree, &script, "", "main").unwrap();
        let mut runner = ScriptedRunner::new();
        runner.configure(&script, "main").unwrap();
        (workspace, runner)
    }

    #[test]
    fn echo_expands_properties() {
        let (_ws, mut runner) = configured(&target([property("who", "world"), echo("hello ${who}")]));
        runner.execute_target("main").unwrap();
        assert_eq!(runner.output(), ["hello world"]);
    }

    #[test]
    fn properties_are_immutable() {
        let (_ws, mut runner) = configured(&target([property("p", "script")]));
        runner.properties_mut().set("p", "preset");
        runner.execute_target("main").unwrap();
        assert_eq!(runner.properties().get("p"), Some("preset"));
    }

    #[test]
    fn fail_reports_its_line() {
        let (_ws, mut runner) = configured(&target([echo("a"), fail("boom")]));
        let Err(RunnerError::Build(BuildFailure { message, location })) = runner.execute_target("main")
        else {
            panic!("expected a build failure");
        };
        assert_eq!(message, "boom");
        let location = location.unwrap();
        assert_eq!((location.line, location.column), (4, 3));
    }

    #[test]
    fn unknown_task_fails() {
        let (_ws, mut runner) = configured(&target([ConfigurationNode::new("javac")]));
        let err = runner.execute_target("main").unwrap_err();
        assert!(err.to_string().contains("failed to create task or type javac"));
    }

    #[test]
    fn unknown_target_fails() {
        let (_ws, mut runner) = configured(&ConfigurationNode::new("target"));
        assert!(matches!(runner.execute_target("other"), Err(RunnerError::Build(_))));
    }

    #[test]
    fn internal_failure() {
        let (_ws, runner) = configured(&ConfigurationNode::new("target"));
        let mut runner = runner.failing_internally("broken");
        assert!(matches!(runner.execute_target("main"), Err(RunnerError::Internal(_))));
    }
}
