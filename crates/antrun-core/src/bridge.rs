//! Property bridge
//!
//! Moves properties between the host project and the runner.
//!
//! The two directions resolve collisions differently:
//! - export (host to runner) always overwrites runner properties
//! - import (runner to host) never overwrites a host property; colliding
//!   keys are skipped and reported
//!
//! After a run the host is authoritative.

use crate::project::Project;
use crate::properties::PropertySpace;
use antrun_artifact::{LocalRepository, UnresolvedArtifactError, PATH_SEPARATOR};
use std::path::Path;

/// Property naming the project descriptor for scripts run in place
pub const ANT_FILE_PROPERTY: &str = "ant.file";

/// Default name of the aggregate dependency versions property
pub const DEFAULT_VERSIONS_PROPERTY: &str = "maven.project.dependencies.versions";

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Keys copied into the host
    pub imported: Vec<String>,
    /// Keys left alone because the host already defined them
    pub skipped: Vec<String>,
}

/// Two-way property synchronization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBridge {
    prefix: String,
    versions_property: String,
    import_enabled: bool,
}

impl Default for PropertyBridge {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            versions_property: DEFAULT_VERSIONS_PROPERTY.to_string(),
            import_enabled: false,
        }
    }
}

impl PropertyBridge {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for derived and per-dependency properties
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_versions_property(mut self, name: impl Into<String>) -> Self {
        self.versions_property = name.into();
        self
    }

    /// Whether [`PropertyBridge::import`] copies anything
    #[inline]
    #[must_use]
    pub fn with_import(mut self, enabled: bool) -> Self {
        self.import_enabled = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Copy host properties into the runner and set derived properties
    ///
    /// Every key of the project's base properties or of `user_properties`
    /// is set to the user value if present, else the base value. Then come
    /// `ant.file`, the project properties under the prefix, one property per
    /// dependency keyed by its conflict id, and the aggregate versions
    /// property. Existing runner values are always overwritten.
    ///
    /// All values are computed before the first one is written.
    ///
    /// Returns the number of properties written.
    ///
    /// # Errors
    /// Returns [`UnresolvedArtifactError`] if a dependency has no resolved
    /// file; `runner` is untouched in that case.
    pub fn export(
        &self,
        project: &Project,
        user_properties: &PropertySpace,
        local_repository: &LocalRepository,
        runner: &mut PropertySpace,
    ) -> Result<usize, UnresolvedArtifactError> {
        let dependencies = project
            .artifacts
            .iter()
            .map(|a| {
                a.resolved_file()
                    .map(|file| (self.prefixed(&a.conflict_id()), display(file)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut staged: Vec<(String, String)> = Vec::new();

        let user_only = user_properties.keys().filter(|k| !project.properties.contains(k));
        for key in project.properties.keys().chain(user_only) {
            let value = user_properties
                .get(key)
                .or_else(|| project.properties.get(key))
                .unwrap_or_default();
            staged.push((key.to_string(), value.to_string()));
        }

        staged.push((ANT_FILE_PROPERTY.to_string(), display(&absolute(&project.file))));

        tracing::debug!("Setting properties with prefix: {}", self.prefix);
        staged.push((self.prefixed("project.groupId"), project.group_id.clone()));
        staged.push((self.prefixed("project.artifactId"), project.artifact_id.clone()));
        staged.push((self.prefixed("project.name"), project.name.clone()));
        if let Some(description) = &project.description {
            staged.push((self.prefixed("project.description"), description.clone()));
        }
        staged.push((self.prefixed("project.version"), project.version.clone()));
        staged.push((self.prefixed("project.packaging"), project.packaging.clone()));
        let build = &project.build;
        for (suffix, dir) in [
            ("project.build.directory", &build.directory),
            ("project.build.outputDirectory", &build.output_directory),
            ("project.build.testOutputDirectory", &build.test_output_directory),
            ("project.build.sourceDirectory", &build.source_directory),
            ("project.build.testSourceDirectory", &build.test_source_directory),
        ] {
            staged.push((self.prefixed(suffix), display(dir)));
        }
        staged.push((self.prefixed("localRepository"), local_repository.to_string()));
        staged.push((
            self.prefixed("settings.localRepository"),
            display(local_repository.basedir()),
        ));

        staged.extend(dependencies);

        let versions: String = project
            .artifacts
            .iter()
            .map(|a| format!("{}{PATH_SEPARATOR}", a.version))
            .collect();
        staged.push((self.versions_property.clone(), versions));

        let count = staged.len();
        runner.extend(staged);
        Ok(count)
    }

    /// Copy runner properties into the host without overwriting
    ///
    /// Returns `None` when import is disabled.
    pub fn import(&self, runner: &PropertySpace, host: &mut PropertySpace) -> Option<ImportReport> {
        if !self.import_enabled {
            return None;
        }

        tracing::debug!("Propagating runner properties to project properties");
        let mut report = ImportReport::default();
        for (key, value) in runner.iter() {
            if let Some(existing) = host.get(key) {
                tracing::debug!(
                    "Runner property '{}={}' clashes with an existing project property, skipping",
                    key,
                    existing
                );
                report.skipped.push(key.to_string());
                continue;
            }
            host.set(key, value);
            report.imported.push(key.to_string());
        }
        Some(report)
    }

    fn prefixed(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Absolute form of a path; relative paths are resolved against the working directory
pub(crate) fn absolute(path: &Path) -> std::path::PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use antrun_artifact::ArtifactRecord;
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        Project::new("org.example", "demo", "1.0", "/w")
            .with_name("Demo")
            .with_property("shared", "base")
            .with_property("base.only", "b")
            .with_artifact(ArtifactRecord::new("org.lib", "one", "1.1").with_file("/r/one.jar"))
            .with_artifact(
                ArtifactRecord::new("org.lib", "two", "2.2")
                    .with_classifier("tests")
                    .with_file("/r/two.jar"),
            )
    }

    fn repo() -> LocalRepository {
        LocalRepository::new("/home/u/.m2/repository")
    }

    #[test]
    fn export_sets_generic_and_derived_properties() {
        let user: PropertySpace = [("shared", "user"), ("user.only", "u")].into_iter().collect();
        let mut runner = PropertySpace::new();
        PropertyBridge::new()
            .export(&project(), &user, &repo(), &mut runner)
            .unwrap();

        assert_eq!(runner.get("shared"), Some("user"));
        assert_eq!(runner.get("base.only"), Some("b"));
        assert_eq!(runner.get("user.only"), Some("u"));
        assert_eq!(runner.get("ant.file"), Some("/w/pom.xml"));
        assert_eq!(runner.get("project.groupId"), Some("org.example"));
        assert_eq!(runner.get("project.name"), Some("Demo"));
        assert_eq!(runner.get("project.packaging"), Some("jar"));
        assert_eq!(runner.get("project.build.directory"), Some("/w/target"));
        assert_eq!(
            runner.get("project.build.testOutputDirectory"),
            Some("/w/target/test-classes")
        );
        assert_eq!(
            runner.get("settings.localRepository"),
            Some("/home/u/.m2/repository")
        );
        assert_eq!(
            runner.get("localRepository"),
            Some("id: local, url: file:///home/u/.m2/repository, layout: default")
        );
        assert_eq!(runner.get("org.lib:one:jar"), Some("/r/one.jar"));
        assert_eq!(runner.get("org.lib:two:jar:tests"), Some("/r/two.jar"));
        assert_eq!(
            runner.get(DEFAULT_VERSIONS_PROPERTY),
            Some(format!("1.1{PATH_SEPARATOR}2.2{PATH_SEPARATOR}").as_str())
        );
        assert!(!runner.contains("project.description"));
    }

    #[test]
    fn export_overwrites_runner_values() {
        let mut runner: PropertySpace = [("shared", "runner"), ("project.version", "0")]
            .into_iter()
            .collect();
        PropertyBridge::new()
            .export(&project(), &PropertySpace::new(), &repo(), &mut runner)
            .unwrap();
        assert_eq!(runner.get("shared"), Some("base"));
        assert_eq!(runner.get("project.version"), Some("1.0"));
    }

    #[test]
    fn export_uses_prefix_and_description() {
        let mut runner = PropertySpace::new();
        let project = project().with_description("A demo");
        PropertyBridge::new()
            .with_prefix("mvn.")
            .with_versions_property("deps.versions")
            .export(&project, &PropertySpace::new(), &repo(), &mut runner)
            .unwrap();

        assert_eq!(runner.get("mvn.project.description"), Some("A demo"));
        assert_eq!(runner.get("mvn.project.artifactId"), Some("demo"));
        assert_eq!(runner.get("mvn.org.lib:one:jar"), Some("/r/one.jar"));
        assert!(runner.contains("deps.versions"));
        assert!(!runner.contains("project.artifactId"));
        // generic properties and ant.file are never prefixed
        assert_eq!(runner.get("shared"), Some("base"));
        assert!(runner.contains("ant.file"));
    }

    #[test]
    fn export_with_unresolved_dependency_commits_nothing() {
        let project = project().with_artifact(ArtifactRecord::new("org.lib", "ghost", "9"));
        let mut runner: PropertySpace = [("keep", "me")].into_iter().collect();
        let err = PropertyBridge::new()
            .export(&project, &PropertySpace::new(), &repo(), &mut runner)
            .unwrap_err();

        assert_eq!(err.artifact, "org.lib:ghost:jar:9");
        assert_eq!(runner.len(), 1);
    }

    #[test]
    fn export_without_dependencies() {
        let project = Project::new("g", "a", "1", "/w");
        let mut runner = PropertySpace::new();
        PropertyBridge::new()
            .export(&project, &PropertySpace::new(), &repo(), &mut runner)
            .unwrap();
        assert_eq!(runner.get(DEFAULT_VERSIONS_PROPERTY), Some(""));
        assert!(!runner.keys().any(|k| k.starts_with("g:")));
    }

    #[test]
    fn import_disabled_is_noop() {
        let runner: PropertySpace = [("new", "x")].into_iter().collect();
        let mut host = PropertySpace::new();
        assert!(PropertyBridge::new().import(&runner, &mut host).is_none());
        assert!(host.is_empty());
    }

    #[test]
    fn import_skips_collisions() {
        let runner: PropertySpace = [("new", "x"), ("shared", "runner")].into_iter().collect();
        let mut host: PropertySpace = [("shared", "host")].into_iter().collect();
        let report = PropertyBridge::new()
            .with_import(true)
            .import(&runner, &mut host)
            .unwrap();

        assert_eq!(host.get("new"), Some("x"));
        assert_eq!(host.get("shared"), Some("host"));
        assert_eq!(report.imported, vec!["new".to_string()]);
        assert_eq!(report.skipped, vec!["shared".to_string()]);
    }
}
