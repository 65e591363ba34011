//! In-memory script runner
//!
//! Interprets the top-level elements of a generated script: `echo`,
//! `property`, `fail` and the custom task vocabulary. Anything else fails
//! the way an unknown task would.

use antrun_config::{read_script, ConfigurationNode, ReadError};
use antrun_core::{
    BuildFailure, MessageLevel, PropertySpace, ReferenceTable, RunnerError, ScriptRunner,
    SourceLocation, TaskContext, TaskVocabulary,
};
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct LoadedScript {
    path: PathBuf,
    lines: Vec<String>,
    root: ConfigurationNode,
    target: String,
}

impl LoadedScript {
    /// Location of the `nth` top-level element called `name`
    fn locate(&self, name: &str, nth: usize) -> SourceLocation {
        let opening = format!("  <{name}");
        let line = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| {
                l.starts_with(&opening) && l[opening.len()..].starts_with([' ', '/', '>'])
            })
            .nth(nth)
            .map_or(0, |(i, _)| i + 1);
        SourceLocation::new(&self.path, line, 3)
    }
}

/// Scripted fake of the embedded runner
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    message_level: Option<MessageLevel>,
    base_dir: PathBuf,
    script: Option<LoadedScript>,
    vocabulary: Option<TaskVocabulary>,
    references: ReferenceTable,
    properties: PropertySpace,
    output: Vec<String>,
    internal_failure: Option<String>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner property present before the bridge exports anything
    #[must_use]
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.set(key, value);
        self
    }

    /// Make `execute_target` fail as a broken runner would
    #[must_use]
    pub fn failing_internally(mut self, message: &str) -> Self {
        self.internal_failure = Some(message.to_string());
        self
    }

    /// Messages printed by `echo`, in order
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    #[must_use]
    pub fn message_level(&self) -> Option<MessageLevel> {
        self.message_level
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[must_use]
    pub fn vocabulary(&self) -> Option<&TaskVocabulary> {
        self.vocabulary.as_ref()
    }

    fn run_element(
        &mut self,
        element: &ConfigurationNode,
        location: SourceLocation,
    ) -> Result<(), BuildFailure> {
        let mut expanded = element.clone();
        let attributes: Vec<(String, String)> = element
            .attributes()
            .map(|(k, v)| (k.to_string(), self.properties.expand(v)))
            .collect();
        for (key, value) in attributes {
            expanded.set_attribute(key, value);
        }
        if let Some(text) = element.text() {
            expanded.set_value(self.properties.expand(text));
        }

        match expanded.name() {
            "echo" => {
                let message = expanded
                    .attribute("message")
                    .or_else(|| expanded.text())
                    .unwrap_or_default()
                    .to_string();
                tracing::info!("[echo] {}", message);
                self.output.push(message);
                Ok(())
            }
            "property" => {
                let name = expanded.attribute("name").ok_or_else(|| {
                    BuildFailure::new("property name is required").with_location(location)
                })?;
                self.properties
                    .set_if_absent(name, expanded.attribute_or("value", ""));
                Ok(())
            }
            "fail" => Err(BuildFailure::new(
                expanded.attribute("message").or_else(|| expanded.text()).unwrap_or("No message"),
            )
            .with_location(location)),
            other => {
                let Some(script) = &self.script else {
                    return Err(BuildFailure::new("no script loaded"));
                };
                let task = self
                    .vocabulary
                    .as_ref()
                    .and_then(|v| v.resolve(&script.root, other))
                    .ok_or_else(|| {
                        BuildFailure::new(format!("problem: failed to create task or type {other}"))
                            .with_location(location.clone())
                    })?;
                let mut ctx = TaskContext {
                    base_dir: &self.base_dir,
                    references: &mut self.references,
                };
                task.execute(&expanded, &mut ctx)
                    .map_err(|e| BuildFailure::from(e).with_location(location))
            }
        }
    }
}

impl ScriptRunner for ScriptedRunner {
    fn set_message_level(&mut self, level: MessageLevel) {
        self.message_level = Some(level);
    }

    fn set_base_dir(&mut self, dir: &Path) {
        self.base_dir = dir.to_path_buf();
    }

    fn configure(&mut self, script: &Path, target: &str) -> Result<(), RunnerError> {
        let text = std::fs::read_to_string(script)
            .map_err(|e| BuildFailure::new(format!("cannot read {}: {e}", script.display())))?;
        let root = read_script(&text).map_err(|e| match e {
            ReadError::Syntax {
                line,
                column,
                message,
            } => BuildFailure::new(message).with_location(SourceLocation::new(script, line, column)),
            other => BuildFailure::new(other.to_string()),
        })?;
        self.script = Some(LoadedScript {
            path: script.to_path_buf(),
            lines: text.lines().map(str::to_string).collect(),
            root,
            target: target.to_string(),
        });
        Ok(())
    }

    fn define_vocabulary(&mut self, resource: &str, uri: Option<&str>) -> Result<(), RunnerError> {
        let vocabulary = TaskVocabulary::load(resource, uri).map_err(BuildFailure::from)?;
        self.vocabulary = Some(vocabulary);
        Ok(())
    }

    fn references(&self) -> &ReferenceTable {
        &self.references
    }

    fn references_mut(&mut self) -> &mut ReferenceTable {
        &mut self.references
    }

    fn properties(&self) -> &PropertySpace {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut PropertySpace {
        &mut self.properties
    }

    fn execute_target(&mut self, target: &str) -> Result<(), RunnerError> {
        if let Some(message) = &self.internal_failure {
            return Err(RunnerError::Internal(message.clone()));
        }
        let Some(script) = &self.script else {
            return Err(RunnerError::Internal("no script configured".to_string()));
        };
        if script.target != target {
            return Err(BuildFailure::new(format!(
                "target \"{target}\" does not exist in the project"
            ))
            .into());
        }

        let mut seen: Vec<(String, usize)> = Vec::new();
        let planned: Vec<(ConfigurationNode, SourceLocation)> = script
            .root
            .children()
            .iter()
            .map(|child| {
                let nth = match seen.iter_mut().find(|(n, _)| n == child.name()) {
                    Some((_, count)) => {
                        *count += 1;
                        *count
                    }
                    None => {
                        seen.push((child.name().to_string(), 0));
                        0
                    }
                };
                (child.clone(), script.locate(child.name(), nth))
            })
            .collect();

        for (element, location) in planned {
            self.run_element(&element, location)?;
        }
        Ok(())
    }
}
