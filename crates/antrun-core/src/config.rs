//! Run configuration
//!
//! Parameters of one bridge execution, loadable from YAML or JSON.

use crate::bridge::DEFAULT_VERSIONS_PROPERTY;
use crate::error::{BridgeError, BridgeResult};
use antrun_config::{read_script, ConfigurationNode};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Target name used when the target tree has no `name` attribute
pub const DEFAULT_TARGET_NAME: &str = "main";

/// Namespace URI that marks the custom task prefix in older configurations
pub const LEGACY_TASK_URI: &str = "http://maven.apache.org/ANTRUN";

/// Parameters of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    /// Skip the run entirely
    pub skip: bool,
    /// Target tree, given inline or as markup text
    #[serde(deserialize_with = "deserialize_target", skip_serializing_if = "Option::is_none")]
    pub target: Option<ConfigurationNode>,
    /// Prefix for derived properties
    pub property_prefix: String,
    /// Namespace prefix of the custom tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_task_prefix: Option<String>,
    pub versions_property_name: String,
    /// Copy runner properties back into the project after a successful run
    pub export_ant_properties: bool,
    /// Fail the build when the script fails
    pub fail_on_error: bool,
    /// Directory of generated scripts, `<build directory>/antrun` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_directory: Option<PathBuf>,

    #[serde(skip_serializing)]
    tasks: Option<serde_json::Value>,
    #[serde(skip_serializing)]
    source_root: Option<serde_json::Value>,
    #[serde(skip_serializing)]
    test_source_root: Option<serde_json::Value>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            skip: false,
            target: None,
            property_prefix: String::new(),
            custom_task_prefix: None,
            versions_property_name: DEFAULT_VERSIONS_PROPERTY.to_string(),
            export_ant_properties: false,
            fail_on_error: true,
            script_directory: None,
            tasks: None,
            source_root: None,
            test_source_root: None,
        }
    }
}

impl RunConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from YAML
    ///
    /// # Errors
    /// `BridgeError::Configuration` if the document is not a valid configuration
    pub fn from_yaml(yaml: &str) -> BridgeResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| BridgeError::Configuration(e.to_string()))
    }

    /// Load from JSON
    ///
    /// # Errors
    /// `BridgeError::Configuration` if the document is not a valid configuration
    pub fn from_json(json: &str) -> BridgeResult<Self> {
        serde_json::from_str(json).map_err(|e| BridgeError::Configuration(e.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: ConfigurationNode) -> Self {
        self.target = Some(target);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_property_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.property_prefix = prefix.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_custom_task_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.custom_task_prefix = Some(prefix.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_versions_property_name(mut self, name: impl Into<String>) -> Self {
        self.versions_property_name = name.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_export_properties(mut self, export: bool) -> Self {
        self.export_ant_properties = export;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_fail_on_error(mut self, fail: bool) -> Self {
        self.fail_on_error = fail;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_script_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_directory = Some(dir.into());
        self
    }

    /// Reject parameters that no longer exist
    ///
    /// # Errors
    /// `BridgeError::Configuration` naming the parameter and its replacement
    pub fn check_removed_parameters(&self) -> BridgeResult<()> {
        for (present, name, replacement) in [
            (self.tasks.is_some(), "tasks", "target"),
            (self.source_root.is_some(), "sourceRoot", "the build-helper plugin"),
            (
                self.test_source_root.is_some(),
                "testSourceRoot",
                "the build-helper plugin",
            ),
        ] {
            if present {
                return Err(BridgeError::Configuration(format!(
                    "'{name}' has been removed, use '{replacement}' instead"
                )));
            }
        }
        Ok(())
    }

    /// Namespace prefix of the custom tasks for `target`
    ///
    /// A non-empty configured prefix wins; otherwise the first `xmlns:<prefix>`
    /// attribute bound to [`LEGACY_TASK_URI`] names it. An empty prefix is no
    /// prefix.
    #[must_use]
    pub fn task_prefix(&self, target: &ConfigurationNode) -> Option<String> {
        if let Some(prefix) = self.custom_task_prefix.as_deref().filter(|p| !p.is_empty()) {
            return Some(prefix.to_string());
        }
        target
            .attributes()
            .find(|(key, value)| key.starts_with("xmlns:") && *value == LEGACY_TASK_URI)
            .map(|(key, _)| key["xmlns:".len()..].to_string())
            .filter(|p| !p.is_empty())
    }

    /// Location of the generated script for `target_name`
    #[must_use]
    pub fn script_path(&self, build_directory: &Path, target_name: &str) -> PathBuf {
        self.script_directory
            .clone()
            .unwrap_or_else(|| build_directory.join("antrun"))
            .join(format!("build-{target_name}.xml"))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetSource {
    Tree(ConfigurationNode),
    Markup(String),
}

fn deserialize_target<'de, D>(deserializer: D) -> Result<Option<ConfigurationNode>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<TargetSource>::deserialize(deserializer)? {
        None => Ok(None),
        Some(TargetSource::Tree(node)) => Ok(Some(node)),
        Some(TargetSource::Markup(text)) => read_script(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
