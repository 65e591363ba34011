//! Local artifact repository
//!
//! Base directory plus the default repository layout, used to locate an
//! artifact relative to the repository root.

use crate::artifact::ArtifactRecord;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// The host's local repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRepository {
    /// Repository identifier
    #[serde(default = "default_id")]
    pub id: String,
    /// Root directory of the repository
    pub basedir: PathBuf,
}

fn default_id() -> String {
    "local".to_string()
}

impl LocalRepository {
    #[must_use]
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self {
            id: default_id(),
            basedir: basedir.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// `file://` URL of the base directory
    #[must_use]
    pub fn url(&self) -> String {
        format!("file://{}", self.basedir.to_string_lossy())
    }

    /// Path of an artifact relative to the base directory, `/`-separated
    ///
    /// Layout: `group/as/dirs/artifactId/version/artifactId-version[-classifier].ext`
    #[must_use]
    pub fn path_of(&self, artifact: &ArtifactRecord) -> String {
        let mut path = format!(
            "{}/{}/{}/{}-{}",
            artifact.group_id.replace('.', "/"),
            artifact.artifact_id,
            artifact.version,
            artifact.artifact_id,
            artifact.version,
        );
        if let Some(classifier) = artifact.classifier() {
            path.push('-');
            path.push_str(classifier);
        }
        path.push('.');
        path.push_str(extension_for(&artifact.kind));
        path
    }
}

impl Display for LocalRepository {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id: {}, url: {}, layout: default", self.id, self.url())
    }
}

/// File extension for an artifact type
fn extension_for(kind: &str) -> &str {
    match kind {
        "test-jar" | "maven-plugin" | "ejb" | "ejb-client" | "java-source" | "javadoc" => "jar",
        other => other,
    }
}
