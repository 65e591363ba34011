//! Resolved dependency records
//!
//! Defines [`ArtifactRecord`], the bridge's view of one dependency resolved by
//! the host build tool, and [`ArtifactSet`], the ordered set the host hands over.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// One resolved dependency
///
/// Equality and hashing use the coordinates only (group, artifact, version,
/// type, classifier): scope and resolved file do not make two records distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRecord {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Packaging type (`jar`, `war`, `pom`, ...)
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Location of the artifact's bytes, if resolution produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_kind() -> String {
    "jar".to_string()
}

fn default_scope() -> String {
    "compile".to_string()
}

impl ArtifactRecord {
    /// Create a `jar` artifact in `compile` scope with no resolved file
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            kind: default_kind(),
            scope: default_scope(),
            classifier: None,
            file: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the classifier; an empty string clears it
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        self.classifier = (!classifier.is_empty()).then_some(classifier);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Classifier, if one is set and non-empty
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref().filter(|c| !c.is_empty())
    }

    /// Version-independent key: `groupId:artifactId:type[:classifier]`
    ///
    /// Stable for a given coordinate combination; used to name generated
    /// references and properties.
    #[must_use]
    pub fn conflict_id(&self) -> String {
        let mut id = format!("{}:{}:{}", self.group_id, self.artifact_id, self.kind);
        if let Some(classifier) = self.classifier() {
            id.push(':');
            id.push_str(classifier);
        }
        id
    }

    /// Resolved file, or an error naming this artifact
    ///
    /// # Errors
    /// Returns [`UnresolvedArtifactError`] if the host did not resolve the artifact
    #[inline]
    pub fn resolved_file(&self) -> Result<&Path, UnresolvedArtifactError> {
        self.file
            .as_deref()
            .ok_or_else(|| UnresolvedArtifactError::new(self))
    }

    fn key(&self) -> (&str, &str, &str, &str, Option<&str>) {
        (
            &self.group_id,
            &self.artifact_id,
            &self.version,
            &self.kind,
            self.classifier(),
        )
    }
}

impl PartialEq for ArtifactRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ArtifactRecord {}

impl Hash for ArtifactRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Display for ArtifactRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.conflict_id(), self.version)
    }
}

/// An artifact was needed as a file but the host never resolved it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("artifact has not been resolved to a file: {artifact}")]
pub struct UnresolvedArtifactError {
    /// Identity of the offending artifact (`groupId:artifactId:type[:classifier]:version`)
    pub artifact: String,
}

impl UnresolvedArtifactError {
    #[must_use]
    pub fn new(artifact: &ArtifactRecord) -> Self {
        Self {
            artifact: artifact.to_string(),
        }
    }
}

/// Insertion-ordered set of artifacts
///
/// Inserting a record equal to one already present keeps the first one and
/// its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactSet(IndexSet<ArtifactRecord>);

impl ArtifactSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(IndexSet::new())
    }

    /// Insert a record, returning `false` if an equal one was already present
    #[inline]
    pub fn insert(&mut self, artifact: ArtifactRecord) -> bool {
        self.0.insert(artifact)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, artifact: &ArtifactRecord) -> bool {
        self.0.contains(artifact)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records in insertion order
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ArtifactRecord> + Clone {
        self.0.iter()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ArtifactRecord> {
        self.0.get_index(index)
    }
}

impl FromIterator<ArtifactRecord> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = ArtifactRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ArtifactRecord> for ArtifactSet {
    fn extend<I: IntoIterator<Item = ArtifactRecord>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ArtifactSet {
    type Item = ArtifactRecord;
    type IntoIter = indexmap::set::IntoIter<ArtifactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a ArtifactRecord;
    type IntoIter = indexmap::set::Iter<'a, ArtifactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
