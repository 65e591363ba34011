//! Classpath-style path expressions
//!
//! Provides [`PathExpression`] for ordered, separator-joined file lists.

use crate::artifact::{ArtifactRecord, UnresolvedArtifactError};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Platform path-list separator
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';

/// Platform path-list separator
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Ordered sequence of file paths
///
/// Renders by joining with [`PATH_SEPARATOR`]. Order is kept exactly as
/// given: no sorting, no de-duplication. An empty expression renders as the
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathExpression(Vec<PathBuf>);

impl PathExpression {
    #[inline]
    #[must_use]
    pub fn new(elements: Vec<PathBuf>) -> Self {
        Self(elements)
    }

    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build from any sequence of paths
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self(files.into_iter().map(Into::into).collect())
    }

    /// Build from the resolved files of a sequence of artifacts
    ///
    /// # Errors
    /// Returns [`UnresolvedArtifactError`] for the first artifact without a
    /// resolved file; nothing is built in that case.
    pub fn from_artifacts<'a, I>(artifacts: I) -> Result<Self, UnresolvedArtifactError>
    where
        I: IntoIterator<Item = &'a ArtifactRecord>,
    {
        artifacts
            .into_iter()
            .map(|a| a.resolved_file().map(Path::to_path_buf))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[PathBuf] {
        &self.0
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

    #[inline]
    pub fn push(&mut self, element: impl Into<PathBuf>) {
        self.0.push(element.into());
    }

    /// Join elements with the platform separator
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(PATH_SEPARATOR);
            }
            out.push_str(&element.to_string_lossy());
        }
        out
    }
}

impl Display for PathExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<Vec<PathBuf>> for PathExpression {
    fn from(elements: Vec<PathBuf>) -> Self {
        Self(elements)
    }
}

impl FromIterator<PathBuf> for PathExpression {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Join file paths with the platform separator
pub fn compose_path<I, P>(files: I) -> String
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    PathExpression::from_files(files).render()
}

/// Join the resolved files of artifacts with the platform separator
///
/// # Errors
/// Returns [`UnresolvedArtifactError`] if any artifact lacks a resolved file
pub fn compose_artifact_path<'a, I>(artifacts: I) -> Result<String, UnresolvedArtifactError>
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    PathExpression::from_artifacts(artifacts).map(|p| p.render())
}
