//! Scope and type filtering
//!
//! Predicate composition over an [`ArtifactSet`]. Filter terms are plain
//! strings: there is no fixed vocabulary of scopes or types, so an unknown
//! token simply never matches.

use crate::artifact::{ArtifactRecord, ArtifactSet};

/// Predicate deciding whether an artifact is kept
pub trait ArtifactFilter {
    /// Return `true` to keep the artifact
    fn include(&self, artifact: &ArtifactRecord) -> bool;
}

impl<F> ArtifactFilter for F
where
    F: Fn(&ArtifactRecord) -> bool,
{
    fn include(&self, artifact: &ArtifactRecord) -> bool {
        self(artifact)
    }
}

/// Keeps artifacts whose scope is one of a comma-separated list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilter {
    scopes: Vec<String>,
}

impl ScopeFilter {
    /// Parse a comma-separated scope list (tokens are trimmed, blanks dropped)
    #[must_use]
    pub fn new(scopes: &str) -> Self {
        Self {
            scopes: split_terms(scopes),
        }
    }

    #[inline]
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl ArtifactFilter for ScopeFilter {
    fn include(&self, artifact: &ArtifactRecord) -> bool {
        self.scopes.iter().any(|s| *s == artifact.scope)
    }
}

/// Keeps artifacts whose type is one of a comma-separated list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilter {
    types: Vec<String>,
}

impl TypeFilter {
    /// Parse a comma-separated type list (tokens are trimmed, blanks dropped)
    #[must_use]
    pub fn new(types: &str) -> Self {
        Self {
            types: split_terms(types),
        }
    }

    #[inline]
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.types
    }
}

impl ArtifactFilter for TypeFilter {
    fn include(&self, artifact: &ArtifactRecord) -> bool {
        self.types.iter().any(|t| *t == artifact.kind)
    }
}

/// Conjunction of filters; an empty conjunction keeps everything
#[derive(Default)]
pub struct AndFilter {
    filters: Vec<Box<dyn ArtifactFilter>>,
}

impl AndFilter {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, filter: impl ArtifactFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, filter: impl ArtifactFilter + 'static) -> Self {
        self.add(filter);
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply to a set, preserving the input order
    #[must_use]
    pub fn apply(&self, artifacts: &ArtifactSet) -> ArtifactSet {
        artifacts
            .iter()
            .filter(|a| self.include(a))
            .cloned()
            .collect()
    }
}

impl ArtifactFilter for AndFilter {
    fn include(&self, artifact: &ArtifactRecord) -> bool {
        self.filters.iter().all(|f| f.include(artifact))
    }
}

impl std::fmt::Debug for AndFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndFilter")
            .field("filter_count", &self.filters.len())
            .finish()
    }
}

/// Filter a dependency set by scope and type
///
/// `scopes` and `types` are comma-separated lists; `None` or empty means no
/// constraint on that axis. With no constraint on either axis the input is
/// returned as-is. Otherwise an artifact is kept iff it matches every
/// constrained axis.
#[must_use]
pub fn filter_artifacts(
    artifacts: &ArtifactSet,
    scopes: Option<&str>,
    types: Option<&str>,
) -> ArtifactSet {
    let scopes = scopes.unwrap_or_default();
    let types = types.unwrap_or_default();

    if scopes.is_empty() && types.is_empty() {
        return artifacts.clone();
    }

    let mut filter = AndFilter::new();
    if !scopes.is_empty() {
        filter.add(ScopeFilter::new(scopes));
    }
    if !types.is_empty() {
        filter.add(TypeFilter::new(types));
    }
    filter.apply(artifacts)
}

fn split_terms(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
