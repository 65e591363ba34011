//! Configuration tree model
//!
//! [`ConfigurationNode`] is one element of the user-supplied target tree:
//! a name, ordered attributes, ordered children and optional leaf text.

use crate::error::{ReadError, TreeError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One element of a configuration tree
///
/// # Invariants
/// - Attribute keys are unique and keep insertion order
/// - Child order is significant and kept verbatim
/// - Text is only meaningful on a leaf; see [`ConfigurationNode::text`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationNode {
    name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    attributes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ConfigurationNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl ConfigurationNode {
    /// Create an empty element
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            value: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by key
    #[inline]
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Attribute value, or `default` when absent
    #[inline]
    #[must_use]
    pub fn attribute_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.attribute(key).unwrap_or(default)
    }

    /// Set an attribute, returning the previous value
    ///
    /// Replacing an existing key keeps its position.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.attributes.insert(key.into(), value.into())
    }

    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Remove an attribute, keeping the order of the others
    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + Clone {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ConfigurationNode] {
        &self.children
    }

    /// First child with the given name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ConfigurationNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child with the given name, appending an empty one if none exists
    pub fn child_or_insert(&mut self, name: &str) -> &mut ConfigurationNode {
        let index = match self.children.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.children.push(Self::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    #[inline]
    pub fn add_child(&mut self, child: ConfigurationNode) {
        self.children.push(child);
    }

    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: ConfigurationNode) -> Self {
        self.add_child(child);
        self
    }

    /// Raw text value, whether or not the node has children
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[inline]
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Text content to emit: present only on a leaf with a non-empty value
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        if self.is_leaf() {
            self.value().filter(|v| !v.is_empty())
        } else {
            None
        }
    }

    /// Reject trees that cannot be written as markup
    ///
    /// # Errors
    /// - `TreeError::EmptyName` for an element with an empty name
    /// - `TreeError::InvalidName` for a name that is not a markup name
    /// - `TreeError::InvalidAttributeKey` for an empty or unwritable key
    pub fn validate(&self) -> Result<(), TreeError> {
        self.validate_at(&mut Vec::new())
    }

    fn validate_at<'a>(&'a self, path: &mut Vec<&'a str>) -> Result<(), TreeError> {
        if self.name.is_empty() {
            path.push("<unnamed>");
            return Err(TreeError::EmptyName {
                path: path.join("/"),
            });
        }
        if !is_markup_name(&self.name) {
            return Err(TreeError::InvalidName(self.name.clone()));
        }
        if let Some(key) = self.attribute_names().find(|k| !is_markup_name(k)) {
            return Err(TreeError::InvalidAttributeKey {
                element: self.name.clone(),
                key: key.to_string(),
            });
        }

        path.push(&self.name);
        for child in &self.children {
            child.validate_at(path)?;
        }
        path.pop();
        Ok(())
    }

    /// Decode a tree from its JSON form
    ///
    /// # Errors
    /// Returns `TreeError::Json` if the source is not a valid tree
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a tree from its YAML form
    ///
    /// # Errors
    /// Returns `TreeError::Yaml` if the source is not a valid tree
    pub fn from_yaml(yaml: &str) -> Result<Self, TreeError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a tree from markup text
    ///
    /// # Errors
    /// Returns `ReadError::Syntax` for malformed markup
    pub fn parse(markup: &str) -> Result<Self, ReadError> {
        crate::reader::read_script(markup)
    }
}

/// Check that a string can be used as an element or attribute name
#[must_use]
pub fn is_markup_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}
