//! Property spaces
//!
//! An ordered string-to-string map, one per execution context.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mutable property map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySpace(IndexMap<String, String>);

impl PropertySpace {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a property, overwriting any existing value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Set a property only if the key is absent; returns whether it was set
    pub fn set_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        match self.0.entry(key.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
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

    /// Replace every `${key}` with the property's value; unknown keys are left as written
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match self.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("${");
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertySpace {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertySpace {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_in_place() {
        let mut props: PropertySpace = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(props.set("a", "3"), Some("1".to_string()));
        let pairs: Vec<_> = props.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn set_if_absent_keeps_existing() {
        let mut props = PropertySpace::new();
        assert!(props.set_if_absent("k", "first"));
        assert!(!props.set_if_absent("k", "second"));
        assert_eq!(props.get("k"), Some("first"));
    }

    #[test]
    fn remove_keeps_order() {
        let mut props: PropertySpace = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        props.remove("a");
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn expand_known_and_unknown() {
        let props: PropertySpace = [("project.version", "1.2")].into_iter().collect();
        assert_eq!(props.expand("v=${project.version}"), "v=1.2");
        assert_eq!(props.expand("${missing} ok"), "${missing} ok");
        assert_eq!(props.expand("open ${brace"), "open ${brace");
    }
}
