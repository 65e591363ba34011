//! Script serialization
//!
//! Renders a [`ConfigurationNode`] tree as a pretty-printed markup document
//! whose root element is the resolved target.

use crate::error::{TreeError, WriteError};
use crate::node::{is_markup_name, ConfigurationNode};
use std::io::Write;
use std::path::Path;

/// URI of the custom task vocabulary bound to the configured prefix
pub const TASK_URI: &str = "antlib:org.apache.maven.ant.tasks";

/// Merge-metadata attributes that are never written
pub const RESERVED_ATTRIBUTES: [&str; 2] = ["combine.children", "combine.self"];

/// Attribute carrying the target name on the root element
pub const NAME_ATTRIBUTE: &str = "name";

/// Markup declaration written at the top of every script
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Check whether an attribute key is merge metadata
#[inline]
#[must_use]
pub fn is_reserved_attribute(key: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&key)
}

/// Target name for a tree: its root `name` attribute, or `default` when absent or empty
#[must_use]
pub fn resolve_target_name(root: &ConfigurationNode, default: &str) -> String {
    root.attribute(NAME_ATTRIBUTE)
        .filter(|n| !n.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Pretty-printing tree serializer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptWriter {
    indent: String,
    line_separator: String,
}

impl Default for ScriptWriter {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            line_separator: "\n".to_string(),
        }
    }
}

impl ScriptWriter {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indentation unit per nesting level
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_line_separator(mut self, line_separator: impl Into<String>) -> Self {
        self.line_separator = line_separator.into();
        self
    }

    /// Render a tree to a document string
    ///
    /// The root element is named after the resolved target name (the root's
    /// `name` attribute, defaulting to `target_name`) and always carries that
    /// name in its `name` attribute. A non-empty `namespace_prefix` adds a
    /// single `xmlns:<prefix>` declaration bound to [`TASK_URI`]. Reserved
    /// merge attributes are dropped everywhere.
    ///
    /// # Errors
    /// Returns `WriteError::InvalidTree` if the tree or target name cannot be
    /// written as markup
    pub fn render(
        &self,
        root: &ConfigurationNode,
        namespace_prefix: &str,
        target_name: &str,
    ) -> Result<String, WriteError> {
        root.validate()?;
        let resolved = resolve_target_name(root, target_name);
        if !is_markup_name(&resolved) {
            return Err(TreeError::InvalidName(resolved).into());
        }

        let namespace_key = format!("xmlns:{namespace_prefix}");
        let mut attributes: Vec<(&str, &str)> = Vec::with_capacity(root.attribute_count() + 2);
        if !namespace_prefix.is_empty() {
            attributes.push((namespace_key.as_str(), TASK_URI));
        }
        if root.attribute(NAME_ATTRIBUTE).is_none() {
            attributes.push((NAME_ATTRIBUTE, resolved.as_str()));
        }
        for (key, value) in root.attributes() {
            if !namespace_prefix.is_empty() && key == namespace_key {
                continue;
            }
            let value = if key == NAME_ATTRIBUTE { resolved.as_str() } else { value };
            attributes.push((key, value));
        }

        let mut out = String::new();
        out.push_str(XML_DECLARATION);
        out.push_str(&self.line_separator);
        self.write_element(&mut out, 0, &resolved, attributes.into_iter(), root);
        Ok(out)
    }

    /// Serialize a tree to `destination`
    ///
    /// The document is rendered in memory, written to a temporary file next
    /// to the destination and then moved into place, so a failure never
    /// leaves a partial script behind. The parent directory must exist.
    ///
    /// # Errors
    /// - `WriteError::InvalidTree` if the tree cannot be written as markup
    /// - `WriteError::Io` if the destination cannot be created or written
    pub fn write(
        &self,
        root: &ConfigurationNode,
        destination: impl AsRef<Path>,
        namespace_prefix: &str,
        target_name: &str,
    ) -> Result<(), WriteError> {
        let destination = destination.as_ref();
        let document = self.render(root, namespace_prefix, target_name)?;

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut staged = staging_builder()
            .tempfile_in(parent)
            .map_err(|e| WriteError::io_error(destination, e))?;
        staged
            .write_all(document.as_bytes())
            .and_then(|()| staged.flush())
            .map_err(|e| WriteError::io_error(destination, e))?;
        staged
            .persist(destination)
            .map_err(|e| WriteError::io_error(destination, e.error))?;

        tracing::debug!(
            "Wrote script {} ({} bytes)",
            destination.display(),
            document.len()
        );
        Ok(())
    }

    fn write_element<'a>(
        &self,
        out: &mut String,
        depth: usize,
        tag: &str,
        attributes: impl Iterator<Item = (&'a str, &'a str)>,
        node: &ConfigurationNode,
    ) {
        self.write_indent(out, depth);
        out.push('<');
        out.push_str(tag);
        for (key, value) in attributes {
            if is_reserved_attribute(key) {
                continue;
            }
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            escape_attribute(out, value);
            out.push('"');
        }

        if !node.children().is_empty() {
            out.push('>');
            out.push_str(&self.line_separator);
            for child in node.children() {
                self.write_element(out, depth + 1, child.name(), child.attributes(), child);
            }
            self.write_indent(out, depth);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        } else if let Some(text) = node.text() {
            out.push('>');
            escape_text(out, text);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        } else {
            out.push_str("/>");
        }
        out.push_str(&self.line_separator);
    }

    fn write_indent(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str(&self.indent);
        }
    }
}

/// Temp file builder whose files get the mode a plain create would, umask applied
fn staging_builder() -> tempfile::Builder<'static, 'static> {
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder
}

/// Serialize with the default two-space writer
///
/// # Errors
/// See [`ScriptWriter::write`]
pub fn write_script(
    root: &ConfigurationNode,
    destination: impl AsRef<Path>,
    namespace_prefix: &str,
    target_name: &str,
) -> Result<(), WriteError> {
    ScriptWriter::default().write(root, destination, namespace_prefix, target_name)
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            other => out.push(other),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target() -> ConfigurationNode {
        ConfigurationNode::new("target").with_attribute("name", "main")
    }

    #[test]
    fn basic() {
        let mut root = target();
        root.child_or_insert("echo").set_attribute("message", "Hello");
        let out = ScriptWriter::new().render(&root, "", "main").unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <main name=\"main\">\n\
             \x20 <echo message=\"Hello\"/>\n\
             </main>\n"
        );
    }

    #[test]
    fn empty_target() {
        let out = ScriptWriter::new().render(&target(), "", "main").unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<main name=\"main\"/>\n"
        );
    }

    #[test]
    fn custom_task_prefix() {
        let root = target()
            .with_child(
                ConfigurationNode::new("mvn:foo")
                    .with_attribute("attr1", "val1")
                    .with_value("The first value."),
            )
            .with_child(
                ConfigurationNode::new("bar")
                    .with_attribute("attr2", "val2")
                    .with_value("The second value."),
            );
        let out = ScriptWriter::new().render(&root, "mvn", "main").unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <main xmlns:mvn=\"antlib:org.apache.maven.ant.tasks\" name=\"main\">\n\
             \x20 <mvn:foo attr1=\"val1\">The first value.</mvn:foo>\n\
             \x20 <bar attr2=\"val2\">The second value.</bar>\n\
             </main>\n"
        );
    }

    #[test]
    fn combine_attributes() {
        let mut root = target()
            .with_attribute("combine.children", "append")
            .with_attribute("description", "foo");
        root.child_or_insert("child")
            .set_attribute("combine.self", "override");
        let out = ScriptWriter::new().render(&root, "", "main").unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <main name=\"main\" description=\"foo\">\n\
             \x20 <child/>\n\
             </main>\n"
        );
    }

    #[test]
    fn name_defaults_to_target_name() {
        let root = ConfigurationNode::new("target").with_attribute("depends", "init");
        let out = ScriptWriter::new().render(&root, "", "package").unwrap();
        assert!(out.contains("<package name=\"package\" depends=\"init\"/>"));
    }

    #[test]
    fn existing_name_attribute_wins() {
        let root = ConfigurationNode::new("target").with_attribute("name", "deploy");
        let out = ScriptWriter::new().render(&root, "", "main").unwrap();
        assert!(out.contains("<deploy name=\"deploy\"/>"));
    }

    #[test]
    fn namespace_declared_exactly_once() {
        let root = target().with_attribute("xmlns:mvn", "http://maven.apache.org/ANTRUN");
        let out = ScriptWriter::new().render(&root, "mvn", "main").unwrap();
        assert_eq!(out.matches("xmlns:mvn=").count(), 1);
        assert!(out.contains("xmlns:mvn=\"antlib:org.apache.maven.ant.tasks\""));
    }

    #[test]
    fn no_namespace_without_prefix() {
        let out = ScriptWriter::new().render(&target(), "", "main").unwrap();
        assert!(!out.contains("xmlns"));
    }

    #[test]
    fn nested_indentation() {
        let root = target().with_child(
            ConfigurationNode::new("copy").with_child(
                ConfigurationNode::new("fileset")
                    .with_child(ConfigurationNode::new("include").with_attribute("name", "**")),
            ),
        );
        let out = ScriptWriter::new().render(&root, "", "main").unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[2], "  <copy>");
        assert_eq!(lines[3], "    <fileset>");
        assert_eq!(lines[4], "      <include name=\"**\"/>");
        assert_eq!(lines[5], "    </fileset>");
        assert_eq!(lines[6], "  </copy>");
    }

    #[test]
    fn escapes_text_and_attributes() {
        let root = target().with_child(
            ConfigurationNode::new("echo")
                .with_attribute("message", "a \"b\" & <c>")
                .with_value("x < y && z"),
        );
        let out = ScriptWriter::new().render(&root, "", "main").unwrap();
        assert!(out.contains("message=\"a &quot;b&quot; &amp; &lt;c&gt;\""));
        assert!(out.contains(">x &lt; y &amp;&amp; z</echo>"));
    }

    #[test]
    fn text_ignored_when_children_present() {
        let root = target().with_child(
            ConfigurationNode::new("sequential")
                .with_value("dropped")
                .with_child(ConfigurationNode::new("echo")),
        );
        let out = ScriptWriter::new().render(&root, "", "main").unwrap();
        assert!(!out.contains("dropped"));
    }

    #[test]
    fn custom_indent() {
        let root = target().with_child(ConfigurationNode::new("echo"));
        let out = ScriptWriter::new()
            .with_indent("\t")
            .render(&root, "", "main")
            .unwrap();
        assert!(out.contains("\n\t<echo/>\n"));
    }

    #[test]
    fn custom_line_separator() {
        let root = target().with_child(ConfigurationNode::new("echo"));
        let out = ScriptWriter::new()
            .with_line_separator("\r\n")
            .render(&root, "", "main")
            .unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<main name=\"main\">\r\n  <echo/>\r\n</main>\r\n"
        );
    }

    #[test]
    fn invalid_target_name_rejected() {
        let err = ScriptWriter::new()
            .render(&ConfigurationNode::new("target"), "", "two words")
            .unwrap_err();
        assert!(matches!(err, WriteError::InvalidTree(_)));
    }

    #[test]
    fn write_to_file_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build-main.xml");

        write_script(&target().with_child(ConfigurationNode::new("one")), &path, "", "main").unwrap();
        write_script(&target().with_child(ConfigurationNode::new("two")), &path, "", "main").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<two/>"));
        assert!(!content.contains("<one/>"));
    }

    #[cfg(unix)]
    #[test]
    fn written_script_has_default_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        fn mode(path: &Path) -> u32 {
            std::fs::metadata(path).unwrap().permissions().mode() & 0o777
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build-main.xml");
        write_script(&target(), &path, "", "main").unwrap();
        let plain = dir.path().join("plain.txt");
        std::fs::write(&plain, "x").unwrap();

        assert_eq!(mode(&path), mode(&plain));
    }

    #[test]
    fn write_fails_without_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("build-main.xml");
        let err = write_script(&target(), &path, "", "main").unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn invalid_tree_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build-main.xml");
        let bad = target().with_child(ConfigurationNode::new(""));
        assert!(write_script(&bad, &path, "", "main").is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
