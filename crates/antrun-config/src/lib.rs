//! Antrun Configuration Tree
//!
//! The user-supplied target definition as an ordered element tree, and its
//! serialization into a standalone script document.
//!
//! # Core Concepts
//!
//! - [`ConfigurationNode`]: Element with ordered attributes, ordered children and leaf text
//! - [`ScriptWriter`]: Pretty-printing serializer; the root becomes the resolved target
//! - [`read_script`]: Parser for the markup the writer produces
//!
//! # Example
//!
//! ```rust
//! use antrun_config::{ConfigurationNode, ScriptWriter};
//!
//! let target = ConfigurationNode::new("target")
//!     .with_child(ConfigurationNode::new("echo").with_attribute("message", "hi"));
//!
//! let script = ScriptWriter::new().render(&target, "", "main").unwrap();
//! assert!(script.contains("<main name=\"main\">"));
//! assert!(script.contains("  <echo message=\"hi\"/>"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod node;
mod reader;
mod writer;

pub use error::{ReadError, TreeError, WriteError};
pub use node::{is_markup_name, ConfigurationNode};
pub use reader::{read_script, read_script_file};
pub use writer::{
    is_reserved_attribute, resolve_target_name, write_script, ScriptWriter, NAME_ATTRIBUTE,
    RESERVED_ATTRIBUTES, TASK_URI, XML_DECLARATION,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn render_then_read_back() {
        let target = ConfigurationNode::new("target")
            .with_attribute("name", "build")
            .with_child(
                ConfigurationNode::new("mvn:attachartifact")
                    .with_attribute("file", "out/app.zip")
                    .with_attribute("type", "zip"),
            );

        let script = ScriptWriter::new().render(&target, "mvn", "main").unwrap();
        let back = read_script(&script).unwrap();

        assert_eq!(back.name(), "build");
        assert_eq!(back.attribute("xmlns:mvn"), Some(TASK_URI));
        assert_eq!(back.children()[0].name(), "mvn:attachartifact");
        assert_eq!(back.children()[0].attribute("type"), Some("zip"));
    }

    #[test]
    fn parse_matches_read_script() {
        let markup = "<target><echo/></target>";
        assert_eq!(
            ConfigurationNode::parse(markup).unwrap(),
            read_script(markup).unwrap()
        );
    }
}
