use antrun_config::{
    is_reserved_attribute, read_script, read_script_file, write_script, ConfigurationNode,
    ScriptWriter, TASK_URI,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const NAMES: &[&str] = &["echo", "copy", "fileset", "mvn:attachartifact", "property", "sequential"];
const KEYS: &[&str] = &[
    "id",
    "dir",
    "message",
    "value",
    "combine.children",
    "combine.self",
];

fn attributes() -> impl Strategy<Value = Vec<(usize, String)>> {
    proptest::collection::vec((0..KEYS.len(), "[a-zA-Z0-9 <>&\"'\t]{0,12}"), 0..4)
}

fn apply_attributes(mut node: ConfigurationNode, attrs: Vec<(usize, String)>) -> ConfigurationNode {
    for (key, value) in attrs {
        node.set_attribute(KEYS[key], value);
    }
    node
}

fn tree() -> impl Strategy<Value = ConfigurationNode> {
    let leaf = (
        0..NAMES.len(),
        attributes(),
        proptest::option::of("[a-z<&>][a-zA-Z0-9 <>&\"]{0,10}"),
    )
        .prop_map(|(name, attrs, text)| {
            let node = apply_attributes(ConfigurationNode::new(NAMES[name]), attrs);
            match text {
                Some(text) => node.with_value(text),
                None => node,
            }
        });

    leaf.prop_recursive(3, 24, 4, |inner| {
        (0..NAMES.len(), attributes(), proptest::collection::vec(inner, 1..4)).prop_map(
            |(name, attrs, children)| {
                children.into_iter().fold(
                    apply_attributes(ConfigurationNode::new(NAMES[name]), attrs),
                    ConfigurationNode::with_child,
                )
            },
        )
    })
}

fn target() -> impl Strategy<Value = ConfigurationNode> {
    (attributes(), proptest::collection::vec(tree(), 0..4)).prop_map(|(attrs, children)| {
        children.into_iter().fold(
            apply_attributes(ConfigurationNode::new("target"), attrs),
            ConfigurationNode::with_child,
        )
    })
}

/// What a tree is expected to look like after being written and read back
fn written_form(node: &ConfigurationNode) -> ConfigurationNode {
    let mut out = ConfigurationNode::new(node.name());
    for (key, value) in node.attributes() {
        if !is_reserved_attribute(key) {
            out.set_attribute(key, value);
        }
    }
    for child in node.children() {
        out.add_child(written_form(child));
    }
    if let Some(text) = node.text() {
        out.set_value(text);
    }
    out
}

proptest! {
    #[test]
    fn prop_written_script_reads_back(root in target()) {
        let script = ScriptWriter::new().render(&root, "mvn", "main").unwrap();
        let back = read_script(&script).unwrap();

        prop_assert_eq!(back.name(), "main");
        prop_assert_eq!(back.attribute("name"), Some("main"));
        prop_assert_eq!(back.attribute("xmlns:mvn"), Some(TASK_URI));

        let expected = written_form(&root);
        let expected_attrs: Vec<_> = expected.attributes().collect();
        let back_attrs: Vec<_> = back
            .attributes()
            .filter(|(k, _)| *k != "name" && *k != "xmlns:mvn")
            .collect();
        prop_assert_eq!(back_attrs, expected_attrs);
        prop_assert_eq!(back.children(), expected.children());
    }

    #[test]
    fn prop_render_is_a_fixpoint(root in target()) {
        let writer = ScriptWriter::new();
        let first = writer.render(&root, "mvn", "main").unwrap();
        let second = writer.render(&read_script(&first).unwrap(), "mvn", "main").unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_no_reserved_attribute_is_written(root in target()) {
        let script = ScriptWriter::new().render(&root, "", "main").unwrap();
        prop_assert!(!script.contains("combine.children"));
        prop_assert!(!script.contains("combine.self"));
    }
}

#[test]
fn writing_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.xml");
    let second = dir.path().join("second.xml");
    let root = ConfigurationNode::new("target")
        .with_attribute("combine.children", "append")
        .with_child(ConfigurationNode::new("echo").with_attribute("message", "${project.version}"))
        .with_child(ConfigurationNode::new("mvn:attachartifact").with_attribute("file", "a.zip"));

    write_script(&root, &first, "mvn", "package").unwrap();
    write_script(&root, &second, "mvn", "package").unwrap();

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);

    let back = read_script_file(&first).unwrap();
    assert_eq!(back.name(), "package");
    assert_eq!(back.attribute("combine.children"), None);
}
