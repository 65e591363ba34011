//! Script reading
//!
//! Parses the markup subset produced by [`ScriptWriter`](crate::ScriptWriter)
//! back into a [`ConfigurationNode`]: declaration, comments, elements,
//! quoted attributes, text, CDATA, predefined entities and character
//! references. Mixed content is not modelled: text next to child elements
//! is dropped.

use crate::error::ReadError;
use crate::node::ConfigurationNode;
use std::path::Path;

/// Parse markup text into a tree
///
/// # Errors
/// Returns `ReadError::Syntax` with a 1-based position for malformed input
pub fn read_script(text: &str) -> Result<ConfigurationNode, ReadError> {
    let mut parser = Parser::new(text);
    parser.skip_prolog()?;
    let root = parser.parse_element()?;
    parser.skip_misc()?;
    if !parser.at_end() {
        return Err(parser.error("content after root element"));
    }
    Ok(root)
}

/// Read and parse a script file
///
/// # Errors
/// - `ReadError::Io` if the file cannot be read
/// - `ReadError::Syntax` for malformed markup
pub fn read_script_file(path: impl AsRef<Path>) -> Result<ConfigurationNode, ReadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_script(&text)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let pos = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, s: &str) -> Result<(), ReadError> {
        if self.starts_with(s) {
            self.pos += s.len();
            Ok(())
        } else {
            Err(self.error(format!("expected '{s}'")))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consume up to and including `terminator`, returning the text before it
    fn take_until(&mut self, terminator: &str, what: &str) -> Result<&'a str, ReadError> {
        match self.rest().find(terminator) {
            Some(offset) => {
                let taken = &self.rest()[..offset];
                self.pos += offset + terminator.len();
                Ok(taken)
            }
            None => Err(self.error(format!("unterminated {what}"))),
        }
    }

    fn skip_prolog(&mut self) -> Result<(), ReadError> {
        self.skip_misc()?;
        if self.starts_with("<!DOCTYPE") {
            self.take_until(">", "doctype")?;
            self.skip_misc()?;
        }
        Ok(())
    }

    /// Skip whitespace, comments and processing instructions
    fn skip_misc(&mut self) -> Result<(), ReadError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.take_until("?>", "processing instruction")?;
            } else if self.starts_with("<!--") {
                self.take_until("-->", "comment")?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_name(&mut self) -> Result<&'a str, ReadError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && !matches!(c, '<' | '>' | '/' | '=' | '"' | '\''))
        {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn parse_element(&mut self) -> Result<ConfigurationNode, ReadError> {
        self.expect("<")?;
        let name = self.parse_name()?;
        let mut node = ConfigurationNode::new(name);

        loop {
            self.skip_whitespace();
            if self.starts_with("/>") {
                self.pos += 2;
                return Ok(node);
            }
            if self.starts_with(">") {
                self.pos += 1;
                break;
            }
            let key_pos = self.pos;
            let key = self.parse_name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let value = self.parse_quoted()?;
            if node.set_attribute(key, value).is_some() {
                self.pos = key_pos;
                return Err(self.error(format!("duplicate attribute '{key}'")));
            }
        }

        self.parse_content(&mut node)?;
        Ok(node)
    }

    fn parse_quoted(&mut self) -> Result<String, ReadError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected quoted attribute value")),
        };
        self.bump();
        let start = self.pos;
        let raw = match self.rest().find(quote) {
            Some(offset) => &self.rest()[..offset],
            None => return Err(self.error("unterminated attribute value")),
        };
        if let Some(offset) = raw.find('<') {
            self.pos = start + offset;
            return Err(self.error("'<' in attribute value"));
        }
        let value = self.decode(raw, start)?;
        self.pos = start + raw.len() + quote.len_utf8();
        Ok(value)
    }

    fn parse_content(&mut self, node: &mut ConfigurationNode) -> Result<(), ReadError> {
        let mut text = String::new();
        loop {
            if self.at_end() {
                return Err(self.error(format!("unclosed element '{}'", node.name())));
            }
            if self.starts_with("</") {
                self.pos += 2;
                let close = self.parse_name()?;
                if close != node.name() {
                    return Err(self.error(format!(
                        "mismatched closing tag '{close}', expected '{}'",
                        node.name()
                    )));
                }
                self.skip_whitespace();
                self.expect(">")?;
                break;
            } else if self.starts_with("<!--") {
                self.take_until("-->", "comment")?;
            } else if self.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                text.push_str(self.take_until("]]>", "cdata section")?);
            } else if self.starts_with("<?") {
                self.take_until("?>", "processing instruction")?;
            } else if self.starts_with("<") {
                let child = self.parse_element()?;
                node.add_child(child);
            } else {
                let start = self.pos;
                let end = self.rest().find('<').map_or(self.src.len(), |o| start + o);
                let raw = &self.src[start..end];
                text.push_str(&self.decode(raw, start)?);
                self.pos = end;
            }
        }

        if node.is_leaf() && !text.trim().is_empty() {
            node.set_value(text);
        }
        Ok(())
    }

    fn decode(&mut self, raw: &str, raw_start: usize) -> Result<String, ReadError> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let Some(semi) = after.find(';') else {
                self.pos = raw_start + (raw.len() - rest.len()) + amp;
                return Err(self.error("unterminated entity reference"));
            };
            let entity = &after[..semi];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            match decoded {
                Some(c) => out.push(c),
                None => {
                    self.pos = raw_start + (raw.len() - rest.len()) + amp;
                    return Err(self.error(format!("unknown entity '&{entity};'")));
                }
            }
            rest = &after[semi + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn error(&self, message: impl Into<String>) -> ReadError {
        let consumed = &self.src[..self.pos.min(self.src.len())];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rfind('\n')
            .map_or(consumed, |nl| &consumed[nl + 1..])
            .chars()
            .count()
            + 1;
        ReadError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_written_document() {
        let text = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                    <main name=\"main\">\n\
                    \x20 <echo message=\"Hello\"/>\n\
                    \x20 <bar attr2=\"val2\">The second value.</bar>\n\
                    </main>\n";
        let root = read_script(text).unwrap();
        assert_eq!(root.name(), "main");
        assert_eq!(root.attribute("name"), Some("main"));
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].attribute("message"), Some("Hello"));
        assert_eq!(root.children()[1].text(), Some("The second value."));
        assert_eq!(root.value(), None);
    }

    #[test]
    fn decodes_entities_and_references() {
        let root = read_script("<a v='x &amp; &quot;y&quot; &#65;&#x42;'>1 &lt; 2</a>").unwrap();
        assert_eq!(root.attribute("v"), Some("x & \"y\" AB"));
        assert_eq!(root.text(), Some("1 < 2"));
    }

    #[test]
    fn skips_comments_and_reads_cdata() {
        let root = read_script("<!-- head --><a><!-- inner --><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(root.text(), Some("<raw>"));
    }

    #[test]
    fn whitespace_only_leaf_has_no_value() {
        let root = read_script("<a>\n  </a>").unwrap();
        assert_eq!(root.value(), None);
    }

    #[test]
    fn mismatched_tag_reports_position() {
        let err = read_script("<a>\n  <b></c>\n</a>").unwrap_err();
        match err {
            ReadError::Syntax { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("mismatched"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unclosed_element() {
        assert!(matches!(read_script("<a><b/>"), Err(ReadError::Syntax { .. })));
    }

    #[test]
    fn duplicate_attribute_rejected() {
        let err = read_script("<a x=\"1\" x=\"2\"/>").unwrap_err();
        assert!(err.to_string().contains("duplicate attribute 'x'"));
    }

    #[test]
    fn trailing_content_rejected() {
        assert!(read_script("<a/><b/>").is_err());
        assert!(read_script("<a/>\n<!-- ok -->\n").is_ok());
    }

    #[test]
    fn unknown_entity_rejected() {
        assert!(read_script("<a>&nbsp;</a>").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_script_file("/definitely/not/here.xml").unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
    }
}
