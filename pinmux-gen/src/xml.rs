//! Minimal indenting XML writer for the family description document.
//!
//! Tags are kept open until the first child or the closing call, so
//! attributes can be added after [`XmlWriter::open_tag`]; childless tags
//! self-close.

use std::fmt::Write as _;

const INDENT: usize = 3;

/// Streaming XML writer over an owned buffer.
pub struct XmlWriter {
    out: String,
    stack: Vec<String>,
    tag_open: bool,
}

impl XmlWriter {
    /// Creates an empty document.
    pub fn new() -> Self {
        XmlWriter {
            out: String::new(),
            stack: Vec::new(),
            tag_open: false,
        }
    }

    /// Writes the XML declaration, DTD reference, and a generation comment.
    pub fn preamble(&mut self, file_name: &str, dtd: &str, description: &str) {
        let _ = writeln!(self.out, r#"<?xml version="1.0" encoding="UTF-8" ?>"#);
        let _ = writeln!(self.out, r#"<!DOCTYPE root SYSTEM "{dtd}">"#);
        let _ = writeln!(self.out, "<!-- {file_name} -->");
        let _ = writeln!(self.out, "<!-- {description} -->");
    }

    fn finish_open_tag(&mut self) {
        if self.tag_open {
            self.out.push_str(">\n");
            self.tag_open = false;
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.stack.len() * INDENT {
            self.out.push(' ');
        }
    }

    /// Opens a child element.
    pub fn open_tag(&mut self, name: &str) {
        self.finish_open_tag();
        self.indent();
        let _ = write!(self.out, "<{name}");
        self.stack.push(name.to_string());
        self.tag_open = true;
    }

    /// Adds an attribute to the most recently opened element.
    ///
    /// Must be called before any child element is opened.
    pub fn attribute(&mut self, name: &str, value: impl std::fmt::Display) {
        debug_assert!(self.tag_open, "attribute {name} written outside a tag");
        let _ = write!(self.out, " {name}=\"{}\"", escape(&value.to_string()));
    }

    /// Closes the innermost element, self-closing it if it had no children.
    pub fn close_tag(&mut self) {
        let name = self.stack.pop().expect("unbalanced close_tag");
        if self.tag_open {
            self.out.push_str(" />\n");
            self.tag_open = false;
        } else {
            self.indent();
            let _ = writeln!(self.out, "</{name}>");
        }
    }

    /// Returns the document, closing any elements left open.
    pub fn finish(mut self) -> String {
        while !self.stack.is_empty() {
            self.close_tag();
        }
        self.out
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        XmlWriter::new()
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::XmlWriter;

    #[test]
    fn childless_tags_self_close() {
        let mut xml = XmlWriter::new();
        xml.open_tag("pin");
        xml.attribute("name", "PTA0");
        xml.close_tag();
        assert_eq!(xml.finish(), "<pin name=\"PTA0\" />\n");
    }

    #[test]
    fn children_are_indented() {
        let mut xml = XmlWriter::new();
        xml.open_tag("pins");
        xml.open_tag("pin");
        xml.attribute("name", "PTA0");
        xml.close_tag();
        xml.close_tag();
        assert_eq!(
            xml.finish(),
            "<pins>\n   <pin name=\"PTA0\" />\n</pins>\n"
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut xml = XmlWriter::new();
        xml.open_tag("reg");
        xml.attribute("expr", "SIM->SCGC4 & \"x\"");
        assert!(xml.finish().contains("SIM-&gt;SCGC4 &amp; &quot;x&quot;"));
    }
}
