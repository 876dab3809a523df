//! Serialization of [`Document`] trees and structural indentation.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::tree::{Document, Element, Node};
use super::utils::is_blank;
use crate::error::Result;

/// Serialize a document with a UTF-8 XML declaration.
///
/// With `pretty` set, the children of an element are put on their own
/// indented lines, unless the element holds text or CDATA of its own: mixed
/// content is written exactly as stored. Without `pretty`, every node is
/// written as stored.
///
/// # Examples
/// ```
/// use zipsplit::xml::{render, Document, Element};
///
/// let mut doc = Document::new("Main");
/// doc.root.children.push(Element::new("Register").with_text("x").into());
///
/// let xml = String::from_utf8(render(&doc, true, "  ").unwrap()).unwrap();
/// assert_eq!(
///     xml,
///     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Main>\n  <Register>x</Register>\n</Main>\n"
/// );
/// ```
pub fn render(document: &Document, pretty: bool, indent: &str) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;

    let mut serializer = Serializer {
        writer: &mut writer,
        pretty,
        indent,
    };
    serializer.element(&document.root, 0)?;

    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    Ok(writer.into_inner())
}

struct Serializer<'w, 'i> {
    writer: &'w mut Writer<Vec<u8>>,
    pretty: bool,
    indent: &'i str,
}

impl Serializer<'_, '_> {
    fn element(&mut self, element: &Element, depth: usize) -> Result<()> {
        let mut start = BytesStart::new(element.name.as_str());
        for (name, value) in &element.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if element.children.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        self.writer.write_event(Event::Start(start))?;

        let format = self.pretty && !element.has_character_data();
        for child in &element.children {
            if format {
                self.newline(depth + 1)?;
            }
            self.node(child, depth + 1)?;
        }
        if format {
            self.newline(depth)?;
        }

        self.writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
        Ok(())
    }

    fn node(&mut self, node: &Node, depth: usize) -> Result<()> {
        match node {
            Node::Element(element) => self.element(element, depth)?,
            Node::Text(text) => self
                .writer
                .write_event(Event::Text(BytesText::new(text.as_str())))?,
            Node::CData(content) => self
                .writer
                .write_event(Event::CData(BytesCData::new(content.as_str())))?,
            Node::Comment(comment) => self
                .writer
                .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?,
            Node::ProcessingInstruction { target, content } => {
                let pi = if content.is_empty() {
                    target.clone()
                } else {
                    format!("{target} {content}")
                };
                self.writer.write_event(Event::PI(BytesPI::new(pi)))?;
            }
        }
        Ok(())
    }

    fn newline(&mut self, depth: usize) -> Result<()> {
        let whitespace = format!("\n{}", self.indent.repeat(depth));
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(whitespace)))?;
        Ok(())
    }
}

/// Re-indent an element tree in place.
///
/// Every element with element children gets its blank text runs replaced:
/// before each child by a newline plus one more `indent` than the element,
/// and after the last child by a newline at the element's own level. Text
/// that is not blank is left alone, as are elements without element
/// children.
///
/// # Examples
/// ```
/// use zipsplit::xml::{indent, Element, Node};
///
/// let mut main = Element::new("Main").with_child(Element::new("Register").with_text("x"));
/// indent(&mut main, "  ", 0);
/// assert_eq!(main.children[0], Node::Text("\n  ".to_string()));
/// assert_eq!(main.children[2], Node::Text("\n".to_string()));
/// ```
pub fn indent(element: &mut Element, unit: &str, level: usize) {
    if element.child_elements().next().is_none() {
        return;
    }

    let child_indent = format!("\n{}", unit.repeat(level + 1));
    let closing_indent = format!("\n{}", unit.repeat(level));

    let old_children = std::mem::take(&mut element.children);
    let mut children = Vec::with_capacity(old_children.len() * 2 + 1);
    let mut pending = String::new();

    // Blank runs are only known to be blank once the next non-text node
    // shows up, so text is buffered in `pending`.
    let flush = |pending: &mut String, children: &mut Vec<Node>, replacement: &str| {
        if is_blank(pending) {
            children.push(Node::Text(replacement.to_string()));
        } else {
            children.push(Node::Text(std::mem::take(pending)));
        }
        pending.clear();
    };

    for child in old_children {
        match child {
            Node::Text(text) => pending.push_str(&text),
            Node::Element(mut child) => {
                flush(&mut pending, &mut children, &child_indent);
                indent(&mut child, unit, level + 1);
                children.push(Node::Element(child));
            }
            other => {
                if !pending.is_empty() {
                    children.push(Node::Text(std::mem::take(&mut pending)));
                }
                children.push(other);
            }
        }
    }

    flush(&mut pending, &mut children, &closing_indent);

    element.children = children;
}
