//! Parsers that build a [`Document`] from XML text.
//!
//! Two flavours exist. [`parse_plain`] goes through `roxmltree`: CDATA
//! sections are merged into ordinary text and comments and processing
//! instructions are dropped. [`parse_preserving`] walks `quick-xml` events
//! and keeps CDATA sections, comments and processing instructions as
//! separate nodes.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::tree::{Document, Element, Node};
use super::utils::is_blank;
use crate::error::{Result, SplitError};

/// Parse XML, folding CDATA into text.
///
/// # Examples
/// ```
/// use zipsplit::xml::{parse_plain, Node};
///
/// let doc = parse_plain("<Main><Zip><![CDATA[12]]>34</Zip></Main>").unwrap();
/// let zip = doc.root.child_elements().next().unwrap();
/// assert_eq!(zip.children, vec![Node::Text("1234".to_string())]);
/// ```
pub fn parse_plain(input: &str) -> Result<Document> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(strip_bom(input), options)?;
    Ok(Document::from_root(convert_element(doc.root_element())))
}

/// Convert a `roxmltree` element into an owned element.
fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(qualified_name(node, tag.namespace(), tag.name()));

    // Only declarations introduced on this element; a detached element
    // picks up the inherited ones in `Element::take_element`.
    let parent = node.parent_element();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") {
            continue;
        }
        let inherited = parent.is_some_and(|p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if !inherited {
            let attr = match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            element.attributes.push((attr, ns.uri().to_string()));
        }
    }

    for attr in node.attributes() {
        let name = qualified_name(node, attr.namespace(), attr.name());
        element.attributes.push((name, attr.value().to_string()));
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(Node::Element(convert_element(child)));
        } else if child.is_text() {
            element.push_text(child.text().unwrap_or_default());
        }
    }

    element
}

fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

/// Parse XML, keeping CDATA sections, comments and processing instructions.
///
/// Content outside the root element (declaration, doctype, comments) is
/// not kept.
///
/// # Examples
/// ```
/// use zipsplit::xml::{parse_preserving, Node};
///
/// let doc = parse_preserving("<Main><Zip><![CDATA[12]]></Zip></Main>").unwrap();
/// let zip = doc.root.child_elements().next().unwrap();
/// assert_eq!(zip.children, vec![Node::CData("12".to_string())]);
/// ```
pub fn parse_preserving(input: &str) -> Result<Document> {
    let mut reader = Reader::from_str(strip_bom(input));
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(start_element(&e)?),
            Event::Empty(e) => {
                let element = start_element(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(e) => {
                let element = stack.pop().ok_or_else(|| {
                    SplitError::MalformedXml(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                let text = String::from_utf8_lossy(&e);
                push_text(&mut stack, &text)?;
            }
            Event::GeneralRef(e) => {
                let entity = format!("&{};", String::from_utf8_lossy(&e));
                let resolved = unescape(&entity)
                    .map_err(|err| SplitError::MalformedXml(err.to_string()))?;
                push_text(&mut stack, &resolved)?;
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    let content = String::from_utf8_lossy(&e).into_owned();
                    parent.children.push(Node::CData(content));
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last_mut() {
                    let content = String::from_utf8_lossy(&e).into_owned();
                    parent.children.push(Node::Comment(content));
                }
            }
            Event::PI(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::ProcessingInstruction {
                        target: String::from_utf8_lossy(e.target()).into_owned(),
                        content: String::from_utf8_lossy(e.content()).trim().to_string(),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(SplitError::MalformedXml(format!(
            "element <{}> is not closed",
            open.name
        )));
    }

    root.map(Document::from_root)
        .ok_or_else(|| SplitError::MalformedXml("document has no root element".to_string()))
}

/// Build an element (without children) from a start tag.
fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|err| SplitError::MalformedXml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(|err| SplitError::MalformedXml(err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

/// Attach a completed element to its parent, or make it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(SplitError::MalformedXml(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_text(text),
        None if is_blank(text) => {}
        None => {
            return Err(SplitError::MalformedXml(format!(
                "text outside the root element: '{}'",
                text.trim()
            )))
        }
    }
    Ok(())
}

fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{feff}').unwrap_or(input)
}
