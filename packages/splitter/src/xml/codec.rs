//! Parser/writer pairs, one per output mode.

use super::reader::{parse_plain, parse_preserving};
use super::tree::{Document, Element};
use super::writer::{indent, render};
use crate::config::INDENT;
use crate::error::Result;

/// Paired parse and write capabilities of an output mode.
///
/// A codec is picked once per run (see [`crate::Mode::codec`]) and used for
/// the input document, the postal-code fields that get routed and every
/// output document.
pub trait XmlCodec {
    /// Parse the input document.
    fn parse(&self, input: &str) -> Result<Document>;

    /// Adjust the postal-code field of a record that is about to be moved.
    ///
    /// `raw` is the field text as read, untrimmed.
    fn mark_field(&self, field: &mut Element, raw: &str);

    /// Serialize an output document.
    fn render(&self, document: Document) -> Result<Vec<u8>>;
}

/// Keeps CDATA sections and wraps the postal code in one.
///
/// Output is pretty-printed by the serializer; text inside records is
/// written as read.
#[derive(Debug, Clone, Copy, Default)]
pub struct CdataCodec;

impl XmlCodec for CdataCodec {
    fn parse(&self, input: &str) -> Result<Document> {
        parse_preserving(input)
    }

    fn mark_field(&self, field: &mut Element, raw: &str) {
        field.set_cdata(raw);
    }

    fn render(&self, document: Document) -> Result<Vec<u8>> {
        render(&document, true, INDENT)
    }
}

/// Folds CDATA into text and normalizes indentation before writing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl XmlCodec for PlainCodec {
    fn parse(&self, input: &str) -> Result<Document> {
        parse_plain(input)
    }

    fn mark_field(&self, _field: &mut Element, _raw: &str) {}

    fn render(&self, mut document: Document) -> Result<Vec<u8>> {
        indent(&mut document.root, INDENT, 0);
        render(&document, false, INDENT)
    }
}
