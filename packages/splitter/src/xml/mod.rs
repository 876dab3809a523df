//! XML tree, parsers and writers.

mod codec;
mod reader;
mod tree;
mod utils;
mod writer;

pub use codec::{CdataCodec, PlainCodec, XmlCodec};
pub use reader::{parse_plain, parse_preserving};
pub use tree::{Document, Element, Node, NodePath};
pub use utils::{find_field, is_blank};
pub use writer::{indent, render};
