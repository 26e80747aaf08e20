//! HTML documents, parsed with html5ever and copied into an arena tree.

mod node;
mod parser;

pub use node::{HtmlDocument, HtmlNode, HtmlNodeType};
