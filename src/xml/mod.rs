//! XML documents: a quick-xml driven parser that builds an arena tree.

mod builder;
mod node;
mod parser;

pub use builder::XmlTreeBuilder;
pub use node::{XmlDocument, XmlNode, XmlNodeType};
