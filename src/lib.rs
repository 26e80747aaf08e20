//! XPath querying over HTML and XML document trees.
//!
//! Documents are parsed into immutable arena trees (`XmlDocument` through
//! quick-xml, `HtmlDocument` through html5ever). Both flavors implement
//! `TreeNode`, which `TreeNavigator` adapts to the cursor interface the
//! `xquery-xpath` engine evaluates against.
//!
//! ```no_run
//! use xquery::{XmlDocument, find};
//!
//! let doc = XmlDocument::parse(r#"<?xml version="1.0"?><list><i>a</i><i>b</i></list>"#)?;
//! for item in find(doc.root(), "//i")? {
//!     println!("{}", item.inner_text());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod error;
pub mod html;
pub mod navigator;
pub mod query;
pub mod serialize;
pub mod tree;
pub mod xml;

pub use cache::{CacheConfig, QueryCache};
pub use error::{ParseError, QueryError};
pub use html::{HtmlDocument, HtmlNode, HtmlNodeType};
pub use navigator::TreeNavigator;
pub use query::{
    QueryEngine, Selection, Value, compile, evaluate, find, find_each, find_one, select,
};
pub use tree::{Attribute, Children, NodeId, NodeKind, TreeNode};
pub use xml::{XmlDocument, XmlNode, XmlNodeType, XmlTreeBuilder};

// Re-exported so callers can hold compiled expressions without naming the engine crate.
pub use xquery_xpath::{Expr, XPathError};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_documents_and_engine_are_shareable() {
        assert_send_sync::<XmlDocument>();
        assert_send_sync::<HtmlDocument>();
        assert_send_sync::<QueryEngine>();
        assert_send_sync::<XmlNode<'static>>();
        assert_send_sync::<TreeNavigator<HtmlNode<'static>>>();
    }
}
