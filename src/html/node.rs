//! The HTML document model.

use crate::error::{ParseError, QueryError};
use crate::navigator::TreeNavigator;
use crate::query;
use crate::serialize;
use crate::tree::{Arena, Attribute, Children, NodeData, NodeId, NodeKind, TreeNode};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HtmlNodeType {
    Document,
    Doctype,
    Element,
    Text,
    Comment,
}

/// A parsed HTML document.
///
/// Parsing follows the HTML5 algorithm, so any input yields a tree: missing
/// `<html>`, `<head>` and `<body>` elements are supplied and stray end tags
/// are ignored.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    arena: Arena<HtmlNodeType>,
}

impl HtmlDocument {
    pub(crate) fn from_arena(arena: Arena<HtmlNodeType>) -> Self {
        HtmlDocument { arena }
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        super::parser::parse_reader(text.as_bytes())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParseError> {
        super::parser::parse_reader(reader)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        log::debug!("Loading HTML document from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn root(&self) -> HtmlNode<'_> {
        self.node(self.arena.root())
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<HtmlNode<'_>> {
        self.root()
            .children()
            .find(|n| n.node_type() == HtmlNodeType::Element)
    }

    pub fn node(&self, id: NodeId) -> HtmlNode<'_> {
        HtmlNode { doc: self, id }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().first_child().is_none()
    }
}

/// A handle to one node of an `HtmlDocument`.
#[derive(Clone, Copy)]
pub struct HtmlNode<'a> {
    doc: &'a HtmlDocument,
    id: NodeId,
}

impl PartialEq for HtmlNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}
impl Eq for HtmlNode<'_> {}

impl fmt::Debug for HtmlNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlNode")
            .field("id", &self.id.index())
            .field("type", &self.node_type())
            .field("data", &self.data())
            .finish()
    }
}

impl<'a> HtmlNode<'a> {
    fn raw(&self) -> &'a NodeData<HtmlNodeType> {
        self.doc.arena.get(self.id)
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<HtmlNode<'a>> {
        id.map(|id| HtmlNode { doc: self.doc, id })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a HtmlDocument {
        self.doc
    }

    pub fn node_type(&self) -> HtmlNodeType {
        self.raw().kind
    }

    /// Tag name for elements, text for text and comment nodes, the doctype
    /// name for the doctype.
    pub fn data(&self) -> &'a str {
        &self.raw().data
    }

    pub fn namespace_uri(&self) -> &'a str {
        &self.raw().namespace_uri
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        &self.raw().attributes
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.matches(name))
            .map(|a| a.value.as_str())
    }

    pub fn select_attr(&self, name: &str) -> &'a str {
        self.attr(name).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<HtmlNode<'a>> {
        self.wrap(self.raw().parent)
    }

    pub fn first_child(&self) -> Option<HtmlNode<'a>> {
        self.wrap(self.raw().first_child)
    }

    pub fn last_child(&self) -> Option<HtmlNode<'a>> {
        self.wrap(self.raw().last_child)
    }

    pub fn prev_sibling(&self) -> Option<HtmlNode<'a>> {
        self.wrap(self.raw().prev_sibling)
    }

    pub fn next_sibling(&self) -> Option<HtmlNode<'a>> {
        self.wrap(self.raw().next_sibling)
    }

    pub fn children(&self) -> Children<HtmlNode<'a>> {
        Children::new(self)
    }

    /// Concatenated text of the subtree, trimmed.
    pub fn inner_text(&self) -> String {
        serialize::inner_text(self)
    }

    /// Serializes the subtree back to HTML. Void elements are self-closed.
    pub fn output_html(&self) -> String {
        serialize::output_markup(self)
    }

    pub fn navigator(&self) -> TreeNavigator<HtmlNode<'a>> {
        TreeNavigator::new(*self)
    }

    pub fn select_elements(&self, expr: &str) -> Result<Vec<HtmlNode<'a>>, QueryError> {
        query::find(*self, expr)
    }

    pub fn select_element(&self, expr: &str) -> Result<Option<HtmlNode<'a>>, QueryError> {
        query::find_one(*self, expr)
    }
}

impl TreeNode for HtmlNode<'_> {
    const TRIM_INNER_TEXT: bool = true;
    const SELF_CLOSE_VOID_ELEMENTS: bool = true;

    fn kind(&self) -> NodeKind {
        match self.node_type() {
            HtmlNodeType::Document => NodeKind::Document,
            HtmlNodeType::Doctype => NodeKind::Doctype,
            HtmlNodeType::Element => NodeKind::Element,
            HtmlNodeType::Text => NodeKind::Text,
            HtmlNodeType::Comment => NodeKind::Comment,
        }
    }

    fn data(&self) -> &str {
        HtmlNode::data(self)
    }

    fn prefix(&self) -> &str {
        &self.raw().prefix
    }

    fn attributes(&self) -> &[Attribute] {
        HtmlNode::attributes(self)
    }

    fn parent(&self) -> Option<Self> {
        HtmlNode::parent(self)
    }

    fn first_child(&self) -> Option<Self> {
        HtmlNode::first_child(self)
    }

    fn last_child(&self) -> Option<Self> {
        HtmlNode::last_child(self)
    }

    fn prev_sibling(&self) -> Option<Self> {
        HtmlNode::prev_sibling(self)
    }

    fn next_sibling(&self) -> Option<Self> {
        HtmlNode::next_sibling(self)
    }
}
