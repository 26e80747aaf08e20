//! The XML document model: an arena of nodes and `Copy` handles into it.

use crate::error::{ParseError, QueryError};
use crate::navigator::TreeNavigator;
use crate::query;
use crate::serialize;
use crate::tree::{Arena, Attribute, Children, NodeData, NodeId, NodeKind, TreeNode};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlNodeType {
    Document,
    /// The `<?xml ...?>` declaration. Its pseudo-attributes are stored as
    /// attributes.
    Declaration,
    Element,
    Text,
    Comment,
}

/// A parsed XML document. Owns every node of the tree.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub(crate) arena: Arena<XmlNodeType>,
}

impl XmlDocument {
    pub(crate) fn from_arena(arena: Arena<XmlNodeType>) -> Self {
        XmlDocument { arena }
    }

    /// Parses a complete document held in memory.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        super::parser::parse_str(text)
    }

    /// Parses a document from any buffered UTF-8 byte source.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        super::parser::parse_reader(reader)
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        log::debug!("Loading XML document from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// The document node.
    pub fn root(&self) -> XmlNode<'_> {
        self.node(self.arena.root())
    }

    /// The `<?xml ...?>` declaration, if the document has one.
    pub fn declaration(&self) -> Option<XmlNode<'_>> {
        self.root()
            .first_child()
            .filter(|n| n.node_type() == XmlNodeType::Declaration)
    }

    /// The first element child of the document node.
    pub fn document_element(&self) -> Option<XmlNode<'_>> {
        self.root()
            .children()
            .find(|n| n.node_type() == XmlNodeType::Element)
    }

    pub fn node(&self, id: NodeId) -> XmlNode<'_> {
        XmlNode { doc: self, id }
    }

    /// Number of nodes in the tree, the document node included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().first_child().is_none()
    }
}

/// A handle to one node of an `XmlDocument`.
#[derive(Clone, Copy)]
pub struct XmlNode<'a> {
    doc: &'a XmlDocument,
    id: NodeId,
}

impl PartialEq for XmlNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}
impl Eq for XmlNode<'_> {}

impl fmt::Debug for XmlNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlNode")
            .field("id", &self.id.index())
            .field("type", &self.node_type())
            .field("data", &self.data())
            .finish()
    }
}

impl<'a> XmlNode<'a> {
    fn raw(&self) -> &'a NodeData<XmlNodeType> {
        self.doc.arena.get(self.id)
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<XmlNode<'a>> {
        id.map(|id| XmlNode { doc: self.doc, id })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a XmlDocument {
        self.doc
    }

    pub fn node_type(&self) -> XmlNodeType {
        self.raw().kind
    }

    /// Local name for elements, raw text for text and comments, empty for
    /// the document and the declaration.
    pub fn data(&self) -> &'a str {
        &self.raw().data
    }

    /// The prefix bound to this element's namespace when it was parsed.
    pub fn prefix(&self) -> &'a str {
        &self.raw().prefix
    }

    pub fn namespace_uri(&self) -> &'a str {
        &self.raw().namespace_uri
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        &self.raw().attributes
    }

    /// Value of the first attribute matching `name` (`local` or `prefix:local`).
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.matches(name))
            .map(|a| a.value.as_str())
    }

    /// Like [`XmlNode::attr`], with a missing attribute read as empty.
    pub fn select_attr(&self, name: &str) -> &'a str {
        self.attr(name).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<XmlNode<'a>> {
        self.wrap(self.raw().parent)
    }

    pub fn first_child(&self) -> Option<XmlNode<'a>> {
        self.wrap(self.raw().first_child)
    }

    pub fn last_child(&self) -> Option<XmlNode<'a>> {
        self.wrap(self.raw().last_child)
    }

    pub fn prev_sibling(&self) -> Option<XmlNode<'a>> {
        self.wrap(self.raw().prev_sibling)
    }

    pub fn next_sibling(&self) -> Option<XmlNode<'a>> {
        self.wrap(self.raw().next_sibling)
    }

    pub fn children(&self) -> Children<XmlNode<'a>> {
        Children::new(self)
    }

    /// Concatenated text of the subtree. Not trimmed.
    pub fn inner_text(&self) -> String {
        serialize::inner_text(self)
    }

    /// Serializes the subtree back to XML markup.
    pub fn output_xml(&self) -> String {
        serialize::output_markup(self)
    }

    /// A query cursor rooted at this node.
    pub fn navigator(&self) -> TreeNavigator<XmlNode<'a>> {
        TreeNavigator::new(*self)
    }

    /// All nodes matching `expr`, evaluated with this node as the root.
    pub fn select_elements(&self, expr: &str) -> Result<Vec<XmlNode<'a>>, QueryError> {
        query::find(*self, expr)
    }

    /// The first node matching `expr`, evaluated with this node as the root.
    pub fn select_element(&self, expr: &str) -> Result<Option<XmlNode<'a>>, QueryError> {
        query::find_one(*self, expr)
    }
}

impl TreeNode for XmlNode<'_> {
    const TRIM_INNER_TEXT: bool = false;
    const SELF_CLOSE_VOID_ELEMENTS: bool = false;

    fn kind(&self) -> NodeKind {
        match self.node_type() {
            XmlNodeType::Document => NodeKind::Document,
            XmlNodeType::Declaration => NodeKind::Declaration,
            XmlNodeType::Element => NodeKind::Element,
            XmlNodeType::Text => NodeKind::Text,
            XmlNodeType::Comment => NodeKind::Comment,
        }
    }

    fn data(&self) -> &str {
        XmlNode::data(self)
    }

    fn prefix(&self) -> &str {
        XmlNode::prefix(self)
    }

    fn attributes(&self) -> &[Attribute] {
        XmlNode::attributes(self)
    }

    fn parent(&self) -> Option<Self> {
        XmlNode::parent(self)
    }

    fn first_child(&self) -> Option<Self> {
        XmlNode::first_child(self)
    }

    fn last_child(&self) -> Option<Self> {
        XmlNode::last_child(self)
    }

    fn prev_sibling(&self) -> Option<Self> {
        XmlNode::prev_sibling(self)
    }

    fn next_sibling(&self) -> Option<Self> {
        XmlNode::next_sibling(self)
    }
}
