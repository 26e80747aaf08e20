//! The node capability trait shared by the HTML and XML document models, and
//! the arena both of them store their nodes in.

use std::fmt;

/// One attribute of an element: namespace prefix, local name and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub prefix: String,
    pub local: String,
    pub value: String,
}

impl Attribute {
    pub fn new(
        prefix: impl Into<String>,
        local: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Attribute {
            prefix: prefix.into(),
            local: local.into(),
            value: value.into(),
        }
    }

    /// The attribute name as written, `prefix:local` or just `local`.
    pub fn qualified_name(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    /// Matches `name` against this attribute. A name with a colon must match
    /// prefix and local name; a bare name only matches unprefixed attributes.
    pub fn matches(&self, name: &str) -> bool {
        match name.split_once(':') {
            Some((prefix, local)) => self.prefix == prefix && self.local == local,
            None => self.prefix.is_empty() && self.local == name,
        }
    }
}

/// The structural role of a node, common to both document flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Declaration,
    Doctype,
    Element,
    Text,
    Comment,
}

/// Index of a node inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Storage for one node. `kind` is the flavor-specific type tag.
#[derive(Debug, Clone)]
pub(crate) struct NodeData<K> {
    pub kind: K,
    pub data: String,
    pub prefix: String,
    pub namespace_uri: String,
    pub attributes: Vec<Attribute>,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl<K> NodeData<K> {
    pub fn new(kind: K, data: impl Into<String>) -> Self {
        NodeData {
            kind,
            data: data.into(),
            prefix: String::new(),
            namespace_uri: String::new(),
            attributes: Vec::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// A vector of nodes linked by `NodeId`. Slot 0 is always the document node.
/// Nodes are only ever appended, so links stay valid for the arena's lifetime.
#[derive(Clone)]
pub(crate) struct Arena<K> {
    nodes: Vec<NodeData<K>>,
}

impl<K> Arena<K> {
    pub fn new(document: NodeData<K>) -> Self {
        Arena {
            nodes: vec![document],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> &NodeData<K> {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData<K> {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends `node` as the last child of `parent` and returns its id.
    pub fn append_child(&mut self, parent: NodeId, mut node: NodeData<K>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let prev = self.nodes[parent.0].last_child;
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = None;
        self.nodes.push(node);

        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(id),
            None => self.nodes[parent.0].first_child = Some(id),
        }
        self.nodes[parent.0].last_child = Some(id);
        id
    }
}

impl<K: fmt::Debug> fmt::Debug for Arena<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

/// What the navigator and serializer need from a node handle.
///
/// Implemented by `XmlNode` and `HtmlNode`. Handles are cheap copies; two
/// handles are equal when they point at the same node of the same document.
pub trait TreeNode: Copy + Eq + fmt::Debug {
    /// Whether the aggregate inner text of an element or document is trimmed.
    ///
    /// Only the final concatenation is trimmed, once. Text of nested elements
    /// keeps its own surrounding whitespace, so `<div><p>a </p><p> b</p></div>`
    /// reads `"a  b"` rather than `"ab"`.
    const TRIM_INNER_TEXT: bool;

    /// Whether void elements (`<br>`, `<img>`, ...) serialize as `<tag/>`.
    const SELF_CLOSE_VOID_ELEMENTS: bool;

    fn kind(&self) -> NodeKind;

    /// Tag local name for elements, raw text for text and comments, the
    /// doctype name for doctypes, empty otherwise.
    fn data(&self) -> &str;

    /// The element's display prefix, empty when there is none.
    fn prefix(&self) -> &str;

    fn attributes(&self) -> &[Attribute];

    fn parent(&self) -> Option<Self>;
    fn first_child(&self) -> Option<Self>;
    fn last_child(&self) -> Option<Self>;
    fn prev_sibling(&self) -> Option<Self>;
    fn next_sibling(&self) -> Option<Self>;
}

/// Iterates the children of a node, first to last.
#[derive(Debug, Clone)]
pub struct Children<N> {
    next: Option<N>,
}

impl<N: TreeNode> Children<N> {
    pub(crate) fn new(parent: &N) -> Self {
        Children {
            next: parent.first_child(),
        }
    }
}

impl<N: TreeNode> Iterator for Children<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}
