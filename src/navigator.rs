//! Exposes any `TreeNode` tree to the XPath engine as a `Navigator` cursor.

use crate::serialize;
use crate::tree::{NodeKind, TreeNode};
use xquery_xpath::{Navigator, NodeType};

/// A cursor over a document tree.
///
/// `root` is the node the cursor was created at; `move_to_root` always
/// returns there, and only cursors created at the same node can `move_to`
/// each other. `attr` is the index of the attribute the cursor sits on, or
/// `None` when it sits on `current` itself.
#[derive(Debug, Clone, Copy)]
pub struct TreeNavigator<N> {
    root: N,
    current: N,
    attr: Option<usize>,
}

impl<N: TreeNode> TreeNavigator<N> {
    pub fn new(root: N) -> Self {
        TreeNavigator {
            root,
            current: root,
            attr: None,
        }
    }

    /// The node under the cursor. On an attribute this is the owning element.
    pub fn current(&self) -> N {
        self.current
    }

    pub fn root(&self) -> N {
        self.root
    }

    /// Index of the attribute the cursor is on, if any.
    pub fn attribute_index(&self) -> Option<usize> {
        self.attr
    }

    fn goto(&mut self, node: Option<N>) -> bool {
        match node {
            Some(node) => {
                self.current = node;
                true
            }
            None => false,
        }
    }
}

impl<N: TreeNode> Navigator for TreeNavigator<N> {
    fn node_type(&self) -> NodeType {
        if self.attr.is_some() {
            return NodeType::Attribute;
        }
        match self.current.kind() {
            NodeKind::Document | NodeKind::Declaration | NodeKind::Doctype => NodeType::Root,
            NodeKind::Element => NodeType::Element,
            NodeKind::Text => NodeType::Text,
            NodeKind::Comment => NodeType::Comment,
        }
    }

    fn local_name(&self) -> &str {
        if let Some(i) = self.attr {
            return &self.current.attributes()[i].local;
        }
        match self.current.kind() {
            NodeKind::Element => self.current.data(),
            _ => "",
        }
    }

    fn prefix(&self) -> &str {
        if let Some(i) = self.attr {
            return &self.current.attributes()[i].prefix;
        }
        match self.current.kind() {
            NodeKind::Element => self.current.prefix(),
            _ => "",
        }
    }

    fn value(&self) -> String {
        if let Some(i) = self.attr {
            return self.current.attributes()[i].value.clone();
        }
        match self.current.kind() {
            NodeKind::Text | NodeKind::Comment => self.current.data().to_string(),
            NodeKind::Element => serialize::inner_text(&self.current),
            _ => String::new(),
        }
    }

    fn move_to_root(&mut self) {
        self.current = self.root;
        self.attr = None;
    }

    fn move_to_parent(&mut self) -> bool {
        if self.attr.take().is_some() {
            return true;
        }
        self.goto(self.current.parent())
    }

    fn move_to_next_attribute(&mut self) -> bool {
        if self.current.kind() != NodeKind::Element {
            return false;
        }
        let next = self.attr.map_or(0, |i| i + 1);
        if next >= self.current.attributes().len() {
            return false;
        }
        self.attr = Some(next);
        true
    }

    fn move_to_child(&mut self) -> bool {
        if self.attr.is_some() {
            return false;
        }
        self.goto(self.current.first_child())
    }

    fn move_to_first(&mut self) -> bool {
        if self.attr.is_some() || self.current.prev_sibling().is_none() {
            return false;
        }
        let mut first = self.current;
        while let Some(prev) = first.prev_sibling() {
            first = prev;
        }
        self.goto(Some(first))
    }

    fn move_to_next(&mut self) -> bool {
        if self.attr.is_some() {
            return false;
        }
        self.goto(self.current.next_sibling())
    }

    fn move_to_previous(&mut self) -> bool {
        if self.attr.is_some() {
            return false;
        }
        self.goto(self.current.prev_sibling())
    }

    fn move_to(&mut self, other: &Self) -> bool {
        if self.root != other.root {
            return false;
        }
        self.current = other.current;
        self.attr = other.attr;
        true
    }

    fn is_same_node(&self, other: &Self) -> bool {
        self.current == other.current && self.attr == other.attr
    }
}
