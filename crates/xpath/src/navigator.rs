//! Defines the cursor contract the evaluator walks trees through.

/// The type of the node under a cursor, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
}

/// A movable cursor over a read-only tree.
///
/// The engine never sees concrete nodes. It clones cursors, moves them around
/// and asks them about the node they are positioned on. Every `move_*` method
/// returns `true` on success and leaves the cursor untouched when it returns
/// `false`.
///
/// While positioned on an attribute, a cursor reports `NodeType::Attribute`
/// and the attribute's name and value; `move_to_parent` returns to the owning
/// element.
pub trait Navigator: Clone + std::fmt::Debug {
    fn node_type(&self) -> NodeType;

    /// The local part of the element or attribute name, empty for other nodes.
    fn local_name(&self) -> &str;

    /// The namespace prefix of the element or attribute, empty if none.
    fn prefix(&self) -> &str;

    /// The value of the node under the cursor.
    /// - For a text or comment node, this is its content.
    /// - For an element, this is the concatenation of its descendant text.
    /// - For an attribute, this is its value.
    fn value(&self) -> String;

    fn move_to_root(&mut self);
    fn move_to_parent(&mut self) -> bool;

    /// Steps through the attributes of the current element, starting from the
    /// element itself. Fails once the last attribute is reached.
    fn move_to_next_attribute(&mut self) -> bool;

    fn move_to_child(&mut self) -> bool;

    /// Moves to the first sibling. Fails if the cursor is already on it.
    fn move_to_first(&mut self) -> bool;
    fn move_to_next(&mut self) -> bool;
    fn move_to_previous(&mut self) -> bool;

    /// Moves to the position of `other`. Fails if the two cursors do not share
    /// a root.
    fn move_to(&mut self, other: &Self) -> bool;

    /// True if both cursors are positioned on the same node (or attribute).
    fn is_same_node(&self, other: &Self) -> bool;
}

// Test utilities - publicly available for integration testing in downstream crates
pub mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct MockNodeData {
        node_type: NodeType,
        prefix: &'static str,
        name: &'static str,
        text: &'static str,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<(&'static str, &'static str, &'static str)>,
    }

    #[derive(Debug)]
    pub struct MockTree {
        nodes: Vec<MockNodeData>,
    }

    /// A cursor over a `MockTree`. `attr` is the attribute index when the cursor
    /// sits on an attribute.
    #[derive(Debug, Clone, Copy)]
    pub struct MockNavigator<'a> {
        pub tree: &'a MockTree,
        pub id: usize,
        pub attr: Option<usize>,
    }

    impl MockTree {
        fn add(
            &mut self,
            parent: Option<usize>,
            node_type: NodeType,
            prefix: &'static str,
            name: &'static str,
            text: &'static str,
        ) -> usize {
            let id = self.nodes.len();
            self.nodes.push(MockNodeData {
                node_type,
                prefix,
                name,
                text,
                parent,
                children: vec![],
                attributes: vec![],
            });
            if let Some(p) = parent {
                self.nodes[p].children.push(id);
            }
            id
        }

        /// A cursor positioned on node `id`.
        pub fn nav(&self, id: usize) -> MockNavigator<'_> {
            MockNavigator {
                tree: self,
                id,
                attr: None,
            }
        }

        fn text_of(&self, id: usize, out: &mut String) {
            let node = &self.nodes[id];
            match node.node_type {
                NodeType::Text => out.push_str(node.text),
                NodeType::Element | NodeType::Root => {
                    for &child in &node.children {
                        self.text_of(child, out);
                    }
                }
                _ => {}
            }
        }

        fn sibling_index(&self, id: usize) -> Option<(usize, usize)> {
            let parent = self.nodes[id].parent?;
            let position = self.nodes[parent].children.iter().position(|&c| c == id)?;
            Some((parent, position))
        }
    }

    impl<'a> MockNavigator<'a> {
        fn data(&self) -> &'a MockNodeData {
            &self.tree.nodes[self.id]
        }
    }

    impl Navigator for MockNavigator<'_> {
        fn node_type(&self) -> NodeType {
            if self.attr.is_some() {
                NodeType::Attribute
            } else {
                self.data().node_type
            }
        }

        fn local_name(&self) -> &str {
            match self.attr {
                Some(i) => self.data().attributes[i].1,
                None => self.data().name,
            }
        }

        fn prefix(&self) -> &str {
            match self.attr {
                Some(i) => self.data().attributes[i].0,
                None => self.data().prefix,
            }
        }

        fn value(&self) -> String {
            if let Some(i) = self.attr {
                return self.data().attributes[i].2.to_string();
            }
            match self.data().node_type {
                NodeType::Element => {
                    let mut out = String::new();
                    self.tree.text_of(self.id, &mut out);
                    out
                }
                NodeType::Text | NodeType::Comment => self.data().text.to_string(),
                _ => String::new(),
            }
        }

        fn move_to_root(&mut self) {
            self.id = 0;
            self.attr = None;
        }

        fn move_to_parent(&mut self) -> bool {
            if self.attr.is_some() {
                self.attr = None;
                return true;
            }
            match self.data().parent {
                Some(p) => {
                    self.id = p;
                    true
                }
                None => false,
            }
        }

        fn move_to_next_attribute(&mut self) -> bool {
            let data = self.data();
            if data.node_type != NodeType::Element {
                return false;
            }
            let next = self.attr.map_or(0, |i| i + 1);
            if next >= data.attributes.len() {
                return false;
            }
            self.attr = Some(next);
            true
        }

        fn move_to_child(&mut self) -> bool {
            if self.attr.is_some() {
                return false;
            }
            match self.data().children.first() {
                Some(&c) => {
                    self.id = c;
                    true
                }
                None => false,
            }
        }

        fn move_to_first(&mut self) -> bool {
            if self.attr.is_some() {
                return false;
            }
            match self.tree.sibling_index(self.id) {
                Some((parent, position)) if position > 0 => {
                    self.id = self.tree.nodes[parent].children[0];
                    true
                }
                _ => false,
            }
        }

        fn move_to_next(&mut self) -> bool {
            if self.attr.is_some() {
                return false;
            }
            match self.tree.sibling_index(self.id) {
                Some((parent, position)) => match self.tree.nodes[parent].children.get(position + 1) {
                    Some(&next) => {
                        self.id = next;
                        true
                    }
                    None => false,
                },
                None => false,
            }
        }

        fn move_to_previous(&mut self) -> bool {
            if self.attr.is_some() {
                return false;
            }
            match self.tree.sibling_index(self.id) {
                Some((parent, position)) if position > 0 => {
                    self.id = self.tree.nodes[parent].children[position - 1];
                    true
                }
                _ => false,
            }
        }

        fn move_to(&mut self, other: &Self) -> bool {
            if !std::ptr::eq(self.tree, other.tree) {
                return false;
            }
            self.id = other.id;
            self.attr = other.attr;
            true
        }

        fn is_same_node(&self, other: &Self) -> bool {
            std::ptr::eq(self.tree, other.tree) && self.id == other.id && self.attr == other.attr
        }
    }

    /// Creates a simple mock tree for testing:
    /// ```text
    /// (root)                                      id 0
    ///   <para id="p1" xml:lang="en">Hello</para>  id 1, text 2
    ///   <!-- comment node -->                     id 3
    ///   <div><span>x</span></div>                 id 4, span 5, text 6
    ///   <para>World</para>                        id 7, text 8
    /// ```
    pub fn create_test_tree() -> MockTree {
        let mut tree = MockTree { nodes: vec![] };
        let root = tree.add(None, NodeType::Root, "", "", "");
        let para = tree.add(Some(root), NodeType::Element, "", "para", "");
        tree.nodes[para].attributes = vec![("", "id", "p1"), ("xml", "lang", "en")];
        tree.add(Some(para), NodeType::Text, "", "", "Hello");
        tree.add(Some(root), NodeType::Comment, "", "", " comment node ");
        let div = tree.add(Some(root), NodeType::Element, "", "div", "");
        let span = tree.add(Some(div), NodeType::Element, "", "span", "");
        tree.add(Some(span), NodeType::Text, "", "", "x");
        let para2 = tree.add(Some(root), NodeType::Element, "", "para", "");
        tree.add(Some(para2), NodeType::Text, "", "", "World");
        tree
    }
}
