//! Lazy iterators that walk each XPath axis by moving cloned cursors.
//!
//! Forward axes yield nodes in document order, reverse axes yield the nearest
//! node first, which is the order proximity positions are counted in.

use crate::ast::Axis;
use crate::navigator::{Navigator, NodeType};

#[derive(Debug)]
enum State<N> {
    Done,
    Once(N),
    Children { cur: N, started: bool },
    Attributes(N),
    Ancestors(N),
    FollowingSiblings(N),
    PrecedingSiblings(N),
    Descendants { cur: N, origin: N },
    Following { cur: N, descend: bool },
    Preceding { cur: N, ancestor: N },
}

/// Yields the cursors reachable from a starting cursor along one axis.
#[derive(Debug)]
pub struct AxisIter<N> {
    state: State<N>,
    pending_self: Option<N>,
}

impl<N: Navigator> AxisIter<N> {
    pub fn new(axis: Axis, start: &N) -> Self {
        let on_attribute = start.node_type() == NodeType::Attribute;
        let mut pending_self = None;
        let state = match axis {
            Axis::SelfAxis => State::Once(start.clone()),
            Axis::Parent => {
                let mut parent = start.clone();
                if parent.move_to_parent() {
                    State::Once(parent)
                } else {
                    State::Done
                }
            }
            Axis::Child => State::Children {
                cur: start.clone(),
                started: false,
            },
            Axis::Attribute if on_attribute => State::Done,
            Axis::Attribute => State::Attributes(start.clone()),
            Axis::Ancestor => State::Ancestors(start.clone()),
            Axis::AncestorOrSelf => {
                pending_self = Some(start.clone());
                State::Ancestors(start.clone())
            }
            Axis::FollowingSibling => State::FollowingSiblings(start.clone()),
            Axis::PrecedingSibling => State::PrecedingSiblings(start.clone()),
            Axis::Descendant => State::Descendants {
                cur: start.clone(),
                origin: start.clone(),
            },
            Axis::DescendantOrSelf => {
                pending_self = Some(start.clone());
                State::Descendants {
                    cur: start.clone(),
                    origin: start.clone(),
                }
            }
            Axis::Following => {
                let mut cur = start.clone();
                // The children of an attribute's element follow the attribute.
                let descend = on_attribute && cur.move_to_parent();
                State::Following { cur, descend }
            }
            Axis::Preceding => {
                let mut cur = start.clone();
                if on_attribute {
                    cur.move_to_parent();
                }
                let mut ancestor = cur.clone();
                if ancestor.move_to_parent() {
                    State::Preceding { cur, ancestor }
                } else {
                    State::Done
                }
            }
        };
        AxisIter {
            state,
            pending_self,
        }
    }
}

impl<N: Navigator> Iterator for AxisIter<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        if let Some(own) = self.pending_self.take() {
            return Some(own);
        }
        let yielded = match &mut self.state {
            State::Done => None,
            State::Once(node) => {
                let node = node.clone();
                self.state = State::Done;
                return Some(node);
            }
            State::Children { cur, started } => {
                let moved = if *started {
                    cur.move_to_next()
                } else {
                    *started = true;
                    cur.move_to_child()
                };
                moved.then(|| cur.clone())
            }
            State::Attributes(cur) => cur.move_to_next_attribute().then(|| cur.clone()),
            State::Ancestors(cur) => cur.move_to_parent().then(|| cur.clone()),
            State::FollowingSiblings(cur) => cur.move_to_next().then(|| cur.clone()),
            State::PrecedingSiblings(cur) => cur.move_to_previous().then(|| cur.clone()),
            State::Descendants { cur, origin } => next_descendant(cur, origin),
            State::Following { cur, descend } => {
                let go_down = *descend;
                *descend = true;
                next_following(cur, go_down)
            }
            State::Preceding { cur, ancestor } => next_preceding(cur, ancestor),
        };
        if yielded.is_none() {
            self.state = State::Done;
        }
        yielded
    }
}

/// Preorder step that never leaves the subtree of `origin`.
fn next_descendant<N: Navigator>(cur: &mut N, origin: &N) -> Option<N> {
    if cur.move_to_child() {
        return Some(cur.clone());
    }
    loop {
        if cur.is_same_node(origin) {
            return None;
        }
        if cur.move_to_next() {
            return Some(cur.clone());
        }
        if !cur.move_to_parent() {
            return None;
        }
    }
}

/// Preorder step continuing to the end of the document.
fn next_following<N: Navigator>(cur: &mut N, descend: bool) -> Option<N> {
    if descend && cur.move_to_child() {
        return Some(cur.clone());
    }
    loop {
        if cur.move_to_next() {
            return Some(cur.clone());
        }
        if !cur.move_to_parent() {
            return None;
        }
    }
}

/// Reverse preorder step. Ancestors of the origin are skipped: `ancestor` is the
/// next one a parent move would land on.
fn next_preceding<N: Navigator>(cur: &mut N, ancestor: &mut N) -> Option<N> {
    loop {
        if cur.move_to_previous() {
            while cur.move_to_child() {
                while cur.move_to_next() {}
            }
            return Some(cur.clone());
        }
        if !cur.move_to_parent() {
            return None;
        }
        if cur.is_same_node(ancestor) {
            ancestor.move_to_parent();
            continue;
        }
        return Some(cur.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::tests::{MockNavigator, create_test_tree};

    fn ids(axis: Axis, start: &MockNavigator) -> Vec<usize> {
        AxisIter::new(axis, start).map(|n| n.id).collect()
    }

    #[test]
    fn test_child_and_descendant_axes() {
        let tree = create_test_tree();
        let root = tree.nav(0);
        assert_eq!(ids(Axis::Child, &root), vec![1, 3, 4, 7]);
        assert_eq!(ids(Axis::Descendant, &root), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ids(Axis::DescendantOrSelf, &tree.nav(4)), vec![4, 5, 6]);
        assert!(ids(Axis::Child, &tree.nav(2)).is_empty());
    }

    #[test]
    fn test_descendant_stays_inside_subtree() {
        let tree = create_test_tree();
        // div has a following sibling; the walk must not reach it.
        assert_eq!(ids(Axis::Descendant, &tree.nav(4)), vec![5, 6]);
        assert!(ids(Axis::Descendant, &tree.nav(6)).is_empty());
    }

    #[test]
    fn test_reverse_axes_yield_nearest_first() {
        let tree = create_test_tree();
        assert_eq!(ids(Axis::Ancestor, &tree.nav(6)), vec![5, 4, 0]);
        assert_eq!(ids(Axis::AncestorOrSelf, &tree.nav(6)), vec![6, 5, 4, 0]);
        assert_eq!(ids(Axis::PrecedingSibling, &tree.nav(7)), vec![4, 3, 1]);
        assert_eq!(ids(Axis::Parent, &tree.nav(5)), vec![4]);
        assert!(ids(Axis::Parent, &tree.nav(0)).is_empty());
    }

    #[test]
    fn test_following_and_preceding() {
        let tree = create_test_tree();
        assert_eq!(ids(Axis::Following, &tree.nav(2)), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(ids(Axis::FollowingSibling, &tree.nav(1)), vec![3, 4, 7]);
        // Ancestors 4 and 0 are not part of the preceding axis.
        assert_eq!(ids(Axis::Preceding, &tree.nav(6)), vec![3, 2, 1]);
        assert_eq!(ids(Axis::Preceding, &tree.nav(8)), vec![6, 5, 4, 3, 2, 1]);
        assert!(ids(Axis::Preceding, &tree.nav(0)).is_empty());
    }

    #[test]
    fn test_attribute_axis() {
        let tree = create_test_tree();
        let attrs: Vec<_> = AxisIter::new(Axis::Attribute, &tree.nav(1))
            .map(|n| (n.local_name().to_string(), n.value()))
            .collect();
        assert_eq!(
            attrs,
            vec![
                ("id".to_string(), "p1".to_string()),
                ("lang".to_string(), "en".to_string())
            ]
        );
        assert!(ids(Axis::Attribute, &tree.nav(4)).is_empty());
    }

    #[test]
    fn test_axes_from_an_attribute() {
        let tree = create_test_tree();
        let mut attr = tree.nav(1);
        assert!(attr.move_to_next_attribute());

        assert_eq!(ids(Axis::Parent, &attr), vec![1]);
        assert!(ids(Axis::Child, &attr).is_empty());
        assert!(ids(Axis::Attribute, &attr).is_empty());
        assert!(ids(Axis::FollowingSibling, &attr).is_empty());
        // The element's content follows its attributes.
        assert_eq!(ids(Axis::Following, &attr)[..2], [2, 3]);
    }
}
