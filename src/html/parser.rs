//! Imports an html5ever `RcDom` into the arena.
use super::node::{HtmlDocument, HtmlNodeType};
use crate::error::ParseError;
use crate::tree::{Arena, Attribute, NodeData, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData as DomData, RcDom};
use std::io::Read;

pub(crate) fn parse_reader<R: Read>(mut source: R) -> Result<HtmlDocument, ParseError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut source)?;
    let arena = import(&dom.document);
    log::debug!("Built HTML document with {} nodes", arena.len());
    Ok(HtmlDocument::from_arena(arena))
}

/// Copies the DOM below `document` into a fresh arena, depth first.
/// Processing instructions have no counterpart in the tree and are skipped.
fn import(document: &Handle) -> Arena<HtmlNodeType> {
    let mut arena = Arena::new(NodeData::new(HtmlNodeType::Document, ""));
    let mut stack: Vec<(Handle, NodeId)> = document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), arena.root()))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let Some(node) = convert(&handle) else {
            continue;
        };
        let id = arena.append_child(parent, node);
        for child in handle.children.borrow().iter().rev() {
            stack.push((child.clone(), id));
        }
    }
    arena
}

fn convert(handle: &Handle) -> Option<NodeData<HtmlNodeType>> {
    match &handle.data {
        DomData::Document => None,
        DomData::Doctype { name, .. } => Some(NodeData::new(HtmlNodeType::Doctype, name.to_string())),
        DomData::Text { contents } => Some(NodeData::new(
            HtmlNodeType::Text,
            contents.borrow().to_string(),
        )),
        DomData::Comment { contents } => {
            Some(NodeData::new(HtmlNodeType::Comment, contents.to_string()))
        }
        DomData::Element { name, attrs, .. } => {
            let mut node = NodeData::new(HtmlNodeType::Element, &*name.local);
            node.namespace_uri = name.ns.to_string();
            node.attributes = attrs
                .borrow()
                .iter()
                .map(|a| {
                    let local: &str = &a.name.local;
                    match &a.name.prefix {
                        Some(prefix) => Attribute::new(&**prefix, local, a.value.to_string()),
                        None => {
                            let (prefix, local) = local.split_once(':').unwrap_or(("", local));
                            Attribute::new(prefix, local, a.value.to_string())
                        }
                    }
                })
                .collect();
            Some(node)
        }
        DomData::ProcessingInstruction { .. } => None,
    }
}
