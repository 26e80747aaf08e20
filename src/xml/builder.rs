//! Incremental construction of an `XmlDocument`.
//!
//! The builder knows nothing about XML syntax. A driver (the quick-xml event
//! loop in `parser.rs`, or user code) feeds it start/end/text/comment events
//! and it links the nodes, tracks namespace bindings and enforces the
//! declaration rules.

use super::node::{XmlDocument, XmlNodeType};
use crate::error::ParseError;
use crate::tree::{Arena, Attribute, NodeData, NodeId};
use std::collections::HashMap;

/// Builds an `XmlDocument` one event at a time.
///
/// `position` arguments are byte offsets used only for error reporting.
#[derive(Debug)]
pub struct XmlTreeBuilder {
    arena: Arena<XmlNodeType>,
    /// Open elements, innermost last, with the bindings each one shadowed.
    open: Vec<(NodeId, Vec<(String, Option<String>)>)>,
    prefix_to_uri: HashMap<String, String>,
    uri_to_prefix: HashMap<String, String>,
    declared: bool,
    /// Set while consecutive character data is being merged into one node.
    open_text: Option<NodeId>,
}

impl Default for XmlTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTreeBuilder {
    pub fn new() -> Self {
        XmlTreeBuilder {
            arena: Arena::new(NodeData::new(XmlNodeType::Document, "")),
            open: Vec::new(),
            prefix_to_uri: HashMap::new(),
            uri_to_prefix: HashMap::new(),
            declared: false,
            open_text: None,
        }
    }

    fn current(&self) -> NodeId {
        self.open
            .last()
            .map(|(id, _)| *id)
            .unwrap_or(self.arena.root())
    }

    fn at_document_level(&self) -> bool {
        self.open.is_empty()
    }

    /// Appends the `<?xml ...?>` declaration. It must come before any other
    /// node and before the first element, and only once.
    pub fn declaration(
        &mut self,
        attributes: Vec<Attribute>,
        position: u64,
    ) -> Result<NodeId, ParseError> {
        if self.declared {
            return Err(ParseError::malformed(
                "XML declaration appears more than once",
                position,
            ));
        }
        if self.arena.get(self.arena.root()).first_child.is_some() {
            return Err(ParseError::malformed(
                "XML declaration must be the first node",
                position,
            ));
        }
        self.declared = true;
        self.open_text = None;
        let mut node = NodeData::new(XmlNodeType::Declaration, "");
        node.attributes = attributes;
        Ok(self.arena.append_child(self.arena.root(), node))
    }

    /// Rejects a processing instruction. Only the declaration is kept, and
    /// any other instruction makes the document malformed.
    pub fn processing_instruction(&self, target: &str, position: u64) -> Result<(), ParseError> {
        let reason = if self.declared {
            format!("unexpected processing instruction '{target}'")
        } else {
            format!("expected an XML declaration, found processing instruction '{target}'")
        };
        Err(ParseError::malformed(reason, position))
    }

    /// Opens an element named `name` (`local` or `prefix:local`) and makes it
    /// the parent of subsequent nodes.
    ///
    /// `xmlns` attributes on the element are registered before the element's
    /// own prefix is resolved, so `<x:a xmlns:x="u">` binds `x` to `u`.
    pub fn start_element(
        &mut self,
        name: &str,
        attributes: Vec<Attribute>,
        position: u64,
    ) -> Result<NodeId, ParseError> {
        if !self.declared {
            return Err(ParseError::malformed(
                format!("element <{name}> before the XML declaration"),
                position,
            ));
        }
        self.open_text = None;

        let mut shadowed = Vec::new();
        for attr in &attributes {
            if attr.prefix == "xmlns" {
                shadowed.push(self.bind(&attr.local, &attr.value));
            } else if attr.prefix.is_empty() && attr.local == "xmlns" {
                shadowed.push(self.bind("", &attr.value));
            }
        }

        let (raw_prefix, local) = match name.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", name),
        };
        let mut node = NodeData::new(XmlNodeType::Element, local);
        match self.prefix_to_uri.get(raw_prefix) {
            Some(uri) => {
                node.prefix = self.uri_to_prefix.get(uri).cloned().unwrap_or_default();
                node.namespace_uri = uri.clone();
            }
            None => node.prefix = raw_prefix.to_string(),
        }
        node.attributes = attributes;

        let id = self.arena.append_child(self.current(), node);
        self.open.push((id, shadowed));
        log::trace!("Opened <{name}> at depth {}", self.open.len());
        Ok(id)
    }

    /// Binds `prefix` to `uri` and returns the binding it replaced.
    fn bind(&mut self, prefix: &str, uri: &str) -> (String, Option<String>) {
        if !prefix.is_empty() {
            self.uri_to_prefix.insert(uri.to_string(), prefix.to_string());
        }
        let previous = self
            .prefix_to_uri
            .insert(prefix.to_string(), uri.to_string());
        (prefix.to_string(), previous)
    }

    /// Closes the innermost open element.
    pub fn end_element(&mut self, position: u64) -> Result<(), ParseError> {
        self.open_text = None;
        match self.open.pop() {
            Some((_, shadowed)) => {
                for (prefix, previous) in shadowed.into_iter().rev() {
                    match previous {
                        Some(uri) => self.prefix_to_uri.insert(prefix, uri),
                        None => self.prefix_to_uri.remove(&prefix),
                    };
                }
                Ok(())
            }
            None => Err(ParseError::malformed(
                "end tag without a matching start tag",
                position,
            )),
        }
    }

    /// Appends character data. Consecutive calls with no other event in
    /// between extend the same text node.
    ///
    /// Whitespace-only text outside the document element is dropped.
    pub fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(id) = self.open_text {
            self.arena.get_mut(id).data.push_str(text);
            return;
        }
        if self.at_document_level() && text.trim().is_empty() {
            return;
        }
        let id = self
            .arena
            .append_child(self.current(), NodeData::new(XmlNodeType::Text, text));
        self.open_text = Some(id);
    }

    pub fn comment(&mut self, text: &str) -> NodeId {
        self.open_text = None;
        self.arena
            .append_child(self.current(), NodeData::new(XmlNodeType::Comment, text))
    }

    /// Finishes the document. Elements still open at this point stay in the
    /// tree as they are; closing tags are not required at end of input.
    pub fn finish(self) -> XmlDocument {
        if let Some((id, _)) = self.open.last() {
            log::warn!(
                "End of input with {} element(s) still open, innermost <{}>",
                self.open.len(),
                self.arena.get(*id).data
            );
        }
        log::debug!("Built XML document with {} nodes", self.arena.len());
        XmlDocument::from_arena(self.arena)
    }
}
