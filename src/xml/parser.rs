//! A "dumb" XML driver: reads quick-xml events and feeds them to an
//! `XmlTreeBuilder`.
use super::builder::XmlTreeBuilder;
use super::node::XmlDocument;
use crate::error::ParseError;
use crate::tree::Attribute;
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesDecl, BytesStart, Event as XmlEvent};
use std::io::BufRead;

pub(crate) fn parse_str(source: &str) -> Result<XmlDocument, ParseError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);
    build(reader)
}

pub(crate) fn parse_reader<R: BufRead>(source: R) -> Result<XmlDocument, ParseError> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(false);
    build(reader)
}

fn utf8(bytes: &[u8], pos: u64) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| ParseError::malformed(e.to_string(), pos))
}

fn build<R: BufRead>(mut reader: Reader<R>) -> Result<XmlDocument, ParseError> {
    let mut builder = XmlTreeBuilder::new();
    let mut buf = Vec::new();

    loop {
        let pos = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ParseError::malformed(e.to_string(), reader.buffer_position()))?;
        log::trace!("XML event at byte {pos}: {event:?}");
        match event {
            XmlEvent::Decl(e) => {
                builder.declaration(declaration_attributes(&e, pos)?, pos)?;
            }
            XmlEvent::PI(e) => {
                builder.processing_instruction(utf8(e.target(), pos)?, pos)?;
            }
            XmlEvent::Start(e) => {
                let name = utf8(e.name().as_ref(), pos)?.to_string();
                let attributes = element_attributes(&e, &reader, pos)?;
                builder.start_element(&name, attributes, pos)?;
            }
            XmlEvent::Empty(e) => {
                let name = utf8(e.name().as_ref(), pos)?.to_string();
                let attributes = element_attributes(&e, &reader, pos)?;
                builder.start_element(&name, attributes, pos)?;
                builder.end_element(pos)?;
            }
            XmlEvent::End(_) => builder.end_element(pos)?,
            XmlEvent::Text(e) => {
                let raw_text = utf8(&e, pos)?;
                let text = unescape(raw_text).map_err(|e| ParseError::malformed(e.to_string(), pos))?;
                builder.text(&text);
            }
            XmlEvent::CData(e) => builder.text(utf8(&e, pos)?),
            XmlEvent::GeneralRef(e) => {
                let char_ref = e
                    .resolve_char_ref()
                    .map_err(|err| ParseError::malformed(err.to_string(), pos))?;
                match char_ref {
                    Some(c) => builder.text(c.encode_utf8(&mut [0; 4])),
                    None => builder.text(predefined_entity(utf8(&e, pos)?, pos)?),
                }
            }
            XmlEvent::Comment(e) => {
                builder.comment(utf8(&e, pos)?);
            }
            XmlEvent::DocType(_) => {}
            XmlEvent::Eof => break,
        }
        buf.clear();
    }

    Ok(builder.finish())
}

/// The replacement text of one of the five predefined entities.
fn predefined_entity(name: &str, pos: u64) -> Result<&'static str, ParseError> {
    resolve_predefined_entity(name)
        .ok_or_else(|| ParseError::malformed(format!("unknown entity '&{name};'"), pos))
}

fn element_attributes<R>(
    e: &BytesStart<'_>,
    reader: &Reader<R>,
    pos: u64,
) -> Result<Vec<Attribute>, ParseError> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::malformed(e.to_string(), pos))?;
        let key = utf8(attr.key.as_ref(), pos)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| ParseError::malformed(e.to_string(), pos))?;
        let (prefix, local) = key.split_once(':').unwrap_or(("", key));
        attributes.push(Attribute::new(prefix, local, value));
    }
    Ok(attributes)
}

/// The declaration's pseudo-attributes, in the order XML allows them.
fn declaration_attributes(e: &BytesDecl<'_>, pos: u64) -> Result<Vec<Attribute>, ParseError> {
    let malformed = |e: &dyn std::fmt::Display| ParseError::malformed(e.to_string(), pos);
    let mut attributes = Vec::new();
    let version = e.version().map_err(|e| malformed(&e))?;
    attributes.push(Attribute::new("", "version", utf8(&version, pos)?));
    if let Some(encoding) = e.encoding() {
        let encoding = encoding.map_err(|e| malformed(&e))?;
        attributes.push(Attribute::new("", "encoding", utf8(&encoding, pos)?));
    }
    if let Some(standalone) = e.standalone() {
        let standalone = standalone.map_err(|e| malformed(&e))?;
        attributes.push(Attribute::new("", "standalone", utf8(&standalone, pos)?));
    }
    Ok(attributes)
}
