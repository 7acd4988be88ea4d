//! srcML XML reader
//!
//! Reads srcML text into [`Node`] trees. A srcML document is either a single
//! file `<unit>` or an archive `<unit>` whose child units are the files.

use super::node::{Content, Node};
use super::tags;
use crate::language::Language;
use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::path::Path;

/// Parse a document holding exactly one file unit
pub fn parse_unit(xml: &str) -> Result<Node> {
    let mut root = parse_document(xml)?;
    if !root.is(tags::UNIT) {
        return Err(Error::InvalidInput(format!(
            "expected a <unit> root element, found <{}>",
            root.tag()
        )));
    }
    root.index_positions();
    Ok(root)
}

/// Parse a srcML archive into its file units.
///
/// A document without nested units is treated as a single-file archive.
/// Nested units without a `language` attribute inherit the archive's.
pub fn parse_archive(xml: &str) -> Result<Vec<Node>> {
    let root = parse_document(xml)?;
    if !root.is(tags::UNIT) {
        return Err(Error::InvalidInput(format!(
            "expected a <unit> root element, found <{}>",
            root.tag()
        )));
    }

    if root.element(tags::UNIT).is_none() {
        let mut unit = root;
        unit.index_positions();
        return Ok(vec![unit]);
    }

    let archive_language = root.attribute("language").map(str::to_string);
    let mut units = Vec::new();
    for content in root.into_content() {
        if let Content::Element(mut unit) = content {
            if !unit.is(tags::UNIT) {
                continue;
            }
            if unit.attribute("language").is_none() {
                if let Some(language) = &archive_language {
                    unit.set_attribute("language", language.clone());
                }
            }
            unit.index_positions();
            units.push(unit);
        }
    }
    Ok(units)
}

/// Read and parse a srcML archive from disk
pub fn read_archive(path: &Path) -> Result<Vec<Node>> {
    let xml = std::fs::read_to_string(path)?;
    parse_archive(&xml)
}

/// Wrap a srcML fragment in a file unit for `file_name`.
///
/// Handy for building small inputs by hand; the fragment is parsed exactly
/// as if the translator had produced it.
pub fn unit_for_snippet(snippet: &str, file_name: &str, language: Language) -> Result<Node> {
    let xml = format!(
        r#"<unit xmlns="http://www.sdml.info/srcML/src" xmlns:op="http://www.sdml.info/srcML/operator" xmlns:lit="http://www.sdml.info/srcML/literal" xmlns:type="http://www.sdml.info/srcML/modifier" language="{}" filename="{}">{}</unit>"#,
        language.srcml_name(),
        file_name,
        snippet
    );
    parse_unit(&xml)
}

fn parse_document(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    let mut lines = LineCounter::new(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let node = start_node(&start, lines.line_at(offset))?;
                stack.push(node);
            }
            Ok(Event::Empty(start)) => {
                let node = start_node(&start, lines.line_at(offset))?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                    parent.push_text(text.into_owned());
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(String::from_utf8_lossy(&data.into_inner()).into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Xml(format!(
                    "at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Xml(format!("unclosed element <{}>", open.tag())));
    }
    root.ok_or_else(|| Error::Xml("document has no root element".to_string()))
}

fn start_node(start: &BytesStart<'_>, line: u32) -> Result<Node> {
    let tag = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut node = Node::new(tag);
    node.set_line(line);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| Error::Xml(e.to_string()))?;
        if attribute.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?;
        node.set_attribute(key, value.into_owned());
    }
    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(node);
    } else if root.is_none() {
        *root = Some(node);
    } else {
        return Err(Error::Xml("document has more than one root element".to_string()));
    }
    Ok(())
}

/// Incremental byte offset to line number mapping
struct LineCounter<'a> {
    text: &'a [u8],
    offset: usize,
    line: u32,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> u32 {
        let end = offset.min(self.text.len());
        if end > self.offset {
            let newlines = self.text[self.offset..end].iter().filter(|b| **b == b'\n').count();
            self.line += newlines as u32;
            self.offset = end;
        }
        self.line
    }
}
