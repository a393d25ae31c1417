// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal element tree for the vendor's management dialect.
//!
//! Replies are routed by tag name only: no schema, no namespace awareness.
//! Namespace noise is removed textually before parsing so tag lookups never
//! see prefixed or qualified names.

use std::sync::LazyLock;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;

use crate::error::BootError;

#[allow(clippy::expect_used)]
static XMLNS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*xmlns(?::[A-Za-z0-9_.-]+)?="[^"]*""#).expect("static pattern compiles")
});

/// Remove `xmlns` attribute declarations from a line of XML text.
///
/// Runs to a fixpoint so the transform is idempotent even on degenerate
/// input where a removal would expose a new declaration.
pub fn strip_xmlns(line: &str) -> String {
    let mut text = line.to_string();
    loop {
        let next = XMLNS_ATTR.replace_all(&text, "").into_owned();
        if next == text {
            return text;
        }
        text = next;
    }
}

/// Remove the vendor `junos:` namespace prefix everywhere in a line.
///
/// Fixpoint for the same reason as [`strip_xmlns`].
pub fn strip_junos_prefix(line: &str) -> String {
    let mut text = line.to_string();
    loop {
        let next = text.replace("junos:", "");
        if next == text {
            return text;
        }
        text = next;
    }
}

/// One element of a parsed reply: tag name, attributes, child elements and
/// accumulated text content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// First direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search over self and all descendants.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Trimmed text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    /// Trimmed text of the first matching descendant.
    pub fn find_text(&self, name: &str) -> Option<&str> {
        self.find(name).map(|c| c.text.trim())
    }

    /// Consume the element and return its first child, if any.
    pub fn into_first_child(mut self) -> Option<Element> {
        if self.children.is_empty() {
            None
        } else {
            Some(self.children.remove(0))
        }
    }

    /// Serialize without whitespace, suitable for the wire.
    pub fn to_xml(&self) -> Result<String, BootError> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(|e| BootError::Xml(e.to_string()))
    }

    /// Serialize with two-space indentation, suitable for saving to disk.
    pub fn to_pretty_xml(&self) -> Result<String, BootError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(|e| BootError::Xml(e.to_string()))
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &Element,
) -> Result<(), BootError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() && element.text.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(io_to_xml)?;
        return Ok(());
    }
    writer.write_event(Event::Start(start)).map_err(io_to_xml)?;
    if !element.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.text))).map_err(io_to_xml)?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str()))).map_err(io_to_xml)?;
    Ok(())
}

fn io_to_xml(err: quick_xml::Error) -> BootError {
    BootError::Xml(err.to_string())
}

/// Parse a complete XML document into an [`Element`] tree.
///
/// Comments, processing instructions and declarations are discarded; CDATA
/// and text nodes accumulate on the enclosing element.
pub fn parse(input: &str) -> Result<Element, BootError> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let unescaped = text.unescape().map_err(|e| BootError::Xml(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| BootError::Xml("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(BootError::Xml(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(BootError::Xml("unclosed element at end of input".to_string()));
    }
    root.ok_or_else(|| BootError::Xml("no root element".to_string()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, BootError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| BootError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value =
            attr.unescape_value().map_err(|e| BootError::Xml(e.to_string()))?.into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), BootError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                return Err(BootError::Xml("multiple root elements".to_string()));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
