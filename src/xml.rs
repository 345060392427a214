//! Owned XML element tree
//!
//! The API description is small enough to hold in memory, and both the model
//! builder and the linter walk it several times, so the `quick-xml` event
//! stream is collected into a plain tree first. Text and comments carry no
//! information in this format and are dropped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ApiError, Result};

/// Deepest element nesting accepted in a document, root included.
///
/// Dropping, cloning and comparing an `XmlElement` recurse once per level, so
/// trees are never allowed to grow past this.
pub const MAX_DOCUMENT_DEPTH: usize = 1024;

/// A single XML element with its attributes (in document order) and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute lookup that fails with `MissingAttribute` naming this element.
    pub fn require_attr(&self, key: &'static str) -> Result<&str> {
        self.attr(key).ok_or_else(|| ApiError::MissingAttribute {
            element: self.short_desc(),
            attribute: key,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }

    /// Tag without its namespace prefix (`xi:include` -> `include`)
    pub fn local_name(&self) -> &str {
        self.tag.rsplit(':').next().unwrap_or(&self.tag)
    }

    /// Direct children with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// All elements below this one, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// All elements below this one with the given tag, in document order.
    pub fn descendants_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.descendants().filter(move |e| e.tag == tag)
    }

    /// Number of levels in this subtree; a lone element has height 1.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((element, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(element.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Short description used in diagnostics, e.g. `<enum name="ONE">`.
    pub fn short_desc(&self) -> String {
        match self.name() {
            Some(name) => format!("<{} name=\"{}\">", self.tag, name),
            None => format!("<{}>", self.tag),
        }
    }
}

/// Pre-order walk over an element's subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// Parse a complete document and return its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut open: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let element = element_from_start(e)?;
                check_depth(open.len() + 1, &element)?;
                open.push(element);
            }
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e)?;
                check_depth(open.len() + 1, &element)?;
                attach(&mut open, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = open
                    .pop()
                    .ok_or_else(|| ApiError::xml("end tag without a matching start tag"))?;
                attach(&mut open, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ApiError::xml(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(ApiError::xml(format!("unclosed element {}", unclosed.short_desc())));
    }
    root.ok_or_else(|| ApiError::xml("document has no root element"))
}

fn check_depth(depth: usize, element: &XmlElement) -> Result<()> {
    if depth > MAX_DOCUMENT_DEPTH {
        return Err(ApiError::xml(format!(
            "{} nested more than {} levels deep",
            element.short_desc(),
            MAX_DOCUMENT_DEPTH
        )));
    }
    Ok(())
}

fn attach(open: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(ApiError::xml(format!(
                "second root element {}",
                element.short_desc()
            )));
        }
    }
    Ok(())
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
    let tag = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| ApiError::xml(format!("Invalid tag name: {err}")))?
        .to_string();

    let mut element = XmlElement::new(tag);
    for attr_result in e.attributes() {
        let attr = attr_result
            .map_err(|err| ApiError::xml(format!("Attribute error in <{}>: {err}", element.tag)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| ApiError::xml(format!("Attribute key error: {err}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ApiError::xml(format!("Attribute value error: {err}")))?
            .to_string();
        element.attributes.push((key, value));
    }
    Ok(element)
}
