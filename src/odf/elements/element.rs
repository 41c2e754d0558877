//! Base Element class for ODF XML elements.
//!
//! [`Element`] is the generic tree node every table wrapper is built on: a
//! tag, an attribute map, text content and ordered children. It is loaded
//! from XML with quick-xml and written back with [`Element::to_xml_string`].
//!
//! Mixed content keeps its order: an element's own text is what precedes
//! its first child, and each child carries the text that follows it up to
//! the next sibling as its tail.
//!
//! Elements have no parent pointers. Positions inside a tree are expressed
//! as a [`NodePath`], the child indices leading from an ancestor down to the
//! node, which stays valid until that ancestor's children are reshuffled.

use crate::common::xml::{push_escaped, resolve_entity};
use crate::common::{Error, Result};
use crate::odf::elements::tag_matcher::{TableTag, match_tag};
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::str::FromStr;

/// Child indices from an ancestor down to a descendant.
pub type NodePath = SmallVec<[usize; 4]>;

/// Base trait for all ODF elements
pub trait ElementBase {
    /// Get the tag name of this element
    fn tag_name(&self) -> &str;

    /// Get the attributes of this element
    fn attributes(&self) -> &HashMap<String, String>;

    /// Get a mutable reference to attributes
    fn attributes_mut(&mut self) -> &mut HashMap<String, String>;

    /// Get attribute value by name
    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes().get(name).map(|s| s.as_str())
    }

    /// Set attribute value
    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Remove attribute, returning its previous value
    fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes_mut().remove(name)
    }

    /// Check if element has attribute
    fn has_attribute(&self, name: &str) -> bool {
        self.attributes().contains_key(name)
    }

    /// Get boolean attribute value
    fn get_bool_attribute(&self, name: &str) -> Option<bool> {
        self.get_attribute(name).and_then(|s| match s {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        })
    }

    /// Get numeric attribute value
    fn get_numeric_attribute(&self, name: &str) -> Option<f64> {
        self.get_attribute(name)
            .and_then(|s| fast_float2::parse::<f64, _>(s.trim()).ok())
    }
}

/// Concrete ODF element: tag, attributes, text and ordered children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag_name: String,
    attributes: HashMap<String, String>,
    text_content: String,
    tail: String,
    pub(crate) children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attributes: HashMap::new(),
            text_content: String::new(),
            tail: String::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child appender
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style text setter
    pub fn with_text(mut self, text: &str) -> Self {
        self.text_content = text.to_string();
        self
    }

    /// Dispatch kind of this element's tag
    #[inline]
    pub fn tag(&self) -> TableTag {
        match_tag(self.tag_name.as_bytes())
    }

    /// Whether the element has the given qualified tag name
    #[inline]
    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }

    /// Rename the element, keeping attributes and children
    pub fn set_tag_name(&mut self, tag_name: &str) {
        self.tag_name.clear();
        self.tag_name.push_str(tag_name);
    }

    /// Builder-style tail setter
    pub fn with_tail(mut self, tail: &str) -> Self {
        self.tail = tail.to_string();
        self
    }

    /// Own text before the first child (without descendants)
    pub fn text(&self) -> &str {
        &self.text_content
    }

    /// Replace own text content
    pub fn set_text(&mut self, text: &str) {
        self.text_content = text.to_string();
    }

    /// Text following this element inside its parent
    pub fn tail(&self) -> &str {
        &self.tail
    }

    /// Replace the text following this element
    pub fn set_tail(&mut self, tail: &str) {
        self.tail = tail.to_string();
    }

    /// Get text recursively from this element and all children, in
    /// document order. The element's own tail is not included.
    pub fn get_text_recursive(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text_content);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }

    /// Text sink for content read after the current last child
    fn text_sink(&mut self) -> &mut String {
        match self.children.last_mut() {
            Some(child) => &mut child.tail,
            None => &mut self.text_content,
        }
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Insert a child element at `index` (`index <= len`)
    pub fn insert_child(&mut self, index: usize, child: Element) {
        self.children.insert(index, child);
    }

    /// Insert several children starting at `index`, keeping their order
    pub fn insert_children<I>(&mut self, index: usize, children: I)
    where
        I: IntoIterator<Item = Element>,
    {
        self.children.splice(index..index, children);
    }

    /// Remove and return the child at `index`
    pub fn remove_child(&mut self, index: usize) -> Element {
        self.children.remove(index)
    }

    /// Replace the child at `index`, returning the previous one
    pub fn replace_child(&mut self, index: usize, child: Element) -> Element {
        std::mem::replace(&mut self.children[index], child)
    }

    /// Remove all children and return them
    pub fn take_children(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.children)
    }

    /// Get children
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Get mutable children
    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    /// Number of direct children
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Follow `path` down from this element
    pub fn node_at(&self, path: &[usize]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Follow `path` down from this element, mutably
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Create element from XML text
    pub fn parse(xml: &str) -> Result<Self> {
        Self::from_bytes(xml.as_bytes())
    }

    /// Create element from XML bytes.
    ///
    /// The first root element is returned. Whitespace-only text directly
    /// inside table structure elements is dropped; inside paragraphs and
    /// other content it is kept. Entity and character references are
    /// resolved.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = quick_xml::Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => stack.push(Self::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Self::from_start(e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                },
                Event::Text(ref t) => {
                    // Indentation between structure elements is not content
                    let blank = t.iter().all(u8::is_ascii_whitespace);
                    if let Some(current) = stack.last_mut()
                        && !(blank && current.tag().is_structural())
                    {
                        current.text_sink().push_str(&String::from_utf8(t.to_vec())?);
                    }
                },
                Event::CData(ref t) => {
                    if let Some(current) = stack.last_mut() {
                        current.text_sink().push_str(&String::from_utf8(t.to_vec())?);
                    }
                },
                Event::GeneralRef(ref r) => {
                    if let Some(current) = stack.last_mut() {
                        let name = String::from_utf8(r.to_vec())?;
                        let sink = current.text_sink();
                        match resolve_entity(&name) {
                            Some(ch) => sink.push(ch),
                            None => {
                                sink.push('&');
                                sink.push_str(&name);
                                sink.push(';');
                            },
                        }
                    }
                },
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(element),
                            None => return Ok(element),
                        }
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Err(Error::XmlError("No root element found".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let tag_name = String::from_utf8(start.name().as_ref().to_vec())?;
        let mut element = Element::new(&tag_name);

        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8(attr.key.as_ref().to_vec())?;
            let value = attr
                .unescape_value()
                .map_err(|e| Error::XmlError(format!("Invalid value for '{}': {}", key, e)))?;
            element.attributes.insert(key, value.into_owned());
        }

        Ok(element)
    }

    /// Serialize element to XML string.
    ///
    /// Attributes are written in lexical order so output is deterministic.
    pub fn to_xml_string(&self) -> String {
        let mut xml = String::with_capacity(256);
        self.write_xml(&mut xml);
        xml
    }

    fn write_xml(&self, output: &mut String) {
        output.push('<');
        output.push_str(&self.tag_name);

        let mut keys: SmallVec<[&String; 8]> = self.attributes.keys().collect();
        keys.sort_unstable();
        for key in keys {
            output.push(' ');
            output.push_str(key);
            output.push_str("=\"");
            push_escaped(output, &self.attributes[key]);
            output.push('"');
        }

        if self.children.is_empty() && self.text_content.is_empty() {
            output.push_str("/>");
            return;
        }

        output.push('>');
        push_escaped(output, &self.text_content);
        for child in &self.children {
            child.write_xml(output);
            push_escaped(output, &child.tail);
        }
        output.push_str("</");
        output.push_str(&self.tag_name);
        output.push('>');
    }
}

impl FromStr for Element {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl ElementBase for Element {
    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_and_empty_elements() {
        let root = Element::parse(
            r#"<table:table table:name="T">
                 <table:table-row>
                   <table:table-cell office:value-type="string"><text:p>a &amp; b</text:p></table:table-cell>
                   <table:table-cell/>
                 </table:table-row>
               </table:table>"#,
        )
        .unwrap();

        assert_eq!(root.tag_name(), "table:table");
        assert_eq!(root.get_attribute("table:name"), Some("T"));
        assert_eq!(root.child_count(), 1);

        let row = &root.children()[0];
        assert_eq!(row.tag(), TableTag::Row);
        assert_eq!(row.child_count(), 2);
        assert_eq!(row.children()[0].get_text_recursive(), "a & b");
        assert_eq!(row.children()[1].child_count(), 0);
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let el = Element::parse(r#"<table:table-cell table:formula="of:=[.A1]&lt;2"/>"#).unwrap();
        assert_eq!(el.get_attribute("table:formula"), Some("of:=[.A1]<2"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let el = Element::new("table:table-cell")
            .with_attribute("office:value-type", "string")
            .with_attribute("office:string-value", "x<y")
            .with_child(Element::new("text:p").with_text("x<y"));
        let xml = el.to_xml_string();
        assert_eq!(
            xml,
            r#"<table:table-cell office:string-value="x&lt;y" office:value-type="string"><text:p>x&lt;y</text:p></table:table-cell>"#
        );
        assert_eq!(Element::parse(&xml).unwrap(), el);
    }

    #[test]
    fn test_mixed_content_keeps_order() {
        let xml = r#"<text:p>Hello <text:span>big</text:span> world</text:p>"#;
        let p = Element::parse(xml).unwrap();
        assert_eq!(p.text(), "Hello ");
        assert_eq!(p.children()[0].tail(), " world");
        assert_eq!(p.get_text_recursive(), "Hello big world");
        assert_eq!(p.to_xml_string(), xml);
    }

    #[test]
    fn test_whitespace_between_inline_elements_is_kept() {
        let xml = r#"<text:p><text:span>a</text:span> <text:span>b</text:span></text:p>"#;
        let p = Element::parse(xml).unwrap();
        assert_eq!(p.get_text_recursive(), "a b");
        assert_eq!(p.to_xml_string(), xml);

        // Indentation inside structure elements is still dropped
        let row = Element::parse("<table:table-row>\n  <table:table-cell/>\n</table:table-row>")
            .unwrap();
        assert_eq!(row.to_xml_string(), "<table:table-row><table:table-cell/></table:table-row>");
    }

    #[test]
    fn test_node_paths() {
        let mut root = Element::new("table:table").with_child(
            Element::new("table:table-header-rows")
                .with_child(Element::new("table:table-row").with_attribute("id", "h")),
        );
        assert_eq!(root.node_at(&[0, 0]).unwrap().get_attribute("id"), Some("h"));
        assert!(root.node_at(&[0, 1]).is_none());
        assert!(root.node_at(&[]).is_some());

        root.node_at_mut(&[0, 0]).unwrap().set_attribute("id", "x");
        assert_eq!(root.node_at(&[0, 0]).unwrap().get_attribute("id"), Some("x"));
    }

    #[test]
    fn test_insert_children_keeps_order() {
        let mut root = Element::new("r")
            .with_child(Element::new("a"))
            .with_child(Element::new("d"));
        root.insert_children(1, [Element::new("b"), Element::new("c")]);
        let tags: Vec<_> = root.children().iter().map(|c| c.tag_name().to_string()).collect();
        assert_eq!(tags, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        assert!(matches!(Element::parse(""), Err(Error::XmlError(_))));
    }
}
