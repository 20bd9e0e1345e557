//! Mutable XML element tree for slide and presentation parts.
//!
//! Slides are edited structurally (shapes removed, runs rebuilt, pictures
//! inserted), so parts are parsed into owned [`XmlElement`] trees with
//! quick-xml and serialized back after mutation. Element and attribute names
//! keep their prefixes exactly as written; lookups use qualified names such
//! as `a:xfrm`.

use crate::common::xml::{escape_xml, resolve_entity};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

impl XmlNode {
    #[inline]
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Qualified name, e.g. `p:sp`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    #[inline]
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    #[inline]
    pub fn is(&self, qname: &str) -> bool {
        self.name == qname
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Integer attribute; absent or unparsable values give `None`.
    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        let value = self.attr(name)?.trim();
        atoi_simd::parse::<i64, false, false>(value.as_bytes()).ok()
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn set_attr_i64(&mut self, name: &str, value: i64) {
        let mut buf = itoa::Buffer::new();
        self.set_attr(name, buf.format(value));
    }

    #[inline]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.children
    }

    /// Child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    pub fn child(&self, qname: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(qname))
    }

    pub fn child_mut(&mut self, qname: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(qname))
    }

    /// Follow a `/`-separated path of qualified names, e.g. `p:spPr/a:xfrm/a:off`.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        path.split('/').try_fold(self, |e, step| e.child(step))
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut XmlElement> {
        let mut current = self;
        for step in path.split('/') {
            current = current.child_mut(step)?;
        }
        Some(current)
    }

    /// Index in [`children`](Self::children) of the first child element named `qname`.
    pub fn position_of(&self, qname: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.is(qname)))
    }

    /// Insert an element at a node index, clamped to the end.
    pub fn insert_child(&mut self, index: usize, child: XmlElement) {
        let index = index.min(self.children.len());
        self.children.insert(index, XmlNode::Element(child));
    }

    /// Get the child named `qname`, inserting an empty one at node index `index` first
    /// when it does not exist.
    pub fn ensure_child(&mut self, qname: &str, index: usize) -> &mut XmlElement {
        let pos = match self.position_of(qname) {
            Some(pos) => pos,
            None => {
                let index = index.min(self.children.len());
                self.children
                    .insert(index, XmlNode::Element(XmlElement::new(qname)));
                index
            },
        };
        match &mut self.children[pos] {
            XmlNode::Element(e) => e,
            _ => unreachable!("position_of only returns element nodes"),
        }
    }

    /// Remove child elements matching `pred`; returns how many were removed.
    pub fn remove_children<F: FnMut(&XmlElement) -> bool>(&mut self, mut pred: F) -> usize {
        let before = self.children.len();
        self.children.retain(|n| match n {
            XmlNode::Element(e) => !pred(e),
            _ => true,
        });
        before - self.children.len()
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
                XmlNode::Comment(_) => {},
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    /// Descendant elements named `qname` in document order.
    ///
    /// Matching elements are not searched further.
    pub fn descendants(&self, qname: &str) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        self.collect_descendants(qname, &mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, qname: &str, out: &mut Vec<&'a XmlElement>) {
        for e in self.elements() {
            if e.is(qname) {
                out.push(e);
            } else {
                e.collect_descendants(qname, out);
            }
        }
    }

    /// Call `f` on every descendant element named `qname`, in document order.
    ///
    /// Matching elements are not searched further.
    pub fn for_each_descendant_mut<F: FnMut(&mut XmlElement)>(&mut self, qname: &str, f: &mut F) {
        for e in self.elements_mut() {
            if e.is(qname) {
                f(e);
            } else {
                e.for_each_descendant_mut(qname, f);
            }
        }
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(&escape_xml(v));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for node in &self.children {
            match node {
                XmlNode::Element(e) => e.write_to(out),
                XmlNode::Text(t) => out.push_str(&escape_xml(t)),
                XmlNode::CData(t) => {
                    out.push_str("<![CDATA[");
                    out.push_str(t);
                    out.push_str("]]>");
                },
                XmlNode::Comment(t) => {
                    out.push_str("<!--");
                    out.push_str(t);
                    out.push_str("-->");
                },
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Serialize this element and its subtree without a declaration.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256);
        self.write_to(&mut out);
        out
    }
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Parse a complete document.
    ///
    /// Whitespace is kept exactly; `a:t` content depends on it.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::with_capacity(16);
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => stack.push(element_from_start(e)?),
                Event::Empty(ref e) => {
                    let element = element_from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                },
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| OoxmlError::Xml("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                },
                Event::Text(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        push_text(parent, std::str::from_utf8(e)?);
                    }
                },
                Event::GeneralRef(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let name = std::str::from_utf8(e)?;
                        match resolve_entity(name) {
                            Some(c) => push_text(parent, c.encode_utf8(&mut [0u8; 4])),
                            None => push_text(parent, &format!("&{};", name)),
                        }
                    }
                },
                Event::CData(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = std::str::from_utf8(e)?.to_string();
                        parent.children.push(XmlNode::CData(text));
                    }
                },
                Event::Comment(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = std::str::from_utf8(e)?.to_string();
                        parent.children.push(XmlNode::Comment(text));
                    }
                },
                Event::Eof => break,
                // declaration, processing instructions and doctype are regenerated or dropped
                _ => {},
            }
        }

        if let Some(open) = stack.last() {
            return Err(OoxmlError::Xml(format!("unclosed element <{}>", open.name)));
        }
        root.map(Self::new)
            .ok_or_else(|| OoxmlError::Xml("document has no root element".to_string()))
    }

    /// Serialize with a standalone UTF-8 declaration.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(8192);
        out.push_str(XML_DECLARATION);
        out.push_str("\r\n");
        self.root.write_to(&mut out);
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml().into_bytes()
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut element = XmlElement::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(OoxmlError::Xml(
                "more than one root element".to_string(),
            ));
        },
    }
    Ok(())
}

/// Append text, merging with a preceding text node.
fn push_text(parent: &mut XmlElement, text: &str) {
    if text.is_empty() {
        return;
    }
    match parent.children.last_mut() {
        Some(XmlNode::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(XmlNode::Text(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sp xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><p:nvSpPr><p:cNvPr id="4" name="grey1"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="914400" y="12700"/><a:ext cx="100" cy="200"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>R&amp;D  {{company_name}}</a:t></a:r></a:p></p:txBody></p:sp>"#;

    #[test]
    fn test_parse_and_navigate() {
        let doc = XmlDocument::parse(SHAPE.as_bytes()).unwrap();
        assert_eq!(doc.root.name(), "p:sp");
        assert_eq!(doc.root.local_name(), "sp");

        let c_nv_pr = doc.root.find("p:nvSpPr/p:cNvPr").unwrap();
        assert_eq!(c_nv_pr.attr("name"), Some("grey1"));
        assert_eq!(c_nv_pr.attr_i64("id"), Some(4));

        let off = doc.root.find("p:spPr/a:xfrm/a:off").unwrap();
        assert_eq!(off.attr_i64("x"), Some(914_400));
        assert!(doc.root.find("p:spPr/a:prstGeom").is_none());
    }

    #[test]
    fn test_entities_and_whitespace_survive() {
        let doc = XmlDocument::parse(SHAPE.as_bytes()).unwrap();
        let t = doc.root.descendants("a:t");
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].text(), "R&D  {{company_name}}");

        let out = doc.to_xml();
        assert!(out.contains("<a:t>R&amp;D  {{company_name}}</a:t>"));
        assert!(out.contains(r#"<p:cNvPr id="4" name="grey1"/>"#));
        assert_eq!(XmlDocument::parse(out.as_bytes()).unwrap(), doc);
    }

    #[test]
    fn test_character_references() {
        let doc = XmlDocument::parse("<a:t>5&#x2B; &lt;10&#8230;</a:t>".as_bytes()).unwrap();
        assert_eq!(doc.root.text(), "5+ <10…");
    }

    #[test]
    fn test_mutation_helpers() {
        let mut doc = XmlDocument::parse(SHAPE.as_bytes()).unwrap();
        let sp_pr = doc.root.child_mut("p:spPr").unwrap();

        sp_pr.insert_child(0, XmlElement::new("a:noFill"));
        sp_pr.ensure_child("a:xfrm", 0).child_mut("a:off").unwrap().set_attr_i64("y", -5);
        sp_pr.ensure_child("a:prstGeom", 99).set_attr("prst", "rect");
        let names: Vec<_> = sp_pr.elements().map(XmlElement::name).collect();
        assert_eq!(names, ["a:noFill", "a:xfrm", "a:prstGeom"]);
        assert_eq!(doc.root.find("p:spPr/a:xfrm/a:off").unwrap().attr_i64("y"), Some(-5));

        let removed = doc.root.child_mut("p:spPr").unwrap().remove_children(|e| e.is("a:noFill"));
        assert_eq!(removed, 1);

        let mut count = 0;
        doc.root.for_each_descendant_mut("a:t", &mut |t| {
            t.set_text("done");
            count += 1;
        });
        assert_eq!(count, 1);
        assert_eq!(doc.root.find("p:txBody/a:p/a:r/a:t").unwrap().text(), "done");
    }

    #[test]
    fn test_malformed_documents_fail() {
        assert!(XmlDocument::parse(b"<p:sld><p:cSld></p:sld>").is_err());
        assert!(XmlDocument::parse(b"").is_err());
        assert!(XmlDocument::parse(b"<a/><b/>").is_err());
    }

    #[test]
    fn test_builder_serialization() {
        let e = XmlElement::new("a:rPr")
            .with_attr("sz", "1100")
            .with_attr("b", "1")
            .with_child(XmlElement::new("a:latin").with_attr("typeface", "A \"quoted\" font"));
        assert_eq!(
            e.to_xml(),
            r#"<a:rPr sz="1100" b="1"><a:latin typeface="A &quot;quoted&quot; font"/></a:rPr>"#
        );
        assert_eq!(XmlElement::new("a:t").with_text("x < y").to_xml(), "<a:t>x &lt; y</a:t>");
    }
}
