/// An editable slide: the parsed slide part with its shape tree split into
/// addressable shapes.
use crate::ooxml::dom::{XmlDocument, XmlElement, XmlNode};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::shapes::Shape;

/// Stable handle to a shape in a [`SlideDocument`].
///
/// Handles stay valid while shapes are inserted or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

/// Where a new shape goes in the z-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// Directly after the group properties, behind every existing shape
    Back,
    /// On top of every existing shape
    Front,
}

/// A slide part parsed for editing.
///
/// The `p:spTree` children are split three ways: group properties before the
/// shapes, the shapes themselves and trailing extensions. Serialization puts
/// them back in that order, skipping removed shapes.
pub struct SlideDocument {
    /// The slide with an emptied `p:spTree`
    doc: XmlDocument,
    tree_head: Vec<XmlNode>,
    tree_tail: Vec<XmlNode>,
    shapes: Vec<Shape>,
    /// Indices into `shapes`, back to front
    z_order: Vec<usize>,
}

const SP_TREE_PATH: &str = "p:cSld/p:spTree";

impl SlideDocument {
    /// Parse slide XML.
    ///
    /// Fails when the XML is malformed or has no shape tree.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut doc = XmlDocument::parse(xml)?;
        let sp_tree = doc
            .root
            .find_mut(SP_TREE_PATH)
            .ok_or_else(|| OoxmlError::Xml("slide has no p:cSld/p:spTree".to_string()))?;

        let mut tree_head = Vec::new();
        let mut tree_tail = Vec::new();
        let mut shapes = Vec::new();

        for node in std::mem::take(sp_tree.children_mut()) {
            let XmlNode::Element(element) = node else {
                // whitespace between shapes carries no meaning
                continue;
            };
            match element.name() {
                "p:nvGrpSpPr" | "p:grpSpPr" => tree_head.push(XmlNode::Element(element)),
                "p:extLst" => tree_tail.push(XmlNode::Element(element)),
                _ => shapes.push(Shape::new(element)),
            }
        }

        let z_order = (0..shapes.len()).collect();
        Ok(Self {
            doc,
            tree_head,
            tree_tail,
            shapes,
            z_order,
        })
    }

    /// Handles of all shapes not marked removed, back to front.
    pub fn shape_ids(&self) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .copied()
            .filter(|&i| !self.shapes[i].is_removed())
            .map(ShapeId)
            .collect()
    }

    /// Live shapes with their handles, back to front.
    pub fn live_shapes(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.z_order
            .iter()
            .map(|&i| (ShapeId(i), &self.shapes[i]))
            .filter(|(_, s)| !s.is_removed())
    }

    #[inline]
    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0]
    }

    #[inline]
    pub fn shape_mut(&mut self, id: ShapeId) -> &mut Shape {
        &mut self.shapes[id.0]
    }

    /// First live shape with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<ShapeId> {
        self.live_shapes()
            .find(|(_, s)| s.name() == name)
            .map(|(id, _)| id)
    }

    /// A shape id one above every `p:cNvPr/@id` on the slide.
    pub fn next_shape_id(&self) -> u32 {
        let max_id = self
            .shapes
            .iter()
            .flat_map(|s| s.element().descendants("p:cNvPr"))
            .filter_map(|c| c.attr_i64("id"))
            .max()
            .unwrap_or(1);
        u32::try_from(max_id.max(1) + 1).unwrap_or(u32::MAX)
    }

    /// Add a shape element at the back or front of the z-order.
    pub fn add_shape(&mut self, element: XmlElement, z: ZOrder) -> ShapeId {
        let index = self.shapes.len();
        self.shapes.push(Shape::new(element));
        match z {
            ZOrder::Back => self.z_order.insert(0, index),
            ZOrder::Front => self.z_order.push(index),
        }
        ShapeId(index)
    }

    /// Serialize the slide, dropping removed shapes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.doc.clone();
        let sp_tree = doc
            .root
            .find_mut(SP_TREE_PATH)
            .ok_or_else(|| OoxmlError::Xml("slide has no p:cSld/p:spTree".to_string()))?;

        let children = sp_tree.children_mut();
        children.extend(self.tree_head.iter().cloned());
        children.extend(
            self.z_order
                .iter()
                .map(|&i| &self.shapes[i])
                .filter(|s| !s.is_removed())
                .map(|s| XmlNode::Element(s.element().clone())),
        );
        children.extend(self.tree_tail.iter().cloned());

        Ok(doc.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::ShapeType;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
      <p:grpSpPr/>
      <p:sp><p:nvSpPr><p:cNvPr id="2" name="grey1"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>
      <p:grpSp><p:nvGrpSpPr><p:cNvPr id="9" name="Group 8"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>
        <p:sp><p:nvSpPr><p:cNvPr id="12" name="inner"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>
      </p:grpSp>
      <p:extLst><p:ext uri="{BB962C8B-B14F-4D97-AF65-F5344CB8AC3E}"/></p:extLst>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_splits_shape_tree() {
        let slide = SlideDocument::parse(SLIDE.as_bytes()).unwrap();
        let ids = slide.shape_ids();
        assert_eq!(ids.len(), 2);
        assert_eq!(slide.shape(ids[0]).name(), "grey1");
        assert_eq!(slide.shape(ids[1]).kind(), ShapeType::GroupShape);
        assert_eq!(slide.find_by_name("Group 8"), Some(ids[1]));
        assert_eq!(slide.next_shape_id(), 13);
    }

    #[test]
    fn test_z_order_and_removal_on_write() {
        let mut slide = SlideDocument::parse(SLIDE.as_bytes()).unwrap();
        let grey = slide.find_by_name("grey1").unwrap();
        slide.shape_mut(grey).remove();

        slide.add_shape(XmlElement::new("p:pic").with_attr("tag", "back"), ZOrder::Back);
        slide.add_shape(XmlElement::new("p:pic").with_attr("tag", "front"), ZOrder::Front);
        // handles taken before the insertions still point at the same shapes
        assert!(slide.shape(grey).is_removed());

        let xml = String::from_utf8(slide.to_bytes().unwrap()).unwrap();
        assert!(!xml.contains("grey1"));
        let head = xml.find("<p:grpSpPr/>").unwrap();
        let back = xml.find(r#"tag="back""#).unwrap();
        let group = xml.find("Group 8").unwrap();
        let front = xml.find(r#"tag="front""#).unwrap();
        let ext = xml.find("<p:extLst>").unwrap();
        assert!(head < back && back < group && group < front && front < ext);

        let reparsed = SlideDocument::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.shape_ids().len(), 3);
    }

    #[test]
    fn test_missing_shape_tree_is_an_error() {
        assert!(SlideDocument::parse(b"<p:sld><p:cSld/></p:sld>").is_err());
        assert!(SlideDocument::parse(b"<p:sld><p:cSld>").is_err());
    }
}
