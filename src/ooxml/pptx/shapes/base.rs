/// Shapes on a slide's shape tree.
use crate::common::RGBColor;
use crate::ooxml::dom::XmlElement;
use crate::ooxml::pptx::shapes::textframe::{self, TextFrame};

/// Shape type enumeration, from the element name in `p:spTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    /// A text shape (p:sp)
    Shape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table or chart (p:graphicFrame)
    GraphicFrame,
    /// A group shape (p:grpSp)
    GroupShape,
    /// A connector shape (p:cxnSp)
    Connector,
    /// Anything else, e.g. `mc:AlternateContent`
    Unknown,
}

impl ShapeType {
    pub fn from_element_name(name: &str) -> Self {
        match name {
            "p:sp" => Self::Shape,
            "p:pic" => Self::Picture,
            "p:graphicFrame" => Self::GraphicFrame,
            "p:grpSp" => Self::GroupShape,
            "p:cxnSp" => Self::Connector,
            _ => Self::Unknown,
        }
    }

    /// Path from the shape element to its `a:off`/`a:ext` holder.
    fn xfrm_path(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Shape | Self::Picture | Self::Connector => Some(("p:spPr", "a:xfrm")),
            Self::GroupShape => Some(("p:grpSpPr", "a:xfrm")),
            Self::GraphicFrame => Some(("", "p:xfrm")),
            Self::Unknown => None,
        }
    }
}

/// Position and size in EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeGeometry {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl ShapeGeometry {
    pub const fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> i64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.top + self.height
    }

    /// Area in EMU², as a float so large pictures cannot overflow.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    #[inline]
    pub fn center_x(&self) -> f64 {
        self.left as f64 + self.width as f64 / 2.0
    }

    /// True when the horizontal extents touch or overlap.
    #[inline]
    pub fn overlaps_horizontally(&self, other: &ShapeGeometry) -> bool {
        !(self.right() < other.left || self.left > other.right())
    }

    #[inline]
    pub fn overlaps_vertically(&self, other: &ShapeGeometry) -> bool {
        !(self.bottom() < other.top || self.top > other.bottom())
    }
}

/// One top-level element of a slide's shape tree.
///
/// Shapes are never dropped from the tree while a slide is being laid out;
/// [`Shape::remove`] marks them and serialization skips them.
#[derive(Debug, Clone)]
pub struct Shape {
    kind: ShapeType,
    element: XmlElement,
    removed: bool,
}

impl Shape {
    pub fn new(element: XmlElement) -> Self {
        Self {
            kind: ShapeType::from_element_name(element.name()),
            element,
            removed: false,
        }
    }

    #[inline]
    pub fn kind(&self) -> ShapeType {
        self.kind
    }

    #[inline]
    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    #[inline]
    pub fn element_mut(&mut self) -> &mut XmlElement {
        &mut self.element
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    #[inline]
    pub fn remove(&mut self) {
        self.removed = true;
    }

    /// The `p:cNvPr` element under whichever `p:nv*Pr` this shape kind uses.
    fn c_nv_pr(&self) -> Option<&XmlElement> {
        self.element
            .elements()
            .find(|e| e.name().starts_with("p:nv"))
            .and_then(|nv| nv.child("p:cNvPr"))
    }

    /// Shape name from `p:cNvPr/@name`; empty when absent.
    pub fn name(&self) -> &str {
        self.c_nv_pr().and_then(|c| c.attr("name")).unwrap_or("")
    }

    /// Shape id from `p:cNvPr/@id`.
    pub fn id(&self) -> Option<i64> {
        self.c_nv_pr().and_then(|c| c.attr_i64("id"))
    }

    fn xfrm(&self) -> Option<&XmlElement> {
        let (holder, xfrm) = self.kind.xfrm_path()?;
        if holder.is_empty() {
            self.element.child(xfrm)
        } else {
            self.element.child(holder)?.child(xfrm)
        }
    }

    /// Geometry from the shape's own transform.
    ///
    /// Placeholders that inherit their position from the layout have no
    /// transform and return `None`.
    pub fn geometry(&self) -> Option<ShapeGeometry> {
        let xfrm = self.xfrm()?;
        let off = xfrm.child("a:off")?;
        let ext = xfrm.child("a:ext")?;
        Some(ShapeGeometry {
            left: off.attr_i64("x")?,
            top: off.attr_i64("y")?,
            width: ext.attr_i64("cx")?,
            height: ext.attr_i64("cy")?,
        })
    }

    /// Transform element, created with zero offset and extent when missing.
    fn xfrm_mut(&mut self) -> Option<&mut XmlElement> {
        let (holder, xfrm_name) = self.kind.xfrm_path()?;
        let parent = if holder.is_empty() {
            &mut self.element
        } else {
            // p:spPr follows the non-visual properties
            let nv_end = self
                .element
                .position_of(holder)
                .unwrap_or_else(|| self.element.children().len().min(1));
            self.element.ensure_child(holder, nv_end)
        };

        let xfrm = parent.ensure_child(xfrm_name, 0);
        if xfrm.child("a:off").is_none() {
            xfrm.insert_child(0, XmlElement::new("a:off").with_attr("x", "0").with_attr("y", "0"));
        }
        if xfrm.child("a:ext").is_none() {
            let at = xfrm.position_of("a:off").map_or(0, |p| p + 1);
            xfrm.insert_child(at, XmlElement::new("a:ext").with_attr("cx", "0").with_attr("cy", "0"));
        }
        Some(xfrm)
    }

    fn set_xfrm_attr(&mut self, child: &str, attr: &str, value: i64) {
        if let Some(target) = self.xfrm_mut().and_then(|x| x.child_mut(child)) {
            target.set_attr_i64(attr, value);
        }
    }

    pub fn set_left(&mut self, left: i64) {
        self.set_xfrm_attr("a:off", "x", left);
    }

    pub fn set_top(&mut self, top: i64) {
        self.set_xfrm_attr("a:off", "y", top);
    }

    pub fn set_width(&mut self, width: i64) {
        self.set_xfrm_attr("a:ext", "cx", width);
    }

    pub fn set_height(&mut self, height: i64) {
        self.set_xfrm_attr("a:ext", "cy", height);
    }

    pub fn set_geometry(&mut self, geometry: ShapeGeometry) {
        self.set_left(geometry.left);
        self.set_top(geometry.top);
        self.set_width(geometry.width);
        self.set_height(geometry.height);
    }

    /// Text of the shape's own text frame, paragraphs joined with `\n`.
    pub fn text(&self) -> String {
        match self.element.child("p:txBody") {
            Some(body) if self.kind == ShapeType::Shape => textframe::body_text(body),
            _ => String::new(),
        }
    }

    pub fn text_frame(&mut self) -> Option<TextFrame<'_>> {
        if self.kind != ShapeType::Shape {
            return None;
        }
        self.element.child_mut("p:txBody").map(TextFrame::new)
    }

    /// Solid fill color set directly on the shape.
    pub fn fill_color(&self) -> Option<RGBColor> {
        self.element
            .find("p:spPr/a:solidFill/a:srgbClr")
            .and_then(|c| c.attr("val"))
            .and_then(RGBColor::from_hex)
    }
}
