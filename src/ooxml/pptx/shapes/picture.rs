/// Picture (`p:pic`) construction and inspection.
use crate::ooxml::dom::XmlElement;
use crate::ooxml::pptx::shapes::base::ShapeGeometry;

/// Build a `p:pic` element showing the image behind relationship `r_id`.
///
/// The prefixes `p`, `a` and `r` must be declared on the slide root, as they
/// are in every slide PowerPoint writes.
pub fn new_picture(id: u32, name: &str, r_id: &str, geometry: ShapeGeometry) -> XmlElement {
    let mut buf = itoa::Buffer::new();

    let nv_pic_pr = XmlElement::new("p:nvPicPr")
        .with_child(
            XmlElement::new("p:cNvPr")
                .with_attr("id", buf.format(id))
                .with_attr("name", name),
        )
        .with_child(
            XmlElement::new("p:cNvPicPr")
                .with_child(XmlElement::new("a:picLocks").with_attr("noChangeAspect", "1")),
        )
        .with_child(XmlElement::new("p:nvPr"));

    let blip_fill = XmlElement::new("p:blipFill")
        .with_child(XmlElement::new("a:blip").with_attr("r:embed", r_id))
        .with_child(XmlElement::new("a:stretch").with_child(XmlElement::new("a:fillRect")));

    let mut off = XmlElement::new("a:off");
    off.set_attr_i64("x", geometry.left);
    off.set_attr_i64("y", geometry.top);
    let mut ext = XmlElement::new("a:ext");
    ext.set_attr_i64("cx", geometry.width);
    ext.set_attr_i64("cy", geometry.height);

    let sp_pr = XmlElement::new("p:spPr")
        .with_child(XmlElement::new("a:xfrm").with_child(off).with_child(ext))
        .with_child(
            XmlElement::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(XmlElement::new("a:avLst")),
        );

    XmlElement::new("p:pic")
        .with_child(nv_pic_pr)
        .with_child(blip_fill)
        .with_child(sp_pr)
}

/// Relationship id of the image a picture shows.
pub fn image_r_id(pic: &XmlElement) -> Option<&str> {
    pic.find("p:blipFill/a:blip").and_then(|blip| blip.attr("r:embed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::{Shape, ShapeType};

    #[test]
    fn test_new_picture_is_a_positioned_shape() {
        let geometry = ShapeGeometry::new(457_200, 1_371_600, 2_109_600, 2_160_000);
        let pic = new_picture(42, "case_study_image_1", "rId7", geometry);
        assert_eq!(image_r_id(&pic), Some("rId7"));

        let shape = Shape::new(pic);
        assert_eq!(shape.kind(), ShapeType::Picture);
        assert_eq!(shape.id(), Some(42));
        assert_eq!(shape.name(), "case_study_image_1");
        assert_eq!(shape.geometry(), Some(geometry));
    }
}
