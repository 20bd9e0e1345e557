use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
/// Parts: the units of content in an OPC package.
///
/// Each part has a unique partname, a content type, a blob and its own
/// outgoing relationships. Slides are rewritten by replacing their blob.
use std::sync::Arc;

/// Trait representing a part in an OPC package.
pub trait Part {
    fn partname(&self) -> &PackURI;

    fn content_type(&self) -> &str;

    /// Get the binary content of this part.
    fn blob(&self) -> &[u8];

    /// Replace the binary content of this part.
    fn set_blob(&mut self, blob: Vec<u8>);

    fn rels(&self) -> &Relationships;

    fn rels_mut(&mut self) -> &mut Relationships;

    /// Add or get a relationship to another part, returning its rId.
    ///
    /// The stored target is relative to this part's directory.
    fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(self.partname().base_uri());
        self.rels_mut().get_or_add(reltype, &target_ref)
    }

    /// Get the target reference for a relationship ID.
    fn target_ref(&self, r_id: &str) -> Result<&str> {
        self.rels()
            .get(r_id)
            .map(|rel| rel.target_ref())
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {}", r_id)))
    }
}

/// A part that stores opaque binary content, such as an image.
#[derive(Debug)]
pub struct BlobPart {
    partname: PackURI,
    content_type: String,
    blob: Arc<Vec<u8>>,
    rels: Relationships,
}

impl BlobPart {
    pub fn new(partname: PackURI, content_type: String, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            blob: Arc::new(blob),
            rels,
        }
    }
}

impl Part for BlobPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.blob
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = Arc::new(blob);
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// A part whose content is UTF-8 XML.
#[derive(Debug)]
pub struct XmlPart {
    partname: PackURI,
    content_type: String,
    xml_bytes: Arc<Vec<u8>>,
    rels: Relationships,
}

impl XmlPart {
    pub fn new(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            xml_bytes: Arc::new(xml_bytes),
            rels,
        }
    }

    /// Load an XML part from raw data, rejecting content that is not UTF-8.
    pub fn load(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Result<Self> {
        std::str::from_utf8(&xml_bytes).map_err(|e| {
            OpcError::XmlError(format!("Invalid UTF-8 in {}: {}", partname, e))
        })?;

        Ok(Self::new(partname, content_type, xml_bytes))
    }
}

impl Part for XmlPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.xml_bytes
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.xml_bytes = Arc::new(blob);
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// Creates the right Part implementation for a content type.
pub struct PartFactory;

impl PartFactory {
    /// Load a part from raw data: XML content types become [`XmlPart`],
    /// everything else a [`BlobPart`].
    pub fn load(partname: PackURI, content_type: String, blob: Vec<u8>) -> Result<Box<dyn Part>> {
        if Self::is_xml_content_type(&content_type) {
            Ok(Box::new(XmlPart::load(partname, content_type, blob)?))
        } else {
            Ok(Box::new(BlobPart::new(partname, content_type, blob)))
        }
    }

    #[inline]
    fn is_xml_content_type(content_type: &str) -> bool {
        content_type.ends_with("+xml") || content_type.ends_with("/xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};

    #[test]
    fn test_blob_part_set_blob() {
        let partname = PackURI::new("/ppt/media/image1.png").unwrap();
        let mut part = BlobPart::new(partname, ct::PNG.to_string(), vec![0x89, 0x50]);
        assert_eq!(part.blob(), &[0x89, 0x50]);

        part.set_blob(vec![1, 2, 3]);
        assert_eq!(part.blob(), &[1, 2, 3]);
    }

    #[test]
    fn test_xml_part_rejects_invalid_utf8() {
        let partname = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert!(XmlPart::load(partname, ct::PML_SLIDE.to_string(), vec![0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_relate_to_stores_relative_target() {
        let partname = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        let mut part = XmlPart::new(partname, ct::PML_SLIDE.to_string(), b"<p:sld/>".to_vec());
        let media = PackURI::new("/ppt/media/image4.png").unwrap();

        let r_id = part.relate_to(&media, rt::IMAGE);
        assert_eq!(part.target_ref(&r_id).unwrap(), "../media/image4.png");
    }

    #[test]
    fn test_is_xml_content_type() {
        assert!(PartFactory::is_xml_content_type(ct::XML));
        assert!(PartFactory::is_xml_content_type(ct::PML_SLIDE));
        assert!(PartFactory::is_xml_content_type(ct::SVG));
        assert!(!PartFactory::is_xml_content_type(ct::PNG));
    }
}
