/// Package implementation for PowerPoint presentations.
use std::io::{Read, Seek};
use std::path::Path;

use tracing::debug;

use crate::ooxml::dom::XmlDocument;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{BlobPart, OpcPackage, PackURI};
use crate::ooxml::pptx::format::ImageFormat;
use crate::ooxml::pptx::presentation::{self, SlideRef};
use crate::ooxml::pptx::slide::SlideDocument;

/// A PowerPoint (.pptx) package opened for editing.
///
/// Slides are loaded into [`SlideDocument`]s, edited and stored back; media
/// are added as new parts; [`Package::to_bytes`] drops anything no longer
/// reachable and writes the archive.
///
/// # Examples
///
/// ```rust,no_run
/// use casedeck::ooxml::pptx::Package;
///
/// let mut pkg = Package::open("templates/case_studies_template.pptx")?;
/// for partname in pkg.slide_partnames()? {
///     let slide = pkg.load_slide(&partname)?;
///     println!("{}: {} shapes", partname, slide.shape_ids().len());
/// }
/// let bytes = pkg.to_bytes()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package {
    /// The underlying OPC package
    opc: OpcPackage,
}

impl Package {
    /// Open a .pptx (or .pptm/.potx) package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Create a package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(bytes)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        // Verify it's a presentation by checking the main part's content type
        let main_part = opc
            .main_document_part()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        let content_type = main_part.content_type();
        if ![ct::PML_PRESENTATION_MAIN, ct::PML_PRES_MACRO_MAIN, ct::PML_TEMPLATE_MAIN]
            .contains(&content_type)
        {
            return Err(OoxmlError::InvalidContentType {
                expected: format!(
                    "{} or {}",
                    ct::PML_PRESENTATION_MAIN,
                    ct::PML_PRES_MACRO_MAIN
                ),
                got: content_type.to_string(),
            });
        }

        Ok(Self { opc })
    }

    pub fn presentation_partname(&self) -> Result<PackURI> {
        Ok(self.opc.main_document_partname()?)
    }

    fn presentation_document(&self) -> Result<XmlDocument> {
        let partname = self.presentation_partname()?;
        XmlDocument::parse(self.opc.get_part(&partname)?.blob())
    }

    /// Slide partnames in presentation order.
    pub fn slide_partnames(&self) -> Result<Vec<PackURI>> {
        let pres_partname = self.presentation_partname()?;
        let pres_part = self.opc.get_part(&pres_partname)?;
        let doc = XmlDocument::parse(pres_part.blob())?;

        presentation::slide_refs(&doc)
            .into_iter()
            .map(|SlideRef { r_id, .. }| {
                let rel = pres_part.rels().get(&r_id).ok_or_else(|| {
                    OoxmlError::InvalidRelationship(format!(
                        "slide relationship {} missing from {}",
                        r_id, pres_partname
                    ))
                })?;
                if rel.reltype() != rt::SLIDE {
                    return Err(OoxmlError::InvalidRelationship(format!(
                        "{} is not a slide relationship",
                        r_id
                    )));
                }
                Ok(rel.target_partname()?)
            })
            .collect()
    }

    #[inline]
    pub fn slide_count(&self) -> Result<usize> {
        Ok(presentation::slide_refs(&self.presentation_document()?).len())
    }

    /// Parse a slide part for editing.
    pub fn load_slide(&self, partname: &PackURI) -> Result<SlideDocument> {
        let part = self.opc.get_part(partname)?;
        if part.content_type() != ct::PML_SLIDE {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_SLIDE.to_string(),
                got: part.content_type().to_string(),
            });
        }
        SlideDocument::parse(part.blob())
            .map_err(|e| OoxmlError::Xml(format!("{}: {}", partname, e)))
    }

    /// Replace a slide part's XML with an edited slide.
    pub fn store_slide(&mut self, partname: &PackURI, slide: &SlideDocument) -> Result<()> {
        let blob = slide.to_bytes()?;
        self.opc.get_part_mut(partname)?.set_blob(blob);
        Ok(())
    }

    /// Add an image part related from `slide`, returning the relationship id
    /// to put in `a:blip/@r:embed`.
    pub fn add_image(&mut self, slide: &PackURI, blob: Vec<u8>, format: ImageFormat) -> Result<String> {
        let template = format!("/ppt/media/image%d.{}", format.extension());
        let partname = self.opc.next_partname(&template)?;
        debug!(partname = %partname, bytes = blob.len(), "adding image part");

        self.opc.add_part(Box::new(BlobPart::new(
            partname.clone(),
            format.mime_type().to_string(),
            blob,
        )));
        let slide_part = self.opc.get_part_mut(slide)?;
        Ok(slide_part.relate_to(&partname, rt::IMAGE))
    }

    /// Keep only the slides at the given zero-based positions.
    ///
    /// Removed slides lose their `p:sldId` entry and their presentation
    /// relationship; their parts are dropped on save. Returns the number of
    /// slides removed.
    pub fn retain_slides(&mut self, keep: &[usize]) -> Result<usize> {
        let pres_partname = self.presentation_partname()?;
        let pres_part = self.opc.get_part_mut(&pres_partname)?;
        let mut doc = XmlDocument::parse(pres_part.blob())?;

        let removed = presentation::retain_slides(&mut doc, keep);
        if removed.is_empty() {
            return Ok(0);
        }

        for slide_ref in &removed {
            pres_part.rels_mut().remove(&slide_ref.r_id);
        }
        pres_part.set_blob(doc.to_bytes());
        debug!(removed = removed.len(), "removed slides from presentation");
        Ok(removed.len())
    }

    /// Drop unreachable parts and serialize the package.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let pruned = self.opc.prune_unreachable();
        if pruned > 0 {
            debug!(pruned, "dropped unreachable parts");
        }
        Ok(self.opc.to_bytes()?)
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }
}
