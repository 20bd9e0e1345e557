/// The slide index of `presentation.xml`.
///
/// `p:sldIdLst` lists the slides in presentation order; each `p:sldId` names
/// its slide part through an `r:id` on the presentation part. PowerPoint 2010
/// sections keep a second list of the same numeric ids under `p14:sectionLst`.
use std::collections::HashSet;

use crate::ooxml::dom::{XmlDocument, XmlElement};

/// One entry of `p:sldIdLst`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    /// Numeric slide id, unique within the presentation
    pub id: i64,
    /// Relationship id on the presentation part
    pub r_id: String,
}

fn slide_id_list(doc: &XmlDocument) -> Option<&XmlElement> {
    doc.root.child("p:sldIdLst")
}

/// Slides in presentation order.
pub fn slide_refs(doc: &XmlDocument) -> Vec<SlideRef> {
    slide_id_list(doc)
        .map(|list| {
            list.elements()
                .filter(|e| e.is("p:sldId"))
                .filter_map(|e| {
                    Some(SlideRef {
                        id: e.attr_i64("id")?,
                        r_id: e.attr("r:id")?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Keep only the slides at positions `keep`, returning the removed entries.
///
/// Section lists lose the same ids so PowerPoint does not report the file as
/// needing repair.
pub fn retain_slides(doc: &mut XmlDocument, keep: &[usize]) -> Vec<SlideRef> {
    let refs = slide_refs(doc);
    let removed: Vec<SlideRef> = refs
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !keep.contains(i))
        .map(|(_, r)| r)
        .collect();
    if removed.is_empty() {
        return removed;
    }

    let removed_r_ids: HashSet<&str> = removed.iter().map(|r| r.r_id.as_str()).collect();
    if let Some(list) = doc.root.child_mut("p:sldIdLst") {
        list.remove_children(|e| {
            e.is("p:sldId") && e.attr("r:id").is_some_and(|r| removed_r_ids.contains(r))
        });
    }

    let removed_ids: HashSet<i64> = removed.iter().map(|r| r.id).collect();
    doc.root.for_each_descendant_mut("p14:sldIdLst", &mut |list: &mut XmlElement| {
        list.remove_children(|e| e.attr_i64("id").is_some_and(|id| removed_ids.contains(&id)));
    });

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESENTATION: &str = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main">
<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/><p:sldId id="258" r:id="rId4"/></p:sldIdLst>
<p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst><p14:section name="Default" id="{0}"><p14:sldIdLst><p14:sldId id="256"/><p14:sldId id="257"/><p14:sldId id="258"/></p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst>
</p:presentation>"#;

    #[test]
    fn test_slide_refs_in_order() {
        let doc = XmlDocument::parse(PRESENTATION.as_bytes()).unwrap();
        let refs = slide_refs(&doc);
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0], SlideRef { id: 256, r_id: "rId2".to_string() });
        assert_eq!(refs[2].r_id, "rId4");
    }

    #[test]
    fn test_retain_slides_updates_sections() {
        let mut doc = XmlDocument::parse(PRESENTATION.as_bytes()).unwrap();
        let removed = retain_slides(&mut doc, &[1]);
        assert_eq!(removed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![256, 258]);

        let refs = slide_refs(&doc);
        assert_eq!(refs, vec![SlideRef { id: 257, r_id: "rId3".to_string() }]);

        let xml = doc.to_xml();
        assert!(xml.contains(r#"<p14:sldId id="257"/>"#));
        assert!(!xml.contains(r#"<p14:sldId id="256"/>"#));
        assert!(!xml.contains(r#"<p14:sldId id="258"/>"#));
    }

    #[test]
    fn test_keep_everything_is_a_no_op() {
        let mut doc = XmlDocument::parse(PRESENTATION.as_bytes()).unwrap();
        assert!(retain_slides(&mut doc, &[0, 1, 2]).is_empty());
        assert_eq!(slide_refs(&doc).len(), 3);
    }
}
