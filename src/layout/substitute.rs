//! `{{token}}` replacement inside text runs.
use memchr::memmem;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::SlideContext;
use crate::ooxml::dom::XmlElement;
use crate::ooxml::pptx::shapes::textframe::{run_size_pt, run_text, set_run_size_pt, set_run_text};
use crate::ooxml::pptx::SlideDocument;
use crate::placeholders::keys::{self, SLOTS};
use crate::placeholders::PlaceholderTable;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("valid regex"));

/// Replace text tokens in every paragraph of the slide.
///
/// Returns the number of paragraphs rewritten. Media tokens and unknown
/// tokens are left as they are.
pub fn substitute_slide(slide: &mut SlideDocument, table: &PlaceholderTable, ctx: &SlideContext) -> usize {
    let mut rewritten = 0;
    for id in slide.shape_ids() {
        slide
            .shape_mut(id)
            .element_mut()
            .for_each_descendant_mut("a:p", &mut |p: &mut XmlElement| {
                if substitute_paragraph(p, table, ctx) {
                    rewritten += 1;
                }
            });
    }
    rewritten
}

/// Rewrite one paragraph; true when at least one token was replaced.
///
/// Tokens may be split across runs, so the joined run text is matched and
/// the result is written into the first run.
pub fn substitute_paragraph(paragraph: &mut XmlElement, table: &PlaceholderTable, ctx: &SlideContext) -> bool {
    let text: String = paragraph
        .elements()
        .filter(|e| e.is("a:r"))
        .map(run_text)
        .collect();
    if memmem::find(text.as_bytes(), b"{{").is_none() {
        return false;
    }

    let mut replaced_keys: Vec<String> = Vec::new();
    let replaced = TOKEN.replace_all(&text, |caps: &Captures| {
        let key = &caps[1];
        match table.text(key) {
            Some(value) => {
                replaced_keys.push(key.to_string());
                value.to_string()
            },
            None => caps[0].to_string(),
        }
    });
    if replaced_keys.is_empty() {
        return false;
    }

    let mut runs = paragraph.elements_mut().filter(|e| e.is("a:r"));
    let Some(first) = runs.next() else {
        return false;
    };
    set_run_text(first, &replaced);
    let current_size = run_size_pt(first);
    if let Some(pt) = replacement_size(&replaced_keys, table, ctx, current_size) {
        set_run_size_pt(first, pt);
    }
    for run in runs {
        set_run_text(run, "");
    }
    true
}

/// Font size forced by the tokens a paragraph contained, if any.
fn replacement_size(
    keys_used: &[String],
    table: &PlaceholderTable,
    ctx: &SlideContext,
    current: Option<f64>,
) -> Option<f64> {
    let config = ctx.config;

    let shrinks_category = keys_used.iter().any(|key| {
        key.ends_with("category")
            && table
                .text(key)
                .is_some_and(|v| config.category_shrink.iter().any(|s| s == v))
    });
    if shrinks_category {
        return Some(current.unwrap_or(config.category_default_font_pt) - 1.0);
    }

    if !ctx.is_detail() {
        return None;
    }
    if keys_used.iter().any(|key| (1..=SLOTS).any(|n| *key == keys::metric(n))) {
        return Some(config.detail_metric_font_pt);
    }
    if keys_used.iter().any(|key| key.contains(keys::DETAIL_METRIC_LABEL)) {
        return Some(config.detail_label_font_pt);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::index::tests::slide;
    use crate::ooxml::dom::XmlDocument;
    use crate::ooxml::pptx::package::tests::text_shape;

    fn paragraph(xml: &str) -> XmlElement {
        XmlDocument::parse(xml.as_bytes()).unwrap().root
    }

    fn table() -> PlaceholderTable {
        let mut table = PlaceholderTable::new();
        table.insert_text("company_name", "Acme");
        table.insert_text("case_study_1_category", "INFRASTRUCTURE");
        table.insert_text("n2", "40%");
        table.insert_text("metric_label_case_study_2", "less downtime");
        table.insert_media("case_study_1_image", "images/a.jpg");
        table
    }

    const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;

    #[test]
    fn test_token_split_across_runs() {
        let config = LayoutConfig::default();
        let ctx = SlideContext::new(&config, 0);
        let mut p = paragraph(&format!(
            r#"<a:p {NS}><a:r><a:t>For {{{{comp</a:t></a:r><a:r><a:rPr b="1"/><a:t>any_name}}}} today</a:t></a:r></a:p>"#
        ));
        assert!(substitute_paragraph(&mut p, &table(), &ctx));
        let runs: Vec<_> = p.elements().filter(|e| e.is("a:r")).map(run_text).collect();
        assert_eq!(runs, ["For Acme today", ""]);
    }

    #[test]
    fn test_unknown_and_media_tokens_stay() {
        let config = LayoutConfig::default();
        let ctx = SlideContext::new(&config, 0);
        let mut p = paragraph(&format!(r#"<a:p {NS}><a:r><a:t>{{{{case_study_1_image}}}} {{{{nope}}}}</a:t></a:r></a:p>"#));
        assert!(!substitute_paragraph(&mut p, &table(), &ctx));
        assert_eq!(p.text(), "{{case_study_1_image}} {{nope}}");

        let mut p = paragraph(&format!(r#"<a:p {NS}><a:r><a:t>{{{{nope}}}} {{{{company_name}}}}</a:t></a:r></a:p>"#));
        assert!(substitute_paragraph(&mut p, &table(), &ctx));
        assert_eq!(p.text(), "{{nope}} Acme");
    }

    #[test]
    fn test_size_rules() {
        let config = LayoutConfig::default();
        let overview = SlideContext::new(&config, 0);
        let detail = SlideContext::new(&config, 1);

        let mut p = paragraph(&format!(r#"<a:p {NS}><a:r><a:rPr sz="2000"/><a:t>{{{{case_study_1_category}}}}</a:t></a:r></a:p>"#));
        substitute_paragraph(&mut p, &table(), &overview);
        assert_eq!(run_size_pt(p.child("a:r").unwrap()), Some(19.0));

        let mut p = paragraph(&format!(r#"<a:p {NS}><a:r><a:t>{{{{case_study_1_category}}}}</a:t></a:r></a:p>"#));
        substitute_paragraph(&mut p, &table(), &overview);
        assert_eq!(run_size_pt(p.child("a:r").unwrap()), Some(17.0));

        let mut p = paragraph(&format!(r#"<a:p {NS}><a:r><a:rPr sz="1400"/><a:t>{{{{n2}}}}</a:t></a:r></a:p>"#));
        substitute_paragraph(&mut p, &table(), &overview);
        assert_eq!(run_size_pt(p.child("a:r").unwrap()), Some(14.0));
        substitute_paragraph(&mut p, &table(), &detail);
        assert_eq!(run_size_pt(p.child("a:r").unwrap()), Some(14.0));

        let mut p = paragraph(&format!(r#"<a:p {NS}><a:r><a:rPr sz="1400"/><a:t>{{{{n2}}}}</a:t></a:r></a:p>"#));
        substitute_paragraph(&mut p, &table(), &detail);
        assert_eq!(run_size_pt(p.child("a:r").unwrap()), Some(30.0));

        let mut p = paragraph(&format!(r#"<a:p {NS}><a:r><a:t>{{{{metric_label_case_study_2}}}}</a:t></a:r></a:p>"#));
        substitute_paragraph(&mut p, &table(), &detail);
        assert_eq!(run_size_pt(p.child("a:r").unwrap()), Some(11.0));
    }

    #[test]
    fn test_substitute_slide() {
        let config = LayoutConfig::default();
        let ctx = SlideContext::new(&config, 0);
        let body = [
            text_shape(2, "Title", "Cases for {{company_name}}"),
            text_shape(3, "Plain", "Nothing here"),
        ]
        .concat();
        let mut doc = slide(&body);
        assert_eq!(substitute_slide(&mut doc, &table(), &ctx), 1);
        let id = doc.find_by_name("Title").unwrap();
        assert_eq!(doc.shape(id).text(), "Cases for Acme");
    }

    #[test]
    fn test_substitute_group_and_table() {
        let config = LayoutConfig::default();
        let ctx = SlideContext::new(&config, 0);
        let group = format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="4" name="Group 3"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
            text_shape(5, "Inner", "Prepared for {{company_name}}")
        );
        let table_frame = r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="6" name="Table 5"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tr h="100"><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>Client: {{company_name}}</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#;
        let mut doc = slide(&[group.as_str(), table_frame].concat());

        assert_eq!(substitute_slide(&mut doc, &table(), &ctx), 2);
        let group = doc.shape(doc.find_by_name("Group 3").unwrap());
        assert_eq!(group.element().text(), "Prepared for Acme");
        let frame = doc.shape(doc.find_by_name("Table 5").unwrap());
        assert_eq!(frame.element().text(), "Client: Acme");
    }
}
