/// Text frames (`p:txBody`), paragraphs (`a:p`) and runs (`a:r`).
use crate::common::RGBColor;
use crate::common::unit::{centipoints_to_pt, pt_to_centipoints};
use crate::ooxml::dom::{XmlElement, XmlNode};

/// Fill elements a run property can carry; at most one may be present.
const FILL_ELEMENTS: [&str; 6] = [
    "a:noFill",
    "a:solidFill",
    "a:gradFill",
    "a:blipFill",
    "a:pattFill",
    "a:grpFill",
];

const AUTOFIT_ELEMENTS: [&str; 3] = ["a:noAutofit", "a:normAutofit", "a:spAutoFit"];

/// Character formatting carried over when a run is rebuilt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFormat {
    pub size_pt: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<RGBColor>,
}

impl RunFormat {
    /// Read the directly-applied formatting of a run.
    pub fn from_run(run: &XmlElement) -> Self {
        let Some(r_pr) = run.child("a:rPr") else {
            return Self::default();
        };
        Self {
            size_pt: r_pr.attr_i64("sz").map(centipoints_to_pt),
            bold: r_pr.attr("b").and_then(parse_xsd_bool),
            italic: r_pr.attr("i").and_then(parse_xsd_bool),
            color: r_pr
                .find("a:solidFill/a:srgbClr")
                .and_then(|c| c.attr("val"))
                .and_then(RGBColor::from_hex),
        }
    }

    /// Write every set field onto `run`; unset fields are left alone.
    pub fn apply_to(&self, run: &mut XmlElement) {
        let r_pr = run.ensure_child("a:rPr", 0);
        if let Some(pt) = self.size_pt {
            r_pr.set_attr_i64("sz", pt_to_centipoints(pt));
        }
        if let Some(bold) = self.bold {
            r_pr.set_attr("b", if bold { "1" } else { "0" });
        }
        if let Some(italic) = self.italic {
            r_pr.set_attr("i", if italic { "1" } else { "0" });
        }
        if let Some(color) = self.color {
            set_solid_fill(r_pr, color);
        }
    }
}

fn parse_xsd_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Replace whatever fill `r_pr` has with a solid sRGB fill.
///
/// `a:ln` is the only child that may precede the fill.
fn set_solid_fill(r_pr: &mut XmlElement, color: RGBColor) {
    r_pr.remove_children(|e| FILL_ELEMENTS.contains(&e.name()));
    let at = r_pr.position_of("a:ln").map_or(0, |p| p + 1);
    r_pr.insert_child(
        at,
        XmlElement::new("a:solidFill")
            .with_child(XmlElement::new("a:srgbClr").with_attr("val", color.to_hex())),
    );
}

/// Build a new `a:r` with the given text and formatting.
pub fn new_run(text: &str, format: &RunFormat) -> XmlElement {
    let mut run = XmlElement::new("a:r")
        .with_child(XmlElement::new("a:rPr").with_attr("lang", "en-US").with_attr("dirty", "0"))
        .with_child(XmlElement::new("a:t").with_text(text));
    format.apply_to(&mut run);
    run
}

/// Text of one run.
pub fn run_text(run: &XmlElement) -> String {
    run.child("a:t").map(XmlElement::text).unwrap_or_default()
}

/// Replace the text of one run, keeping its formatting.
pub fn set_run_text(run: &mut XmlElement, text: &str) {
    let at = run.children().len();
    run.ensure_child("a:t", at).set_text(text);
}

pub fn run_size_pt(run: &XmlElement) -> Option<f64> {
    run.child("a:rPr")
        .and_then(|r_pr| r_pr.attr_i64("sz"))
        .map(centipoints_to_pt)
}

pub fn set_run_size_pt(run: &mut XmlElement, pt: f64) {
    run.ensure_child("a:rPr", 0)
        .set_attr_i64("sz", pt_to_centipoints(pt));
}

/// The `a:r` children of a paragraph.
pub fn paragraph_runs(paragraph: &XmlElement) -> Vec<&XmlElement> {
    paragraph.elements().filter(|e| e.is("a:r")).collect()
}

/// Paragraph text: runs and fields, with line breaks as `\n`.
pub fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut text = String::new();
    for e in paragraph.elements() {
        match e.name() {
            "a:r" | "a:fld" => text.push_str(&run_text(e)),
            "a:br" => text.push('\n'),
            _ => {},
        }
    }
    text
}

/// Text of a `p:txBody`, paragraphs joined with `\n`.
pub fn body_text(body: &XmlElement) -> String {
    body.elements()
        .filter(|e| e.is("a:p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mutable view of a shape's `p:txBody`.
pub struct TextFrame<'a> {
    body: &'a mut XmlElement,
}

impl<'a> TextFrame<'a> {
    pub fn new(body: &'a mut XmlElement) -> Self {
        Self { body }
    }

    pub fn text(&self) -> String {
        body_text(self.body)
    }

    fn body_pr(&mut self) -> &mut XmlElement {
        self.body.ensure_child("a:bodyPr", 0)
    }

    /// Set all four insets, in EMU.
    pub fn set_margins(&mut self, left: i64, top: i64, right: i64, bottom: i64) {
        let body_pr = self.body_pr();
        body_pr.set_attr_i64("lIns", left);
        body_pr.set_attr_i64("tIns", top);
        body_pr.set_attr_i64("rIns", right);
        body_pr.set_attr_i64("bIns", bottom);
    }

    pub fn clear_margins(&mut self) {
        self.set_margins(0, 0, 0, 0);
    }

    /// Turn autofit off: the frame neither shrinks text nor resizes the shape.
    pub fn set_auto_size_none(&mut self) {
        let body_pr = self.body_pr();
        body_pr.remove_children(|e| AUTOFIT_ELEMENTS.contains(&e.name()));
        let at = body_pr.position_of("a:prstTxWarp").map_or(0, |p| p + 1);
        body_pr.insert_child(at, XmlElement::new("a:noAutofit"));
    }

    pub fn set_word_wrap(&mut self, wrap: bool) {
        self.body_pr()
            .set_attr("wrap", if wrap { "square" } else { "none" });
    }

    pub fn set_anchor_top(&mut self) {
        self.body_pr().set_attr("anchor", "t");
    }

    /// Zero margins and no autofit, with the given wrap mode.
    pub fn fit_tight(&mut self, wrap: bool) {
        self.clear_margins();
        self.set_auto_size_none();
        self.set_word_wrap(wrap);
    }

    pub fn paragraphs(&self) -> Vec<&XmlElement> {
        self.body.elements().filter(|e| e.is("a:p")).collect()
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.body.elements_mut().filter(|e| e.is("a:p"))
    }

    /// Formatting of the first run of the first paragraph that has runs.
    pub fn first_run_format(&self) -> Option<RunFormat> {
        self.paragraphs()
            .into_iter()
            .find_map(|p| paragraph_runs(p).first().map(|r| RunFormat::from_run(r)))
    }

    /// Size of the first paragraph-leading run, in points.
    pub fn first_run_size_pt(&self) -> Option<f64> {
        self.first_run_format().and_then(|f| f.size_pt)
    }

    /// Size of the first run anywhere that sets one explicitly.
    pub fn first_sized_run_pt(&self) -> Option<f64> {
        self.paragraphs()
            .into_iter()
            .flat_map(paragraph_runs)
            .find_map(run_size_pt)
    }

    pub fn set_all_run_sizes(&mut self, pt: f64) {
        for p in self.paragraphs_mut() {
            for run in p.elements_mut().filter(|e| e.is("a:r")) {
                set_run_size_pt(run, pt);
            }
        }
    }

    /// The first paragraph, created when the body has none.
    fn first_paragraph_mut(&mut self) -> &mut XmlElement {
        let at = self.body.children().len();
        self.body.ensure_child("a:p", at)
    }

    /// Replace the text content with `runs` in a single paragraph.
    ///
    /// The first paragraph's properties survive; other paragraphs are removed.
    /// A `None` entry becomes a line break.
    pub fn set_single_paragraph(&mut self, runs: Vec<Option<XmlElement>>) {
        let first = self.first_paragraph_mut();
        clear_paragraph(first);
        let at = first.position_of("a:endParaRPr");
        let mut insert_at = at.unwrap_or(first.children().len());
        for run in runs {
            let node = run.unwrap_or_else(|| XmlElement::new("a:br"));
            first.insert_child(insert_at, node);
            insert_at += 1;
        }

        let mut seen_first = false;
        self.body.remove_children(|e| {
            if !e.is("a:p") {
                return false;
            }
            let remove = seen_first;
            seen_first = true;
            remove
        });
    }
}

/// Remove runs, fields and breaks, keeping `a:pPr` and `a:endParaRPr`.
pub fn clear_paragraph(paragraph: &mut XmlElement) {
    paragraph.remove_children(|e| matches!(e.name(), "a:r" | "a:br" | "a:fld"));
    paragraph
        .children_mut()
        .retain(|n| matches!(n, XmlNode::Element(_)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::dom::XmlDocument;

    fn body(xml: &str) -> XmlElement {
        XmlDocument::parse(xml.as_bytes()).unwrap().root
    }

    const TWO_PARAGRAPHS: &str = r#"<p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="1400" b="1"><a:ln/><a:solidFill><a:schemeClr val="tx1"/></a:solidFill></a:rPr><a:t>First</a:t></a:r><a:br/><a:r><a:t> line</a:t></a:r><a:endParaRPr lang="en-US"/></a:p><a:p><a:r><a:rPr sz="900"/><a:t>Second</a:t></a:r></a:p></p:txBody>"#;

    #[test]
    fn test_text_and_first_run_format() {
        let mut b = body(TWO_PARAGRAPHS);
        let frame = TextFrame::new(&mut b);
        assert_eq!(frame.text(), "First\n line\nSecond");

        let format = frame.first_run_format().unwrap();
        assert_eq!(format.size_pt, Some(14.0));
        assert_eq!(format.bold, Some(true));
        assert_eq!(format.italic, None);
        assert_eq!(format.color, None);
    }

    #[test]
    fn test_body_properties() {
        let mut b = body(TWO_PARAGRAPHS);
        let mut frame = TextFrame::new(&mut b);
        frame.fit_tight(false);
        frame.set_anchor_top();

        let body_pr = b.child("a:bodyPr").unwrap();
        assert_eq!(body_pr.attr("lIns"), Some("0"));
        assert_eq!(body_pr.attr("bIns"), Some("0"));
        assert_eq!(body_pr.attr("wrap"), Some("none"));
        assert_eq!(body_pr.attr("anchor"), Some("t"));
        let children: Vec<_> = body_pr.elements().map(XmlElement::name).collect();
        assert_eq!(children, ["a:noAutofit"]);
    }

    #[test]
    fn test_apply_color_replaces_fill_after_line() {
        let mut b = body(TWO_PARAGRAPHS);
        let run = b.find_mut("a:p/a:r").unwrap();
        RunFormat {
            color: Some(RGBColor::WHITE),
            italic: Some(true),
            ..Default::default()
        }
        .apply_to(run);

        let r_pr = run.child("a:rPr").unwrap();
        let children: Vec<_> = r_pr.elements().map(XmlElement::name).collect();
        assert_eq!(children, ["a:ln", "a:solidFill"]);
        assert_eq!(r_pr.attr("i"), Some("1"));
        assert_eq!(RunFormat::from_run(run).color, Some(RGBColor::WHITE));
    }

    #[test]
    fn test_set_single_paragraph() {
        let mut b = body(TWO_PARAGRAPHS);
        let mut frame = TextFrame::new(&mut b);
        let format = RunFormat {
            size_pt: Some(11.0),
            ..Default::default()
        };
        frame.set_single_paragraph(vec![
            Some(new_run("Line one", &format)),
            None,
            Some(new_run("Line two…", &format)),
        ]);

        assert_eq!(frame.paragraphs().len(), 1);
        assert_eq!(frame.text(), "Line one\nLine two…");
        let p = frame.paragraphs()[0];
        let names: Vec<_> = p.elements().map(XmlElement::name).collect();
        assert_eq!(names, ["a:pPr", "a:r", "a:br", "a:r", "a:endParaRPr"]);
        assert_eq!(frame.first_run_size_pt(), Some(11.0));
    }

    #[test]
    fn test_run_sizes() {
        let mut b = body(TWO_PARAGRAPHS);
        let mut frame = TextFrame::new(&mut b);
        assert_eq!(frame.first_sized_run_pt(), Some(14.0));

        frame.set_all_run_sizes(6.0);
        let sizes: Vec<_> = frame
            .paragraphs()
            .into_iter()
            .flat_map(paragraph_runs)
            .map(run_size_pt)
            .collect();
        assert_eq!(sizes, [Some(6.0), Some(6.0), Some(6.0)]);
    }
}
