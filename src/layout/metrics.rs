//! Merging each metric value with its label into one line.
use super::index::ShapeIndex;
use super::SlideContext;
use crate::common::unit::pt_to_emu_f64;
use crate::common::{RGBColor, Result};
use crate::ooxml::pptx::shapes::textframe::new_run;
use crate::ooxml::pptx::shapes::RunFormat;
use crate::ooxml::pptx::SlideDocument;
use crate::placeholders::keys;

/// Rewrite `nK` as "metric label" and drop the separate label shape.
///
/// The label shrinks when the estimated line would not fit; on the overview
/// the line may not be wider than an image tile. Metrics with no text keep
/// their label.
pub fn merge_metric_labels(slide: &mut SlideDocument, ctx: &SlideContext) -> Result<usize> {
    let config = ctx.config;
    let index = ShapeIndex::build(slide);

    let mut merged = 0;
    for (slot, metric) in index.metric_shapes() {
        let metric_text = metric.text.trim();
        if metric_text.is_empty() {
            continue;
        }
        let Some(metric_geometry) = metric.geometry else {
            continue;
        };
        if let Some(mut frame) = slide.shape_mut(metric.id).text_frame() {
            frame.fit_tight(false);
        }

        let label_key = keys::metric_label(slot);
        let Some(label) = index.iter().find(|s| s.key.contains(&label_key) && s.has_text()) else {
            continue;
        };
        let label_text = label.text.trim();
        let label_width = label.geometry.map_or(0, |g| g.width);

        let spacer = if metric_text.starts_with(['x', 'X']) { "  " } else { " " };
        let mut metric_format = slide
            .shape_mut(metric.id)
            .text_frame()
            .and_then(|frame| frame.first_run_format())
            .unwrap_or_default();
        let metric_pt = metric_format.size_pt.unwrap_or(config.metric_default_font_pt);

        let estimate_pt = metric_pt * config.metric_char_factor * metric_text.chars().count() as f64
            + config.label_default_font_pt
                * config.label_char_factor
                * (label_text.chars().count() + spacer.len()) as f64;
        let estimate = pt_to_emu_f64(estimate_pt);
        let allowed = if ctx.is_overview() {
            config.standard_image_width
        } else {
            metric_geometry.width + label_width
        };
        let label_pt = if estimate > allowed && estimate > 0 {
            (config.label_default_font_pt * allowed as f64 / estimate as f64)
                .floor()
                .max(config.label_min_font_pt)
        } else {
            config.label_default_font_pt
        };

        metric_format.bold = Some(true);
        metric_format.italic = Some(true);
        metric_format.color = Some(RGBColor::WHITE);
        let label_format = RunFormat {
            size_pt: Some(label_pt),
            bold: Some(false),
            italic: Some(true),
            color: Some(RGBColor::WHITE),
        };

        let mut width = metric_geometry.width + label_width;
        if ctx.is_overview() {
            width = width.min(config.standard_image_width);
        }

        let shape = slide.shape_mut(metric.id);
        if let Some(mut frame) = shape.text_frame() {
            frame.set_single_paragraph(vec![
                Some(new_run(metric_text, &metric_format)),
                Some(new_run(spacer, &label_format)),
                Some(new_run(label_text, &label_format)),
            ]);
        }
        shape.set_width(width);
        slide.shape_mut(label.id).remove();
        merged += 1;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::index::tests::{placed_shape, slide};
    use crate::ooxml::pptx::shapes::textframe::{paragraph_runs, run_size_pt, run_text};

    fn runs(doc: &SlideDocument, name: &str) -> Vec<(String, Option<f64>, RunFormat)> {
        let shape = doc.shape(doc.find_by_name(name).unwrap());
        let body = shape.element().child("p:txBody").unwrap();
        let paragraphs: Vec<_> = body.elements().filter(|e| e.is("a:p")).collect();
        assert_eq!(paragraphs.len(), 1);
        paragraph_runs(paragraphs[0])
            .into_iter()
            .map(|r| (run_text(r), run_size_pt(r), RunFormat::from_run(r)))
            .collect()
    }

    #[test]
    fn test_metric_and_label_merge_on_detail_slide() {
        let body = [
            placed_shape(2, "n1", " 40% ", (100, 100, 1_000_000, 400_000), None, Some(3000)),
            placed_shape(3, "metric_label_case_study_1", "less downtime", (1_200_000, 100, 1_500_000, 400_000), None, None),
        ]
        .concat();
        let mut doc = slide(&body);
        let config = LayoutConfig::default();
        let ctx = SlideContext::new(&config, 1);
        assert_eq!(merge_metric_labels(&mut doc, &ctx).unwrap(), 1);

        let runs = runs(&doc, "n1");
        let texts: Vec<_> = runs.iter().map(|r| r.0.as_str()).collect();
        assert_eq!(texts, ["40%", " ", "less downtime"]);
        assert_eq!(runs[0].1, Some(30.0));
        assert_eq!(runs[0].2.bold, Some(true));
        assert_eq!(runs[2].1, Some(11.0));
        assert_eq!(runs[2].2.bold, Some(false));
        assert_eq!(runs[2].2.color, Some(RGBColor::WHITE));

        assert!(doc.find_by_name("metric_label_case_study_1").is_none());
        let n1 = doc.shape(doc.find_by_name("n1").unwrap());
        assert_eq!(n1.geometry().unwrap().width, 2_500_000);
    }

    #[test]
    fn test_long_label_shrinks_on_overview() {
        let label = "reduction in unplanned maintenance events";
        let body = [
            placed_shape(2, "n2", "x3", (100, 100, 1_500_000, 400_000), None, Some(3000)),
            placed_shape(3, "metric_label_case_study_2", label, (1_700_000, 100, 1_500_000, 400_000), None, None),
        ]
        .concat();
        let mut doc = slide(&body);
        let config = LayoutConfig::default();
        assert_eq!(merge_metric_labels(&mut doc, &SlideContext::new(&config, 0)).unwrap(), 1);

        // (30 * 0.6 * 2 + 11 * 0.5 * 43) pt = 272.5pt; 2_109_600 / 3_460_750 * 11 = 6.7
        let runs = runs(&doc, "n2");
        assert_eq!(runs[1].0, "  ");
        assert_eq!(runs[2].1, Some(8.0));
        let n2 = doc.shape(doc.find_by_name("n2").unwrap());
        assert_eq!(n2.geometry().unwrap().width, 2_109_600);
    }

    #[test]
    fn test_empty_metric_keeps_label() {
        let body = [
            placed_shape(2, "n3", "  ", (100, 100, 1_500_000, 400_000), None, None),
            placed_shape(3, "metric_label_case_study_3", "label", (1_700_000, 100, 1_500_000, 400_000), None, None),
        ]
        .concat();
        let mut doc = slide(&body);
        let config = LayoutConfig::default();
        assert_eq!(merge_metric_labels(&mut doc, &SlideContext::new(&config, 0)).unwrap(), 0);
        assert!(doc.find_by_name("metric_label_case_study_3").is_some());
    }
}
