//! The overview slide's columns: title, rule and description under each image.
use tracing::debug;

use super::index::ShapeIndex;
use super::wrap::{chars_per_line, wrap_lines};
use super::SlideContext;
use crate::common::Result;
use crate::ooxml::pptx::shapes::textframe::new_run;
use crate::ooxml::pptx::{ShapeGeometry, SlideDocument};
use crate::placeholders::keys::{self, SLOTS};

/// Descriptions shorter than these get bigger text.
const SHORT_DESCRIPTION: usize = 100;
const MEDIUM_DESCRIPTION: usize = 150;
/// Descriptions longer than this drop to the small size.
const LONG_DESCRIPTION: usize = 200;

/// Align every column under its image.
///
/// Column `i` uses the `i`-th image from the left. Titles are wrapped to the
/// image width and pinned to a common top; the rule and description follow
/// below. A column without a title shape is left alone. Returns the number
/// of shapes adjusted.
pub fn arrange_overview(slide: &mut SlideDocument, ctx: &SlideContext) -> Result<usize> {
    let config = ctx.config;
    let index = ShapeIndex::build(slide);
    let mut images: Vec<ShapeGeometry> = index
        .large_pictures(config.min_image_area, config.max_case_images)
        .iter()
        .filter_map(|p| p.geometry)
        .collect();
    images.sort_by_key(|g| g.left);

    let mut adjusted = 0;
    for slot in 1..=SLOTS {
        let image = images.get(slot - 1).copied();
        let Some(title) = index.containing(&keys::title(slot)) else {
            debug!(slot, "no title shape, column skipped");
            continue;
        };
        let line = index.named(&format!("line{slot}"));
        let description = index.containing(&keys::description(slot));

        let column_width = match (image, title.geometry) {
            (Some(_), _) => Some(config.standard_image_width),
            (None, Some(g)) => Some(g.width),
            (None, None) => None,
        };

        let shape = slide.shape_mut(title.id);
        shape.set_top(config.title_top);
        let text = title.text.trim();
        if let Some(width) = column_width.filter(|_| !text.is_empty()) {
            if let Some(mut frame) = shape.text_frame() {
                let format = frame.first_run_format().unwrap_or_default();
                let font_pt = format.size_pt.unwrap_or(config.title_default_font_pt);
                let limit = chars_per_line(width, font_pt, config.title_char_width_factor, config.title_min_chars);
                let lines = wrap_lines(text, limit, config.title_max_lines);

                frame.fit_tight(true);
                frame.set_anchor_top();
                let mut runs = Vec::with_capacity(lines.len() * 2);
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        runs.push(None);
                    }
                    runs.push(Some(new_run(line, &format)));
                }
                frame.set_single_paragraph(runs);
            }
            shape.set_width(width);
            if let Some(image) = image {
                shape.set_left(image.left);
            }
            shape.set_height(config.title_height);
        }
        adjusted += 1;

        let rule_width = column_width.map(|w| (w as f64 * config.line_width_factor).floor() as i64);
        let rule_left = image.map(|g| g.left + config.line_left_offset);

        let mut description_top = None;
        if let Some(line) = line {
            let top = config.title_top + config.line_top_offset;
            let shape = slide.shape_mut(line.id);
            shape.set_top(top);
            if let Some(width) = rule_width {
                shape.set_width(width);
            }
            if let Some(left) = rule_left {
                shape.set_left(left);
            }
            let height = line.geometry.map_or(0, |g| g.height);
            description_top = Some(top + height + config.description_gap);
            adjusted += 1;
        }

        if let Some(description) = description {
            let shape = slide.shape_mut(description.id);
            if let Some(top) = description_top {
                shape.set_top(top);
            }
            if let Some(width) = rule_width {
                shape.set_width(width);
            }
            if let Some(left) = rule_left {
                shape.set_left(left);
            }
            if let Some(mut frame) = shape.text_frame() {
                frame.fit_tight(true);
                frame.set_anchor_top();

                let len = description.text.chars().count();
                let base = frame.first_sized_run_pt();
                let size = match base {
                    _ if len > LONG_DESCRIPTION => Some(config.description_small_font_pt),
                    Some(pt) if len < SHORT_DESCRIPTION => Some(pt + 2.0),
                    Some(pt) if len < MEDIUM_DESCRIPTION => Some(pt + 1.0),
                    other => other,
                };
                if let Some(pt) = size.filter(|&pt| Some(pt) != base) {
                    frame.set_all_run_sizes(pt);
                }
            }
            adjusted += 1;
        }
    }
    Ok(adjusted)
}
