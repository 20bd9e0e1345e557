//! Background boxes sized to the text they sit behind.
use super::index::{IndexedShape, ShapeIndex};
use super::SlideContext;
use crate::common::unit::pt_to_emu_f64;
use crate::common::{RGBColor, Result};
use crate::ooxml::pptx::{ShapeGeometry, SlideDocument};
use crate::placeholders::keys;

/// Shrink each grey category box around its category text.
///
/// A box `greyN` is only touched when slot N has a name shape on the slide.
/// Its text is the closest text shape that starts level with the box and
/// overlaps it horizontally.
pub fn fit_grey_boxes(slide: &mut SlideDocument, ctx: &SlideContext) -> Result<usize> {
    let config = ctx.config;
    let index = ShapeIndex::build(slide);

    let mut fitted = 0;
    for (slot, grey) in index.grey_boxes() {
        if index.containing(&keys::name(slot)).is_none() {
            continue;
        }
        let Some(box_geometry) = grey.geometry else {
            continue;
        };
        let Some((text, text_geometry)) = index
            .text_shapes()
            .filter(|s| s.id != grey.id)
            .filter_map(with_geometry)
            .filter(|(_, g)| {
                g.overlaps_horizontally(&box_geometry)
                    && (g.top - box_geometry.top).abs() < config.grey_top_tolerance
            })
            .min_by_key(|(_, g)| (g.top - box_geometry.top).abs())
        else {
            continue;
        };

        let chars = text.text.trim().chars().count() as i64;
        let text_width = chars * config.grey_char_width;
        let text_shape = slide.shape_mut(text.id);
        text_shape.set_width(text_width);
        if let Some(mut frame) = text_shape.text_frame() {
            frame.fit_tight(false);
        }

        let horizontal = config.grey_text_padding + config.grey_horizontal_padding;
        slide.shape_mut(grey.id).set_geometry(ShapeGeometry::new(
            text_geometry.left - horizontal / 2,
            text_geometry.top - config.grey_vertical_padding,
            text_width + horizontal,
            text_geometry.height + 2 * config.grey_vertical_padding,
        ));
        fitted += 1;
    }
    Ok(fitted)
}

/// Widen or narrow small white boxes to the label they frame.
///
/// The label is the overlapping text shape whose center is horizontally
/// closest to the box's.
pub fn fit_white_boxes(slide: &mut SlideDocument, ctx: &SlideContext) -> Result<usize> {
    let config = ctx.config;
    let index = ShapeIndex::build(slide);

    let mut fitted = 0;
    for white in index.iter().filter(|s| s.fill == Some(RGBColor::WHITE)) {
        let Some(box_geometry) = white.geometry else {
            continue;
        };
        if box_geometry.height >= config.white_box_max_height || box_geometry.width >= config.white_box_max_width {
            continue;
        }

        let Some((label, _)) = index
            .text_shapes()
            .filter(|s| s.id != white.id)
            .filter_map(with_geometry)
            .filter(|(_, g)| g.overlaps_horizontally(&box_geometry) && g.overlaps_vertically(&box_geometry))
            .min_by(|(_, a), (_, b)| {
                let da = (a.center_x() - box_geometry.center_x()).abs();
                let db = (b.center_x() - box_geometry.center_x()).abs();
                da.total_cmp(&db)
            })
        else {
            continue;
        };

        let font_pt = slide
            .shape_mut(label.id)
            .text_frame()
            .and_then(|frame| frame.first_run_size_pt())
            .unwrap_or(config.white_box_default_font_pt);
        let chars = label.text.trim().chars().count() as i64;
        let char_width = pt_to_emu_f64(font_pt * config.white_box_char_factor);
        let width = chars * char_width + pt_to_emu_f64(config.white_box_padding_pt);

        slide.shape_mut(white.id).set_width(width);
        fitted += 1;
    }
    Ok(fitted)
}

fn with_geometry(shape: &IndexedShape) -> Option<(&IndexedShape, ShapeGeometry)> {
    shape.geometry.map(|g| (shape, g))
}
