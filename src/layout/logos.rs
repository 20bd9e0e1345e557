//! Client logos: SVG files rasterized into the template's logo frames.
use std::fs;

use tracing::warn;

use super::index::ShapeIndex;
use super::raster;
use super::{MediaSink, SlideContext};
use crate::common::unit::emu_to_px;
use crate::common::Result;
use crate::ooxml::pptx::shapes::picture::new_picture;
use crate::ooxml::pptx::{ImageFormat, SlideDocument, ZOrder};
use crate::placeholders::keys::{self, SLOTS};
use crate::placeholders::PlaceholderTable;

/// Put each slot's logo over the logo picture of the same rank.
///
/// Logo pictures are ranked by name. The SVG is rendered at the frame's size
/// (at the configured DPI and oversampling) and placed on top; the template
/// logo goes once the new one is in.
pub fn place_logos(
    slide: &mut SlideDocument,
    table: &PlaceholderTable,
    ctx: &SlideContext,
    media: &mut dyn MediaSink,
) -> Result<usize> {
    let config = ctx.config;
    let index = ShapeIndex::build(slide);
    let frames = index.logo_pictures();

    let mut placed = 0;
    for (frame, n) in frames.iter().zip(1..=SLOTS) {
        let Some(path) = table.media(&keys::logo(n)) else {
            continue;
        };
        let Some(geometry) = frame.geometry else {
            continue;
        };
        if !path.exists() {
            warn!(path = %path.display(), "logo file missing");
            continue;
        }

        let width_px = emu_to_px(geometry.width, config.logo_dpi, config.logo_oversample);
        let height_px = emu_to_px(geometry.height, config.logo_dpi, config.logo_oversample);
        let png = match fs::read(path)
            .map_err(Into::into)
            .and_then(|svg| raster::rasterize_svg(&svg, width_px, height_px))
        {
            Ok(png) => png,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot rasterize logo");
                continue;
            },
        };
        let r_id = match media.embed(png, ImageFormat::Png) {
            Ok(r_id) => r_id,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot embed logo");
                continue;
            },
        };

        let id = slide.next_shape_id();
        slide.add_shape(new_picture(id, &format!("Logo {n}"), &r_id, geometry), ZOrder::Front);
        slide.shape_mut(frame.id).remove();
        placed += 1;
    }
    Ok(placed)
}
