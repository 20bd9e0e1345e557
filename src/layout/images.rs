//! Swapping the template's picture placeholders for case-study images.
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::index::ShapeIndex;
use super::raster;
use super::{MediaSink, SlideContext};
use crate::common::Result;
use crate::ooxml::pptx::shapes::picture::new_picture;
use crate::ooxml::pptx::{ImageFormat, ShapeGeometry, SlideDocument, ZOrder};
use crate::placeholders::keys::{self, SLOTS};
use crate::placeholders::PlaceholderTable;

/// Replace large placeholder pictures with the slots' image files.
///
/// Slots with an image file are paired with the placeholders in order. Every
/// new picture shares the top edge of the highest placeholder. A placeholder
/// is removed only once its replacement is on the slide.
pub fn place_images(
    slide: &mut SlideDocument,
    table: &PlaceholderTable,
    ctx: &SlideContext,
    media: &mut dyn MediaSink,
) -> Result<usize> {
    let config = ctx.config;
    let index = ShapeIndex::build(slide);
    let pictures = index.large_pictures(config.min_image_area, config.max_case_images);
    let geometries: Vec<ShapeGeometry> = pictures.iter().filter_map(|p| p.geometry).collect();
    let (Some(first), Some(top)) = (geometries.first(), geometries.iter().map(|g| g.top).min()) else {
        debug!(slide = ctx.index, "no image placeholders");
        return Ok(0);
    };

    let (width, height) = if ctx.is_overview() {
        (config.standard_image_width, config.standard_image_height)
    } else {
        (first.width, first.height)
    };

    let sources = (1..=SLOTS).filter_map(|n| table.media(&keys::image(n)));
    let mut placed = 0;
    for ((placeholder, geometry), path) in pictures.iter().zip(&geometries).zip(sources) {
        if !path.exists() {
            warn!(path = %path.display(), "case-study image missing; keeping placeholder");
            continue;
        }
        let (data, format) = match prepare(path, ctx) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot prepare image; keeping placeholder");
                continue;
            },
        };
        let r_id = match media.embed(data, format) {
            Ok(r_id) => r_id,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot embed image; keeping placeholder");
                continue;
            },
        };

        let target = ShapeGeometry::new(geometry.left, top, width, height);
        let id = slide.next_shape_id();
        slide.add_shape(new_picture(id, &format!("Picture {id}"), &r_id, target), ZOrder::Back);
        slide.shape_mut(placeholder.id).remove();
        placed += 1;
    }
    Ok(placed)
}

/// Image bytes ready for embedding.
///
/// The overview gets JPEGs cropped to the standard tile aspect; other slides
/// take the file as is when its format is recognized.
fn prepare(path: &Path, ctx: &SlideContext) -> Result<(Vec<u8>, ImageFormat)> {
    let data = fs::read(path)?;
    let config = ctx.config;
    if ctx.is_overview() {
        let aspect = config.standard_image_width as f64 / config.standard_image_height as f64;
        let jpeg = raster::crop_to_jpeg(&data, aspect, config.jpeg_quality)?;
        return Ok((jpeg, ImageFormat::Jpeg));
    }
    match ImageFormat::detect_from_bytes(&data) {
        Some(format) => Ok((data, format)),
        None => Ok((raster::to_png(&data)?, ImageFormat::Png)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::index::tests::{pic, slide};
    use crate::layout::raster::tests::png_bytes;
    use crate::layout::tests::MemorySink;
    use crate::ooxml::pptx::ShapeType;

    fn template() -> SlideDocument {
        let body = [
            pic(2, "Picture 1", 100, 500, 2_000_000, 2_000_000),
            pic(3, "Picture 2", 3_000_000, 400, 2_000_000, 2_000_000),
            pic(4, "Picture 3", 6_000_000, 600, 2_000_000, 2_000_000),
        ]
        .concat();
        slide(&body)
    }

    fn pictures(doc: &SlideDocument) -> Vec<(String, ShapeGeometry)> {
        doc.live_shapes()
            .filter(|(_, s)| s.kind() == ShapeType::Picture)
            .map(|(_, s)| (s.name().to_string(), s.geometry().unwrap()))
            .collect()
    }

    #[test]
    fn test_overview_images_are_cropped_and_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.png");
        std::fs::write(&image, png_bytes(40, 20)).unwrap();

        let mut table = PlaceholderTable::new();
        table.insert_text("case_study_1_image", "[Image placeholder]");
        table.insert_media("case_study_2_image", &image);
        table.insert_media("case_study_3_image", dir.path().join("missing.png"));

        let config = LayoutConfig::default();
        let ctx = SlideContext::new(&config, 0);
        let mut doc = template();
        let mut sink = MemorySink::default();
        let placed = place_images(&mut doc, &table, &ctx, &mut sink).unwrap();
        assert_eq!(placed, 1);

        assert_eq!(sink.images.len(), 1);
        assert_eq!(sink.images[0].1, ImageFormat::Jpeg);

        let pics = pictures(&doc);
        assert_eq!(pics.len(), 3);
        // the new picture goes to the back
        assert_eq!(pics[0].0, "Picture 5");
        assert_eq!(pics[0].1, ShapeGeometry::new(100, 400, 2_109_600, 2_160_000));
        assert!(doc.find_by_name("Picture 1").is_none());
        assert!(doc.find_by_name("Picture 2").is_some());
    }

    #[test]
    fn test_other_slides_keep_bytes_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.png");
        let bytes = png_bytes(10, 10);
        std::fs::write(&image, &bytes).unwrap();

        let mut table = PlaceholderTable::new();
        table.insert_media("case_study_1_image", &image);

        let config = LayoutConfig::default();
        let ctx = SlideContext::new(&config, 1);
        let mut doc = template();
        let mut sink = MemorySink::default();
        assert_eq!(place_images(&mut doc, &table, &ctx, &mut sink).unwrap(), 1);
        assert_eq!(sink.images[0], (bytes, ImageFormat::Png));
        assert_eq!(pictures(&doc)[0].1, ShapeGeometry::new(100, 400, 2_000_000, 2_000_000));
    }

    #[test]
    fn test_undecodable_image_keeps_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("broken.jpg");
        std::fs::write(&image, b"not an image").unwrap();

        let mut table = PlaceholderTable::new();
        table.insert_media("case_study_1_image", &image);

        let config = LayoutConfig::default();
        let ctx = SlideContext::new(&config, 0);
        let mut doc = template();
        let mut sink = MemorySink::default();
        assert_eq!(place_images(&mut doc, &table, &ctx, &mut sink).unwrap(), 0);
        assert!(sink.images.is_empty());
        assert!(doc.find_by_name("Picture 1").is_some());
    }
}
