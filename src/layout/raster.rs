//! Bitmap preparation: aspect cropping, JPEG encoding and SVG rasterization.
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::common::{Error, Result};

/// Center-crop `img` to `aspect` (width / height).
pub fn crop_to_aspect(img: DynamicImage, aspect: f64) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 || !aspect.is_finite() || aspect <= 0.0 {
        return img;
    }

    let current = width as f64 / height as f64;
    if current > aspect {
        let new_width = ((height as f64 * aspect) as u32).clamp(1, width);
        let left = (width - new_width) / 2;
        img.crop_imm(left, 0, new_width, height)
    } else if current < aspect {
        let new_height = ((width as f64 / aspect) as u32).clamp(1, height);
        let top = (height - new_height) / 2;
        img.crop_imm(0, top, width, new_height)
    } else {
        img
    }
}

/// Decode `data`, crop it to `aspect` and re-encode as JPEG.
pub fn crop_to_jpeg(data: &[u8], aspect: f64, quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let rgb = crop_to_aspect(img, aspect).to_rgb8();

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

/// Decode any supported bitmap and re-encode it as PNG.
pub fn to_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Render an SVG into a PNG no larger than `max_width` × `max_height`.
///
/// The drawing keeps its aspect ratio; the bitmap is the scaled drawing size.
#[cfg(feature = "svg")]
pub fn rasterize_svg(data: &[u8], max_width: u32, max_height: u32) -> Result<Vec<u8>> {
    use resvg::{tiny_skia, usvg};

    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(|e| Error::Image(format!("invalid SVG: {e}")))?;
    let size = tree.size();
    let (svg_width, svg_height) = (size.width(), size.height());
    if svg_width <= 0.0 || svg_height <= 0.0 {
        return Err(Error::Image("SVG has an empty canvas".to_string()));
    }

    let scale = (max_width as f32 / svg_width).min(max_height as f32 / svg_height);
    let width = ((svg_width * scale).round() as u32).max(1);
    let height = ((svg_height * scale).round() as u32).max(1);

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| Error::Image(format!("cannot allocate {width}x{height} bitmap")))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|e| Error::Image(format!("PNG encoding failed: {e}")))
}

#[cfg(not(feature = "svg"))]
pub fn rasterize_svg(_data: &[u8], _max_width: u32, _max_height: u32) -> Result<Vec<u8>> {
    Err(Error::Image("SVG support is disabled (enable the `svg` feature)".to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40])));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_crop_wide_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(40, 20));
        let cropped = crop_to_aspect(img, 2_109_600.0 / 2_160_000.0);
        assert_eq!(cropped.dimensions(), (19, 20));
    }

    #[test]
    fn test_crop_tall_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(20, 40));
        let cropped = crop_to_aspect(img, 1.0);
        assert_eq!(cropped.dimensions(), (20, 20));
    }

    #[test]
    fn test_crop_to_jpeg() {
        let jpeg = crop_to_jpeg(&png_bytes(40, 20), 1.0, 90).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (20, 20));
    }

    #[test]
    fn test_crop_rejects_garbage() {
        assert!(matches!(crop_to_jpeg(b"not an image", 1.0, 90), Err(Error::Image(_))));
    }

    #[cfg(feature = "svg")]
    #[test]
    fn test_rasterize_svg_keeps_aspect() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><rect width="100" height="50" fill="#0a4"/></svg>"##;
        let png = rasterize_svg(svg, 60, 60).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (60, 30));
    }
}
