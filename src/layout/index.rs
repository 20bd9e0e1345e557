//! A snapshot of a slide's shapes, keyed the way layout rules look them up.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::common::RGBColor;
use crate::ooxml::pptx::{ShapeGeometry, ShapeId, ShapeType, SlideDocument};

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static GREY_SLOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"grey(\d+)").expect("valid regex"));
static METRIC_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^n(\d+)$").expect("valid regex"));

/// Sort key for pictures without a number in their name.
const UNNUMBERED: u32 = 999;

#[derive(Debug, Clone)]
pub struct IndexedShape {
    pub id: ShapeId,
    pub name: String,
    /// Lowercased name
    pub key: String,
    pub kind: ShapeType,
    pub geometry: Option<ShapeGeometry>,
    pub text: String,
    pub fill: Option<RGBColor>,
}

impl IndexedShape {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Shapes of one slide in z-order, as they were when the index was built.
///
/// Layout stages move and delete shapes, so each stage builds its own.
#[derive(Debug, Clone, Default)]
pub struct ShapeIndex {
    shapes: Vec<IndexedShape>,
}

impl ShapeIndex {
    pub fn build(slide: &SlideDocument) -> Self {
        let shapes = slide
            .live_shapes()
            .map(|(id, shape)| IndexedShape {
                id,
                name: shape.name().to_string(),
                key: shape.name().to_lowercase(),
                kind: shape.kind(),
                geometry: shape.geometry(),
                text: shape.text(),
                fill: shape.fill_color(),
            })
            .collect();
        Self { shapes }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedShape> {
        self.shapes.iter()
    }

    /// First shape whose lowercased name contains `needle`.
    pub fn containing(&self, needle: &str) -> Option<&IndexedShape> {
        let needle = needle.to_lowercase();
        self.shapes.iter().find(|s| s.key.contains(&needle))
    }

    /// First shape named exactly `name`.
    pub fn named(&self, name: &str) -> Option<&IndexedShape> {
        self.shapes.iter().find(|s| s.name == name)
    }

    /// Case-study pictures: large, not logos, ordered by the number in their name.
    pub fn large_pictures(&self, min_area: f64, max: usize) -> Vec<&IndexedShape> {
        let mut pictures: Vec<_> = self
            .shapes
            .iter()
            .filter(|s| s.kind == ShapeType::Picture && !s.key.contains("logo"))
            .filter(|s| s.geometry.is_some_and(|g| g.area() >= min_area))
            .collect();
        pictures.sort_by_key(|s| picture_number(&s.name));
        pictures.truncate(max);
        pictures
    }

    /// Logo pictures, ordered by name.
    pub fn logo_pictures(&self) -> Vec<&IndexedShape> {
        let mut logos: Vec<_> = self
            .shapes
            .iter()
            .filter(|s| s.kind == ShapeType::Picture && s.key.contains("logo"))
            .collect();
        logos.sort_by(|a, b| a.name.cmp(&b.name));
        logos
    }

    /// Grey category boxes with their slot number.
    pub fn grey_boxes(&self) -> Vec<(usize, &IndexedShape)> {
        self.shapes
            .iter()
            .filter(|s| s.key.starts_with("grey"))
            .filter_map(|s| {
                let slot = GREY_SLOT.captures(&s.key)?.get(1)?.as_str().parse().ok()?;
                Some((slot, s))
            })
            .collect()
    }

    /// Metric value boxes (`n1`..`n4`) with their slot number.
    pub fn metric_shapes(&self) -> Vec<(usize, &IndexedShape)> {
        self.shapes
            .iter()
            .filter_map(|s| {
                let slot = METRIC_NAME.captures(&s.name)?.get(1)?.as_str().parse().ok()?;
                Some((slot, s))
            })
            .collect()
    }

    /// Plain shapes that carry text.
    pub fn text_shapes(&self) -> impl Iterator<Item = &IndexedShape> {
        self.shapes
            .iter()
            .filter(|s| s.kind == ShapeType::Shape && s.has_text())
    }
}

fn picture_number(name: &str) -> u32 {
    FIRST_NUMBER
        .find(name)
        .and_then(|m| atoi_simd::parse::<u32, false, false>(m.as_str().as_bytes()).ok())
        .unwrap_or(UNNUMBERED)
}
