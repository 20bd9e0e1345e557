/// Shapes on a slide: the generic shape view, text frames and pictures.
pub mod base;
pub mod picture;
pub mod textframe;

pub use base::{Shape, ShapeGeometry, ShapeType};
pub use textframe::{RunFormat, TextFrame};
