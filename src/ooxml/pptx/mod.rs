//! PowerPoint (.pptx) presentation editing.
//!
//! - [`Package`]: the .pptx package; slide order, media parts, slide removal
//! - [`SlideDocument`]: one slide's shape tree, editable in place
//! - [`shapes`]: shape geometry, text frames and pictures
//!
//! ```rust,no_run
//! use casedeck::ooxml::pptx::Package;
//!
//! let mut package = Package::open("templates/case_studies_template.pptx")?;
//! package.retain_slides(&[0])?;
//! std::fs::write("one_slide.pptx", package.to_bytes()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod format;
pub mod package;
pub mod presentation;
pub mod shapes;
pub mod slide;

pub use format::ImageFormat;
pub use package::Package;
pub use shapes::{Shape, ShapeGeometry, ShapeType};
pub use slide::{ShapeId, SlideDocument, ZOrder};
