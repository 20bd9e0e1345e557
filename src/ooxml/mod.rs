//! Office Open XML support, limited to what editing a presentation needs.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): ZIP container, content types, parts and relationships
//! 2. **DOM** (`dom`): a mutable element tree for slide and presentation XML
//! 3. **PresentationML** (`pptx`): slides, shapes, text frames and media
pub mod dom;
pub mod error;
pub mod opc;
pub mod pptx;

pub use error::{OoxmlError, Result};
