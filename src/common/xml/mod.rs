//! XML text helpers shared by the package writer and the slide tree.

pub mod escape;

pub use escape::{escape_xml, resolve_entity};
