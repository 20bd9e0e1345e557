//! Unified error types for casedeck.
//!
//! Package-layer errors (`OpcError`, `OoxmlError`) and third-party failures are
//! converted into one crate-wide [`Error`].

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
