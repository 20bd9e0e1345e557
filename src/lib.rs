//! Casedeck - case-study presentations tailored to a prospect
//!
//! Given a company name and description, this library picks the most
//! relevant case studies from a JSON catalog with a chat-completion model,
//! turns them into placeholder values and lays them out in a PowerPoint
//! template.
//!
//! # Pipeline
//!
//! 1. **Store** ([`store`]): loads the case-study catalog
//! 2. **Selector** ([`selector`]): asks the model for the best-fitting records
//! 3. **Formatter** ([`placeholders`]): builds the token table, borrowing
//!    missing images, metrics and logos from similar records
//! 4. **Layout** ([`layout`]): substitutes tokens and rearranges shapes
//! 5. **Filter** ([`filter`]): keeps the slide for the requested deck size
//!
//! [`pipeline::Generator`] runs all of them.
//!
//! # Example
//!
//! ```no_run
//! use casedeck::config::AppConfig;
//! use casedeck::pipeline::{GenerationRequest, Generator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("casedeck.yaml".as_ref())?;
//! let generator = Generator::with_api_key(config, Some("sk-..."))?;
//!
//! let request = GenerationRequest::new("Acme Rail", "Regional rail operator modernizing its fleet", 2);
//! let deck = generator.generate(&request)?;
//! std::fs::write(&deck.filename, &deck.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `svg` (default): rasterize SVG logos with `resvg`

/// Chat-completion client and prompts
pub mod ai;

/// Errors, colors and unit conversions shared by every module
pub mod common;

/// Application configuration
pub mod config;

/// Slide selection by deck size
pub mod filter;

/// Template mutation
pub mod layout;

/// OOXML package, slide and shape editing
///
/// Only the parts of PresentationML that template editing touches are
/// modeled.
pub mod ooxml;

/// End-to-end generation
pub mod pipeline;

/// Placeholder tokens and the formatter that fills them
pub mod placeholders;

/// AI case-study selection
pub mod selector;

/// Case-study catalog
pub mod store;

pub use common::{Error, Result};
pub use config::AppConfig;
pub use pipeline::{GeneratedDeck, GenerationRequest, Generator};
pub use placeholders::{PlaceholderTable, PlaceholderValue};
pub use store::{CaseStudyRecord, CaseStudyStore};
