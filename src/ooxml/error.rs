//! Errors raised while editing slides and the presentation part.
use thiserror::Error;

use crate::ooxml::opc::error::OpcError;

pub type Result<T> = std::result::Result<T, OoxmlError>;

#[derive(Error, Debug)]
pub enum OoxmlError {
    #[error("OPC error: {0}")]
    Opc(#[from] OpcError),

    /// Slide or presentation XML could not be parsed or is structurally broken
    #[error("XML error: {0}")]
    Xml(String),

    /// A slide listed in the presentation is missing from the package
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// The main part is not a presentation
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// A slide id points at a relationship that is not a slide
    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    /// A part name derived for new media or a slide is not a valid URI
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OoxmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for OoxmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        OoxmlError::Xml(format!("invalid UTF-8: {err}"))
    }
}
