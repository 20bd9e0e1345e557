//! Failures while reading or writing the ZIP container of a presentation.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// The template file is missing or unreadable
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    /// A relationship or slide list names a part the archive does not contain
    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// `[Content_Types].xml` has neither an override nor a default for the part
    #[error("No content type for part: {0}")]
    ContentTypeNotFound(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    /// Content types, relationships or an XML part could not be parsed
    #[error("Malformed package XML: {0}")]
    XmlError(String),

    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<quick_xml::Error> for OpcError {
    fn from(err: quick_xml::Error) -> Self {
        OpcError::XmlError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::XmlError(format!("bad attribute: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
