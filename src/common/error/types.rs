//! Crate-wide error type.
//!
//! Fatal conditions of a generation request surface through this type. Shape-level
//! layout problems never reach it: the layout engine logs and skips them.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for casedeck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No API key was supplied for the completion service
    #[error("OpenAI API key not found. Set OPENAI_API_KEY or pass --api-key")]
    MissingCredential,

    /// A required input file does not exist
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The generation request failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The completion service answered with something we cannot use
    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    /// Transport or API failure talking to the completion service
    #[error("AI service error: {0}")]
    Ai(String),

    /// The case-study catalog could not be read
    #[error("Data error: {0}")]
    Data(String),

    /// The configuration file could not be read
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image decoding, cropping or rasterization failed
    #[error("Image error: {0}")]
    Image(String),

    /// A layout operation could not be applied
    #[error("Layout error: {0}")]
    Layout(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// Package part not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Invalid package structure
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for casedeck operations.
pub type Result<T> = std::result::Result<T, Error>;
