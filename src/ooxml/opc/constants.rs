/// Constant values related to the Open Packaging Convention.
///
/// Content type URIs, relationship types and target modes used when reading
/// and writing presentation packages.

/// Content type URIs (like MIME-types) that specify a part's format
pub mod content_type {
    // Image content types
    pub const BMP: &str = "image/bmp";
    pub const GIF: &str = "image/gif";
    pub const JPEG: &str = "image/jpeg";
    pub const PNG: &str = "image/png";
    pub const SVG: &str = "image/svg+xml";
    pub const TIFF: &str = "image/tiff";

    // Package content types
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

    // PresentationML content types
    pub const PML_PRESENTATION_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const PML_PRES_MACRO_MAIN: &str =
        "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
    pub const PML_TEMPLATE_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
    pub const PML_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

    // Generic XML
    pub const XML: &str = "application/xml";
}

/// Open XML relationship target modes
pub mod target_mode {
    /// Internal relationship target mode (default)
    pub const INTERNAL: &str = "Internal";

    /// External relationship target mode (e.g., hyperlinks to external URLs)
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs used in OPC packages
pub mod relationship_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
}

/// Media content types keyed by lowercase file extension.
pub static MEDIA_CONTENT_TYPES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "bmp" => content_type::BMP,
    "gif" => content_type::GIF,
    "jpeg" => content_type::JPEG,
    "jpg" => content_type::JPEG,
    "png" => content_type::PNG,
    "svg" => content_type::SVG,
    "tif" => content_type::TIFF,
    "tiff" => content_type::TIFF,
};

/// Look up the content type of a media file by its extension.
#[inline]
pub fn media_content_type(ext: &str) -> Option<&'static str> {
    MEDIA_CONTENT_TYPES
        .get(ext.to_ascii_lowercase().as_str())
        .copied()
}
