use thiserror::Error;

/// Errors that abort a whole render. Either the source could not be read, or the result
/// could not be written; nothing partial is ever returned.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("source is not a readable PDF document: {0}")]
    /// [lopdf] could not parse the source bytes, or the parsed document is malformed
    Load(#[source] lopdf::Error),

    #[error("source PDF is encrypted")]
    /// The source is encrypted and can't be modified
    Encrypted,

    #[error("failed to serialize the signed document: {0}")]
    /// Writing the mutated document out to bytes failed
    Serialization(String),
}

impl RenderError {
    /// Whether this is one of the "source could not be loaded" errors
    pub fn is_load_error(&self) -> bool {
        matches!(self, RenderError::Load(_) | RenderError::Encrypted)
    }
}

/// Problems with an individual field. These never abort a render: the field is skipped,
/// the problem is logged and recorded in the [RenderReport](crate::RenderReport), and
/// every other field is still drawn.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("cannot fit a {image_width}x{image_height} image into a {box_width}x{box_height} box")]
    InvalidGeometry {
        box_width: f64,
        box_height: f64,
        image_width: f64,
        image_height: f64,
    },

    #[error("unsupported image format `{0}`, only PNG and JPEG can be embedded")]
    UnsupportedImageFormat(String),

    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("page {page} is out of range, the document has {page_count} pages")]
    PageOutOfRange { page: u32, page_count: usize },
}
