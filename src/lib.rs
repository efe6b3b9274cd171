//! Burn user-placed fields into existing PDF documents.
//!
//! Fields (signatures, images, text, dates, checkboxes and radio buttons) are positioned
//! as percentages of their page, so the same placement works for an on-screen preview
//! of any size and for the page itself. [sign_pdf] draws them onto a copy of the source
//! document; [SignService] wraps that with validation, storage and an audit trail.

mod audit;
pub use audit::*;

mod colour;
pub use colour::*;

mod config;
pub use config::*;

pub(crate) mod content;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod field;
pub use field::*;

mod fit;
pub use fit::*;

mod font;
pub use font::*;

mod geometry;
pub use geometry::*;

mod image;
pub use self::image::*;

mod output;
pub use output::*;

mod page;
pub use page::*;

/// Paper sizes
pub mod pagesize;

/// Placing fields in the on-screen preview
pub mod preview;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod service;
pub use service::*;

mod session;
pub use session::*;

mod store;
pub use store::*;

mod transform;
pub use transform::*;

mod units;
pub use units::*;

/// Re-export of the PDF object model used to read and modify documents
pub use lopdf;
/// Re-export of PDF-writer functionality, used for content stream generation
pub use pdf_writer;
