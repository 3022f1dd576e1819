//! reportgrid-parse: PDF parsing backend and content stream interpreter.
//!
//! This crate opens PDF documents (via lopdf), decodes fonts and text
//! encodings, and interprets page content streams into the characters and
//! ruling lines that reportgrid-core works on.

pub mod backend;
pub mod cmap;
pub mod encoding;
pub mod error;
pub mod fonts;
pub mod handler;
mod interpreter;
pub mod lopdf_backend;
pub mod page_objects;
pub mod text_state;

pub use backend::PdfBackend;
pub use error::BackendError;
pub use handler::{CharEvent, ContentHandler, PaintOp, PathEvent, Subpath};
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use page_objects::{PageCollector, PageContent, PageFrame};
pub use reportgrid_core;
