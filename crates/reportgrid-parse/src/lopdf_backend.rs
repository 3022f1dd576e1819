//! lopdf-based PDF parsing backend.
//!
//! Implements [`PdfBackend`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate for PDF document parsing.

use lopdf::{Dictionary, Object, ObjectId};
use reportgrid_core::ExtractOptions;

use crate::backend::PdfBackend;
use crate::error::BackendError;
use crate::fonts::{number, resolve};
use crate::handler::ContentHandler;
use crate::interpreter::{interpret_content_stream, stream_bytes};
use crate::page_objects::PageFrame;

/// US Letter, used when no media box is found on the page or its ancestors.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,
}

impl LopdfDocument {
    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(BackendError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            })
    }

    fn page_dict(&self, index: usize) -> Result<&Dictionary, BackendError> {
        self.inner
            .get_object(self.page_id(index)?)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// The lopdf-based PDF backend.
pub struct LopdfBackend;

/// Look up a key on the page dictionary, walking up the page tree via
/// `/Parent` when the page does not carry it.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    // Bounded walk: a malformed tree may contain a /Parent cycle.
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page tree node: {e}")))?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(resolve(doc, value)));
        }
        match dict.get(b"Parent") {
            Ok(parent) => {
                current_id = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

fn media_box(doc: &LopdfDocument, index: usize) -> Result<[f64; 4], BackendError> {
    let Some(obj) = resolve_inherited(&doc.inner, doc.page_id(index)?, b"MediaBox")? else {
        return Ok(DEFAULT_MEDIA_BOX);
    };
    let array = obj
        .as_array()
        .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
    let values: Vec<f64> = array
        .iter()
        .filter_map(|o| number(resolve(&doc.inner, o)))
        .collect();
    match values[..] {
        [x0, y0, x1, y1] => Ok([x0, y0, x1, y1]),
        _ => Err(BackendError::Parse(format!(
            "expected 4-element MediaBox, got {}",
            array.len()
        ))),
    }
}

/// Concatenated content stream bytes of a page (empty for a page without
/// `/Contents`).
fn page_content_bytes(doc: &lopdf::Document, page: &Dictionary) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };
    match resolve(doc, contents) {
        Object::Stream(stream) => stream_bytes(stream),
        Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                let stream = resolve(doc, part).as_stream().map_err(|e| {
                    BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                })?;
                if !content.is_empty() {
                    content.push(b' ');
                }
                content.extend_from_slice(&stream_bytes(stream)?);
            }
            Ok(content)
        }
        _ => Err(BackendError::Parse(
            "/Contents is not a stream or array".to_string(),
        )),
    }
}

fn page_resources(doc: &LopdfDocument, index: usize) -> Result<&Dictionary, BackendError> {
    static EMPTY: std::sync::LazyLock<Dictionary> = std::sync::LazyLock::new(Dictionary::new);
    match resolve_inherited(&doc.inner, doc.page_id(index)?, b"Resources")? {
        Some(obj) => obj
            .as_dict()
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
        None => Ok(&EMPTY),
    }
}

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Error = BackendError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let mut inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        // Owner-password-only files open with the empty user password.
        if inner.is_encrypted() {
            inner.decrypt("").map_err(|e| {
                tracing::debug!("empty user password rejected: {e}");
                BackendError::Encrypted
            })?;
        }
        // get_pages is keyed by 1-based page number.
        let page_ids = inner.get_pages().into_values().collect();
        Ok(LopdfDocument { inner, page_ids })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn page_frame(doc: &Self::Document, index: usize) -> Result<PageFrame, Self::Error> {
        let [x0, y0, x1, y1] = media_box(doc, index)?;
        Ok(PageFrame::from_media_box(x0, y0, x1, y1))
    }

    fn interpret_page(
        doc: &Self::Document,
        index: usize,
        handler: &mut dyn ContentHandler,
        options: &ExtractOptions,
    ) -> Result<(), Self::Error> {
        let content = page_content_bytes(&doc.inner, doc.page_dict(index)?)?;
        if content.is_empty() {
            return Ok(());
        }
        let resources = page_resources(doc, index)?;
        tracing::trace!(page = index, bytes = content.len(), "interpreting page");
        interpret_content_stream(&doc.inner, &content, resources, handler, options)
    }
}
