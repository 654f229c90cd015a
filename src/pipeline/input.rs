//! Input resolution: turn an uploaded file or a path into a [`ResumeDocument`].
//!
//! pdfium produces unhelpful errors for non-PDF input, so the header is
//! checked up front. The PDF specification lets a reader accept up to 1024
//! bytes of junk before `%PDF-`, which is what pdfium itself tolerates.

use crate::error::EvaluationError;
use std::fmt;
use std::path::Path;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Raw bytes of an uploaded résumé, owned for the duration of one request.
#[derive(Clone)]
pub struct ResumeDocument {
    bytes: Vec<u8>,
}

impl ResumeDocument {
    /// Wrap uploaded bytes, rejecting anything without a PDF header.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, EvaluationError> {
        let bytes = bytes.into();
        if !has_pdf_header(&bytes) {
            let shown = &bytes[..bytes.len().min(4)];
            return Err(EvaluationError::DocumentParseError {
                detail: format!("not a PDF file (first bytes: {shown:?})"),
            });
        }
        debug!("Résumé accepted: {} bytes", bytes.len());
        Ok(Self { bytes })
    }

    /// Read a résumé from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, EvaluationError> {
        let path = path.as_ref();
        let bytes =
            tokio::fs::read(path)
                .await
                .map_err(|source| EvaluationError::ResumeReadFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::from_bytes(bytes)
    }

    /// The raw PDF bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Give up ownership of the bytes (the rasterizer consumes them).
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ResumeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeDocument")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// `true` if `%PDF-` occurs within the first 1024 bytes.
pub fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|candidate| candidate == PDF_MAGIC)
}
