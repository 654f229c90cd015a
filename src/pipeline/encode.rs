//! Image encoding: [`RenderedPage`] → JPEG → base64 [`EncodedImagePart`].
//!
//! Vision APIs take images inline as base64 in the JSON request body. The
//! page is JPEG-encoded at the encoder's default quality (75).

use crate::error::EvaluationError;
use crate::pipeline::render::RenderedPage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// MIME type of every encoded résumé page.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// One image content part, ready for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImagePart {
    pub mime_type: String,
    /// Standard-alphabet, padded base64 of the JPEG bytes.
    pub data: String,
}

impl EncodedImagePart {
    /// Wrap JPEG bytes for transport.
    pub fn from_jpeg(jpeg: &[u8]) -> Self {
        Self {
            mime_type: JPEG_MIME_TYPE.to_string(),
            data: STANDARD.encode(jpeg),
        }
    }

    /// Decode the base64 payload back into JPEG bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }

    /// Convert to the image type used by edgequake-llm providers.
    pub fn to_image_data(&self) -> ImageData {
        ImageData::new(self.data.clone(), self.mime_type.as_str())
    }
}

/// Encode a rendered page as base64 JPEG.
pub fn encode_page(page: &RenderedPage) -> Result<EncodedImagePart, EvaluationError> {
    let jpeg = encode_jpeg(page)?;
    let part = EncodedImagePart::from_jpeg(&jpeg);
    debug!(
        "Encoded {}x{} page → {} JPEG bytes, {} bytes base64",
        page.width(),
        page.height(),
        jpeg.len(),
        part.data.len()
    );
    Ok(part)
}

/// JPEG-encode the page raster with default settings.
pub fn encode_jpeg(page: &RenderedPage) -> Result<Vec<u8>, EvaluationError> {
    let mut buf = Vec::new();
    JpegEncoder::new(&mut buf)
        .encode_image(&page.image)
        .map_err(|e| EvaluationError::ImageEncodeError {
            detail: e.to_string(),
        })?;
    Ok(buf)
}
