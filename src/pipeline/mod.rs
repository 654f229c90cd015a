//! Pipeline stages for one résumé evaluation.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the rendering backend or model client can be swapped without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ dispatch
//! (bytes)   (pdfium)   (JPEG/b64)  (model)
//! ```
//!
//! 1. [`input`]   : validate the upload as a PDF and own its bytes
//! 2. [`render`]  : rasterise page one; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]  : JPEG-encode and base64-wrap the raster
//! 4. [`dispatch`]: the one network call, to the configured model

pub mod dispatch;
pub mod encode;
pub mod input;
pub mod render;
