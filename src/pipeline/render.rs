//! PDF rasterisation: render page one of a résumé via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and does CPU-heavy work. [`render_first_page`] moves the call onto
//! Tokio's blocking pool so the async workers never stall on it.
//!
//! ## Page size
//!
//! No scaling is applied: one pixel per PDF point, which is pdfium's default
//! 72-DPI transform. A US-letter page renders at 612 × 792 px. Only page
//! index 0 is ever loaded.

use crate::error::EvaluationError;
use crate::pipeline::input::ResumeDocument;
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Page one of a résumé as an RGB raster.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub image: RgbImage,
    /// Page width in PDF points (1/72 inch).
    pub page_width_points: f32,
    /// Page height in PDF points.
    pub page_height_points: f32,
}

impl RenderedPage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Something that can turn PDF bytes into a raster of their first page.
///
/// Implementations are called from a blocking thread.
pub trait FirstPageRenderer: Send + Sync {
    fn render_first_page(&self, pdf: &[u8]) -> Result<RenderedPage, EvaluationError>;
}

/// Production renderer backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    library_path: Option<PathBuf>,
}

impl PdfiumRenderer {
    /// Bind the system pdfium library on each render.
    pub fn system() -> Self {
        Self::default()
    }

    /// Bind the pdfium library at `path` (a file, or the directory holding it).
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    pub fn library_path(&self) -> Option<&Path> {
        self.library_path.as_deref()
    }
}

impl FirstPageRenderer for PdfiumRenderer {
    fn render_first_page(&self, pdf: &[u8]) -> Result<RenderedPage, EvaluationError> {
        let pdfium = bind_pdfium(self.library_path.as_deref())?;
        rasterize_first_page(&pdfium, pdf)
    }
}

/// Bind pdfium from an explicit path, or the system library when `None`.
pub fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, EvaluationError> {
    let bindings = match library_path {
        Some(dir) if dir.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        }
        Some(file) => Pdfium::bind_to_library(file),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| EvaluationError::RendererUnavailable {
        detail: format!("{e:?}"),
    })?;

    Ok(Pdfium::new(bindings))
}

/// Render page index 0 of `pdf` at its native size.
pub fn rasterize_first_page(pdfium: &Pdfium, pdf: &[u8]) -> Result<RenderedPage, EvaluationError> {
    let document = pdfium.load_pdf_from_byte_slice(pdf, None).map_err(|e| {
        EvaluationError::DocumentParseError {
            detail: format!("{e:?}"),
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(EvaluationError::DocumentParseError {
            detail: "document has no pages".to_string(),
        });
    }
    info!("PDF loaded: {} pages, rendering page 1", total_pages);

    let page = pages
        .get(0)
        .map_err(|e| EvaluationError::DocumentParseError {
            detail: format!("page 1 could not be loaded: {e:?}"),
        })?;

    let page_width_points = page.width().value;
    let page_height_points = page.height().value;
    let (width, height) = native_pixel_size(page_width_points, page_height_points);

    let render_config = PdfRenderConfig::new()
        .set_target_width(width as i32)
        .set_target_height(height as i32);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| EvaluationError::DocumentParseError {
            detail: format!("page 1 could not be rendered: {e:?}"),
        })?;

    // pdfium hands back BGRA; JPEG has no alpha channel.
    let image = bitmap.as_image().to_rgb8();
    debug!(
        "Rendered page 1 → {}x{} px ({}x{} pt)",
        image.width(),
        image.height(),
        page_width_points,
        page_height_points
    );

    Ok(RenderedPage {
        image,
        page_width_points,
        page_height_points,
    })
}

/// Pixel size of a page at pdfium's default transform (1 px per point).
pub fn native_pixel_size(width_points: f32, height_points: f32) -> (u32, u32) {
    let px = |pt: f32| (pt.round() as u32).max(1);
    (px(width_points), px(height_points))
}

/// Rasterise the résumé's first page on the blocking pool.
///
/// The document is consumed: nothing beyond the returned raster outlives
/// this call.
pub async fn render_first_page(
    renderer: Arc<dyn FirstPageRenderer>,
    resume: ResumeDocument,
) -> Result<RenderedPage, EvaluationError> {
    let bytes = resume.into_bytes();

    tokio::task::spawn_blocking(move || renderer.render_first_page(&bytes))
        .await
        .map_err(|e| EvaluationError::Internal(format!("Render task panicked: {}", e)))?
}
