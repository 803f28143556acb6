//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! The target width of each page is derived from its physical width
//! (PDF points, 1/72 inch) and the configured DPI, so `--dpi 300` really
//! does double the pixel density fed to OCR. `max_rendered_pixels` caps
//! both dimensions regardless of DPI: an A0 calibration sheet at 300 DPI
//! would otherwise produce a 9,900 × 14,000 px image and exhaust memory.

use crate::config::BatchConfig;
use crate::error::StageError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rasterise every page of a PDF into images, in page order.
///
/// Any failure — a corrupt file, a missing pdfium library, a page that will
/// not render — abandons the whole document: the caller records the returned
/// [`StageError::Load`] and moves on to the next document.
pub fn rasterize_document(
    pdf_path: &Path,
    document: &str,
    config: &BatchConfig,
) -> Result<Vec<DynamicImage>, StageError> {
    let load_error = |detail: String| StageError::Load {
        document: document.to_string(),
        detail,
    };

    let pdfium = Pdfium::default();

    let pdf = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| load_error(format!("{:?}", e)))?;

    let pages = pdf.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded for rasterisation: {} pages", total_pages);

    let max_pixels = config.max_rendered_pixels as i32;

    let mut images = Vec::with_capacity(total_pages);
    for (idx, page) in pages.iter().enumerate() {
        let width = target_width(page.width().value, config.dpi, config.max_rendered_pixels);
        let render_config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_maximum_height(max_pixels);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| load_error(format!("page {}: {:?}", idx + 1, e)))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}

/// Pixel width for a page `points` wide (1/72 inch) rendered at `dpi`,
/// capped at `max_pixels`.
fn target_width(points: f32, dpi: u32, max_pixels: u32) -> i32 {
    let px = (points * dpi as f32 / 72.0).round() as u32;
    px.clamp(1, max_pixels) as i32
}
