//! Lab-report PDF → base64 PNG page images, one string per page, for
//! the downstream vision extraction service.
//!
//! pdfium is a blocking C++ library, so rendering runs inside
//! `tokio::task::spawn_blocking`. The document handle is dropped when
//! the blocking closure returns, whether or not rendering succeeded.

use crate::utils::error::{MrlError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Fixed 2x scale, matching the resolution the extraction service was
/// tuned against.
const PAGE_SCALE: f32 = 2.0;

pub async fn pdf_to_base64_images(pdf_path: &Path) -> Result<Vec<String>> {
    let path: PathBuf = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || render_blocking(&path))
        .await
        .map_err(|e| MrlError::ProcessingError {
            message: format!("Render task panicked: {}", e),
        })?
}

fn render_blocking(pdf_path: &Path) -> Result<Vec<String>> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| MrlError::PdfError {
            message: format!("Failed to open {}: {:?}", pdf_path.display(), e),
        })?;

    let pages = document.pages();
    let page_count = pages.len();
    tracing::info!("Converting {} page(s) to base64 images", page_count);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(PAGE_SCALE);
    let mut images = Vec::with_capacity(page_count as usize);

    for (index, page) in pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| MrlError::PdfError {
                message: format!("Failed to render page {}: {:?}", index + 1, e),
            })?;

        images.push(encode_png_base64(&bitmap.as_image())?);
        tracing::debug!("Page {}/{} done", index + 1, page_count);
    }

    Ok(images)
}

/// PNG-encode a rendered page and wrap it in base64. PNG is lossless;
/// compression artefacts on rendered text hurt downstream extraction.
pub fn encode_png_base64(image: &DynamicImage) -> Result<String> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(STANDARD.encode(&buf))
}
