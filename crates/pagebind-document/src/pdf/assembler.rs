// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler: compose ordered page buffers into one multi-page PDF
// using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::io::Write;
use std::path::Path;

use pagebind_core::PageBuffer;
use pagebind_core::error::{PagebindError, Result};
use printpdf::{
    ImageCompression, ImageOptimizationOptions, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Pt, RawImage, RawImageData, RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;

/// Composes finished pages into a PDF, one image per page.
///
/// Each page is sized so the image fills it exactly at the configured DPI,
/// and page order is the order of the input slice.
pub struct DocumentAssembler {
    /// Resolution used to convert pixels to physical page size.
    dpi: u16,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl DocumentAssembler {
    pub fn new(dpi: u16) -> Self {
        Self {
            dpi: dpi.max(1),
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Physical page size for an image of `width` x `height` pixels.
    fn page_dimensions(&self, width: u32, height: u32) -> (Mm, Mm) {
        let to_mm = |px: u32| Mm(px as f32 / self.dpi as f32 * 25.4);
        (to_mm(width), to_mm(height))
    }

    /// Build the PDF in memory. Returns `None` for an empty page list.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn compose(&self, pages: &[PageBuffer]) -> Result<Option<Vec<u8>>> {
        if pages.is_empty() {
            return Ok(None);
        }

        let title = self.title.as_deref().unwrap_or("pagebind document");
        let mut doc = PdfDocument::new(title);
        let mut pdf_pages = Vec::with_capacity(pages.len());

        for page in pages {
            let decoded = ImageProcessor::from_bytes(&page.bytes)
                .map_err(|err| {
                    PagebindError::ImageError(format!(
                        "page from {} is unreadable: {}",
                        page.source.display(),
                        err
                    ))
                })?
                .into_dynamic();

            let (width, height) = (decoded.width(), decoded.height());
            let raw = RawImage {
                pixels: RawImageData::U8(decoded.to_rgb8().into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let (page_w, page_h) = self.page_dimensions(width, height);
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: Some(1.0),
                    scale_y: Some(1.0),
                    dpi: Some(self.dpi as f32),
                    rotate: None,
                },
            }];
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
            debug!(source = %page.source.display(), width, height, "Page placed");
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&save_options(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "PDF serialisation produced warnings");
        }
        Ok(Some(output))
    }

    /// Compose `pages` and write the document to `output`, returning the
    /// page count.
    ///
    /// An empty page list writes nothing and returns 0. The file is written
    /// to a temporary sibling and renamed into place, so `output` either
    /// holds the complete document or is left untouched.
    #[instrument(skip(self, pages), fields(pages = pages.len(), output = %output.display()))]
    pub fn assemble(&self, pages: &[PageBuffer], output: &Path) -> Result<usize> {
        let composition_error = |reason: String| PagebindError::Composition {
            path: output.display().to_string(),
            reason,
        };

        let Some(bytes) = self.compose(pages).map_err(|err| composition_error(err.to_string()))?
        else {
            warn!("No pages to write; skipping document");
            return Ok(0);
        };

        let parent = output
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut staged = tempfile::Builder::new()
            .prefix(".pagebind-")
            .suffix(".pdf.part")
            .tempfile_in(parent)
            .map_err(|err| composition_error(err.to_string()))?;
        staged
            .write_all(&bytes)
            .map_err(|err| composition_error(err.to_string()))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|err| composition_error(err.to_string()))?;
        staged
            .persist(output)
            .map_err(|err| composition_error(err.error.to_string()))?;

        info!(pages = pages.len(), bytes = bytes.len(), "PDF written");
        Ok(pages.len())
    }
}

/// Lossless image streams at full resolution.
///
/// printpdf's default optimisation downsamples any image over 2 MB and may
/// re-encode or convert it to greyscale; pages are already final.
fn save_options() -> PdfSaveOptions {
    PdfSaveOptions {
        image_optimization: Some(ImageOptimizationOptions {
            max_image_size: None,
            auto_optimize: Some(false),
            convert_to_greyscale: Some(false),
            dither_greyscale: Some(false),
            format: Some(ImageCompression::Flate),
            ..Default::default()
        }),
        ..Default::default()
    }
}
