// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open and inspect generated PDF documents using the `lopdf`
// crate.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, Stream};
use pagebind_core::error::PagebindError;
use tracing::{debug, info, instrument};

/// Reads existing PDF files to verify what was written.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

/// The image XObject drawn on one page, with its samples decoded.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    /// Colour components per pixel: 1 for DeviceGray, 3 for DeviceRGB.
    pub components: usize,
    /// Row-major 8-bit samples.
    pub samples: Vec<u8>,
}

impl PageImage {
    /// Samples of the pixel at (`x`, `y`), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * self.components;
        self.samples.get(start..start + self.components)
    }
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PagebindError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PagebindError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PagebindError> {
        let document = Document::load_mem(data).map_err(|err| {
            PagebindError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height in points of every page, in page order.
    ///
    /// `None` for a page without a readable /MediaBox of its own.
    pub fn page_sizes(&self) -> Vec<Option<(f32, f32)>> {
        self.document
            .get_pages()
            .values()
            .map(|&page_id| {
                let page = self.document.get_dictionary(page_id).ok()?;
                let media_box = match page.get(b"MediaBox").ok()? {
                    Object::Reference(id) => self.document.get_object(*id).ok()?,
                    direct => direct,
                };
                let corners: Vec<f32> = media_box
                    .as_array()
                    .ok()?
                    .iter()
                    .map(number)
                    .collect::<Option<_>>()?;
                match corners.as_slice() {
                    [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
                    _ => None,
                }
            })
            .collect()
    }

    /// The first image drawn by each page's content stream, in page order.
    ///
    /// Only uncompressed or Flate/LZW-compressed samples can be decoded.
    pub fn page_images(&self) -> Result<Vec<PageImage>, PagebindError> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(page_number, page_id)| {
                let fail = |reason: String| {
                    PagebindError::PdfError(format!("page {page_number}: {reason}"))
                };

                let content = self
                    .document
                    .get_page_content(page_id)
                    .map_err(|err| fail(err.to_string()))?;
                let operations = Content::decode(&content)
                    .map_err(|err| fail(err.to_string()))?
                    .operations;
                let name = operations
                    .iter()
                    .find(|op| op.operator == "Do")
                    .and_then(|op| op.operands.first())
                    .and_then(|operand| operand.as_name().ok())
                    .ok_or_else(|| fail("no image drawn".into()))?;

                let page = self
                    .document
                    .get_dictionary(page_id)
                    .map_err(|err| fail(err.to_string()))?;
                let stream = self
                    .xobject(page, name)
                    .ok_or_else(|| fail("image XObject not found".into()))?;
                decode_image(stream).map_err(fail)
            })
            .collect()
    }

    /// Resolve `name` in a page's /Resources /XObject dictionary.
    fn xobject<'a>(&'a self, page: &'a Dictionary, name: &[u8]) -> Option<&'a Stream> {
        let resources = self.resolve(page.get(b"Resources").ok()?)?.as_dict().ok()?;
        let xobjects = self.resolve(resources.get(b"XObject").ok()?)?.as_dict().ok()?;
        self.resolve(xobjects.get(name).ok()?)?.as_stream().ok()
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        self.document.dereference(object).ok().map(|(_, object)| object)
    }
}

fn decode_image(stream: &Stream) -> Result<PageImage, String> {
    let (width, height) = (dimension(stream, b"Width")?, dimension(stream, b"Height")?);

    let components = match stream.dict.get(b"ColorSpace").and_then(Object::as_name) {
        Ok(b"DeviceRGB") => 3,
        Ok(b"DeviceGray") => 1,
        _ => return Err("unsupported colour space".into()),
    };

    let samples = if stream.dict.has(b"Filter") {
        stream.decompressed_content().map_err(|err| err.to_string())?
    } else {
        stream.content.clone()
    };
    let expected = width as usize * height as usize * components;
    if samples.len() < expected {
        return Err(format!(
            "{} bytes of samples for a {width}x{height} image",
            samples.len()
        ));
    }

    Ok(PageImage {
        width,
        height,
        components,
        samples,
    })
}

fn dimension(stream: &Stream, key: &[u8]) -> Result<u32, String> {
    stream
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| format!("missing /{}", String::from_utf8_lossy(key)))
}

/// Numeric value of a PDF integer or real.
fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}
