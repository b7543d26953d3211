// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagebind-document: Turn directories of scanned page images into PDFs.
//
// Provides per-image processing (crop, contrast, denoise, sharpen, pad,
// scale, progressive JPEG), the two-pass batch pipeline (canvas survey, then
// normalisation on a rayon worker pool), PDF assembly and inspection, and the
// directory walker that ties them together.

pub mod batch;
pub mod image;
pub mod pdf;
pub mod progress;
pub mod scan;
pub mod walker;

// Re-export the primary structs so callers can use `pagebind_document::BatchProcessor` etc.
pub use crate::batch::BatchProcessor;
pub use crate::image::processor::ImageProcessor;
pub use crate::pdf::assembler::DocumentAssembler;
pub use crate::pdf::reader::{PageImage, PdfReader};
pub use crate::progress::{BatchProgress, Pass, SilentProgress};
pub use crate::scan::normalize::ImageNormalizer;
pub use crate::scan::survey::SizeSurveyor;
pub use crate::walker::{DirectoryReport, DirectoryWalker};
