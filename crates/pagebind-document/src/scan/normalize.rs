// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page normalisation: the fixed crop, enhance, pad, scale, encode sequence
// applied to every scanned page once the batch canvas is known.

use std::path::Path;

use image::DynamicImage;
use pagebind_core::error::Result;
use pagebind_core::{CanvasSize, ProcessingConfig};
use tracing::{debug, instrument, warn};

use crate::image::processor::ImageProcessor;

/// A page after normalisation, ready for PDF composition.
#[derive(Debug, Clone)]
pub struct NormalizedPage {
    /// Progressive JPEG bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// The post-crop image was much smaller than the canvas.
    pub anomalous: bool,
}

/// Applies the deterministic per-image transform.
///
/// The steps always run in this order, since the enhancement filters do not
/// commute:
///
/// 1. Trim `crop_ratio` from every edge
/// 2. Contrast boost, then median denoise, then unsharp mask
/// 3. Centre on a white canvas of the batch canvas size
/// 4. Scale by `resize_ratio` (Lanczos3)
/// 5. Encode as progressive JPEG
pub struct ImageNormalizer<'a> {
    config: &'a ProcessingConfig,
}

impl<'a> ImageNormalizer<'a> {
    pub fn new(config: &'a ProcessingConfig) -> Self {
        Self { config }
    }

    /// Step 1 alone. The size survey uses this to measure post-crop sizes.
    pub fn crop(&self, processor: ImageProcessor) -> ImageProcessor {
        processor.crop_border(self.config.crop_ratio)
    }

    /// Step 2: contrast, denoise, sharpen.
    pub fn enhance(&self, processor: ImageProcessor) -> ImageProcessor {
        processor
            .adjust_contrast(self.config.contrast_factor)
            .median_denoise(self.config.median_radius)
            .unsharp_mask(
                self.config.unsharp_radius,
                self.config.unsharp_amount,
                self.config.unsharp_threshold,
            )
    }

    /// Run the full transform on a decoded image.
    #[instrument(
        skip_all,
        fields(width = image.width(), height = image.height(), canvas = %canvas)
    )]
    pub fn normalize(&self, image: DynamicImage, canvas: CanvasSize) -> Result<NormalizedPage> {
        let cropped = self.crop(ImageProcessor::from_dynamic(image));
        let anomalous = is_anomalous(canvas, cropped.size(), self.config.anomaly_ratio);
        if anomalous {
            warn!(
                cropped = %cropped.size(),
                %canvas,
                "Image is much smaller than the batch canvas"
            );
        }

        let finished = self
            .enhance(cropped)
            .pad_to_canvas(canvas)?
            .scale(self.config.resize_ratio)?;

        let bytes = finished.to_progressive_jpeg_bytes(self.config.quality, self.config.dpi)?;
        debug!(
            width = finished.width(),
            height = finished.height(),
            bytes = bytes.len(),
            "Page normalised"
        );

        Ok(NormalizedPage {
            bytes,
            width: finished.width(),
            height: finished.height(),
            anomalous,
        })
    }

    /// Decode `path` and normalise it.
    pub fn normalize_file(&self, path: &Path, canvas: CanvasSize) -> Result<NormalizedPage> {
        let image = ImageProcessor::open(path)?.into_dynamic();
        self.normalize(image, canvas)
    }
}

/// Whether the canvas exceeds the post-crop image by more than `ratio` on
/// either axis.
pub fn is_anomalous(canvas: CanvasSize, image: CanvasSize, ratio: f64) -> bool {
    let exceeds = |canvas_dim: u32, image_dim: u32| {
        image_dim == 0 || canvas_dim as f64 / image_dim as f64 > ratio
    };
    exceeds(canvas.width, image.width) || exceeds(canvas.height, image.height)
}
