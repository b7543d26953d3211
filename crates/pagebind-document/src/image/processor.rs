// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: border crop, contrast, denoise, sharpen, canvas padding,
// scaling, and progressive JPEG output. Operates on in-memory images using the
// `image` and `imageproc` crates.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::filter::{gaussian_blur_f32, median_filter};
use jpeg_encoder::{ColorType, Density, Encoder};
use pagebind_core::CanvasSize;
use pagebind_core::error::PagebindError;
use tracing::{debug, instrument};

/// Paper white, used for the padding around each page.
const CANVAS_FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// Image processing pipeline operating on a single in-memory image.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::open("scan_001.tif")?
///     .crop_border(0.015)
///     .adjust_contrast(1.1)
///     .median_denoise(1)
///     .unsharp_mask(2.0, 150, 3)
///     .pad_to_canvas(canvas)?
///     .scale(0.5)?
///     .to_progressive_jpeg_bytes(85, 300)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, PagebindError> {
        let img = image::open(path.as_ref()).map_err(|err| PagebindError::Decode {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Image loaded"
        );
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PagebindError> {
        let img = image::load_from_memory(data).map_err(|err| {
            PagebindError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Current dimensions as a canvas-compatible size.
    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.image.width(), self.image.height())
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Trim `ratio * dimension` pixels from every edge, keeping the central
    /// `1 - 2 * ratio` of the width and height.
    ///
    /// The per-axis border is `floor(dimension * ratio)`. Ratios outside
    /// `[0, 0.5)` are clamped so at least one pixel always survives.
    pub fn crop_border(self, ratio: f64) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        let (border_x, keep_w) = border_and_keep(width, ratio);
        let (border_y, keep_h) = border_and_keep(height, ratio);

        debug!(width, height, border_x, border_y, keep_w, keep_h, "Cropping border");

        Self {
            image: self.image.crop_imm(border_x, border_y, keep_w, keep_h),
        }
    }

    /// Adjust contrast by a factor around the image's mean grey level.
    ///
    /// Each channel becomes `mean + factor * (value - mean)`, where `mean` is
    /// the rounded average luma of the whole image. Values > 1.0 increase
    /// contrast; 1.0 is a no-op. The output is RGB.
    #[instrument(skip(self))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        let rgb = self.image.to_rgb8();
        let mean = mean_luma(&rgb);
        debug!(mean, "Adjusting contrast");

        let mut contrasted = rgb;
        for pixel in contrasted.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                let val = mean + factor * (*channel as f32 - mean);
                *channel = val.round().clamp(0.0, 255.0) as u8;
            }
        }

        Self {
            image: DynamicImage::ImageRgb8(contrasted),
        }
    }

    /// Replace each pixel with the per-channel median of its neighbourhood.
    /// A radius of 1 is a 3x3 window.
    #[instrument(skip(self))]
    pub fn median_denoise(self, radius: u32) -> Self {
        if radius == 0 {
            return self;
        }
        let rgb = self.image.to_rgb8();
        Self {
            image: DynamicImage::ImageRgb8(median_filter(&rgb, radius, radius)),
        }
    }

    /// Sharpen with an unsharp mask.
    ///
    /// The image is blurred with a gaussian of sigma `radius`. Wherever a
    /// channel differs from its blurred value by at least `threshold`, the
    /// difference is scaled by `amount_percent / 100` and added back.
    #[instrument(skip(self))]
    pub fn unsharp_mask(self, radius: f32, amount_percent: u32, threshold: u8) -> Self {
        let rgb = self.image.to_rgb8();
        if radius <= 0.0 || amount_percent == 0 {
            return Self {
                image: DynamicImage::ImageRgb8(rgb),
            };
        }

        let blurred = gaussian_blur_f32(&rgb, radius);
        let amount = amount_percent as f32 / 100.0;

        let mut sharpened = rgb;
        for (pixel, soft) in sharpened.pixels_mut().zip(blurred.pixels()) {
            for (channel, &blur) in pixel.0.iter_mut().zip(soft.0.iter()) {
                let diff = *channel as i32 - blur as i32;
                if diff.unsigned_abs() < threshold as u32 {
                    continue;
                }
                let val = *channel as f32 + diff as f32 * amount;
                *channel = val.round().clamp(0.0, 255.0) as u8;
            }
        }

        Self {
            image: DynamicImage::ImageRgb8(sharpened),
        }
    }

    /// Centre the image on a white RGB canvas of exactly `canvas` size.
    ///
    /// Offsets use floor division: `left = (canvas.width - width) / 2`, and the
    /// same for `top`. Fails if the image is larger than the canvas on either
    /// axis.
    pub fn pad_to_canvas(self, canvas: CanvasSize) -> Result<Self, PagebindError> {
        let size = self.size();
        if !size.fits_within(&canvas) {
            return Err(PagebindError::ImageError(format!(
                "image {size} does not fit canvas {canvas}"
            )));
        }

        let left = (canvas.width - size.width) / 2;
        let top = (canvas.height - size.height) / 2;
        debug!(left, top, %canvas, "Padding to canvas");

        let mut padded = RgbImage::from_pixel(canvas.width, canvas.height, CANVAS_FILL);
        imageops::replace(&mut padded, &self.image.to_rgb8(), left as i64, top as i64);

        Ok(Self {
            image: DynamicImage::ImageRgb8(padded),
        })
    }

    /// Scale both axes by `ratio` with Lanczos3 resampling.
    ///
    /// Target dimensions are `floor(dimension * ratio)`, never less than 1.
    /// Fails before allocating anything when the target cannot be encoded
    /// as JPEG.
    #[instrument(skip(self))]
    pub fn scale(self, ratio: f64) -> Result<Self, PagebindError> {
        let (width, height) = scaled_dimensions(self.image.width(), self.image.height(), ratio);
        jpeg_dimensions(width, height)?;
        if width == self.image.width() && height == self.image.height() {
            return Ok(self);
        }
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Scaling image"
        );
        let resized = imageops::resize(&self.image.to_rgb8(), width, height, FilterType::Lanczos3);
        Ok(Self {
            image: DynamicImage::ImageRgb8(resized),
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as a progressive RGB JPEG at `quality`
    /// (1-100), recording `dpi` as the JFIF pixel density.
    pub fn to_progressive_jpeg_bytes(
        &self,
        quality: u8,
        dpi: u16,
    ) -> Result<Vec<u8>, PagebindError> {
        let (jpeg_w, jpeg_h) = jpeg_dimensions(self.image.width(), self.image.height())?;

        let rgb = self.image.to_rgb8();
        let mut buffer = Vec::new();
        let mut encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
        encoder.set_progressive(true);
        encoder.set_density(Density::Inch { x: dpi, y: dpi });
        encoder
            .encode(rgb.as_raw(), jpeg_w, jpeg_h, ColorType::Rgb)
            .map_err(|err| PagebindError::Encode(err.to_string()))?;
        Ok(buffer)
    }
}

/// Border width and retained length for one axis of a border crop.
fn border_and_keep(dimension: u32, ratio: f64) -> (u32, u32) {
    let ratio = ratio.clamp(0.0, 0.5);
    let border = (dimension as f64 * ratio).floor() as u32;
    let keep = dimension.saturating_sub(border * 2);
    if keep == 0 {
        // Degenerate tiny image: keep the centre pixel.
        return (dimension / 2, dimension.min(1));
    }
    (border, keep)
}

/// `width` and `height` as JPEG frame dimensions, which are limited to
/// `u16::MAX` pixels per side.
fn jpeg_dimensions(width: u32, height: u32) -> Result<(u16, u16), PagebindError> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(PagebindError::Encode(format!(
            "{width}x{height} exceeds the JPEG limit of {} pixels per side",
            u16::MAX
        ))),
    }
}

/// Post-crop size of a `width` x `height` image at `ratio`.
pub fn cropped_size(width: u32, height: u32, ratio: f64) -> CanvasSize {
    CanvasSize::new(border_and_keep(width, ratio).1, border_and_keep(height, ratio).1)
}

/// Final dimensions after scaling by `ratio`, truncated and clamped to >= 1.
pub fn scaled_dimensions(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    let scale = |dim: u32| ((dim as f64 * ratio).floor() as u32).max(1);
    (scale(width), scale(height))
}

/// Rounded mean ITU-R 601 luma across the whole image.
fn mean_luma(rgb: &RgbImage) -> f32 {
    let count = rgb.width() as u64 * rgb.height() as u64;
    if count == 0 {
        return 128.0;
    }
    let total: u64 = rgb
        .pixels()
        .map(|Rgb([r, g, b])| (*r as u64 * 299 + *g as u64 * 587 + *b as u64 * 114) / 1000)
        .sum();
    (total as f64 / count as f64).round() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> ImageProcessor {
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb(color),
        )))
    }

    #[test]
    fn crop_keeps_central_fraction() {
        let cropped = solid(1000, 1400, [200, 200, 200]).crop_border(0.015);
        assert_eq!((cropped.width(), cropped.height()), (970, 1358));

        let cropped = solid(1020, 1410, [200, 200, 200]).crop_border(0.015);
        assert_eq!((cropped.width(), cropped.height()), (990, 1368));
    }

    #[test]
    fn crop_removes_edge_pixels() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for x in 0..100 {
            img.put_pixel(x, 0, Rgb([0, 0, 0]));
        }
        let cropped = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .crop_border(0.015)
            .into_dynamic()
            .to_rgb8();
        assert_eq!(cropped.dimensions(), (98, 98));
        assert!(cropped.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn zero_crop_is_identity_size() {
        let cropped = solid(37, 53, [10, 20, 30]).crop_border(0.0);
        assert_eq!((cropped.width(), cropped.height()), (37, 53));
    }

    #[test]
    fn contrast_spreads_values_around_mean() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        img.put_pixel(1, 0, Rgb([200, 200, 200]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .adjust_contrast(1.1)
            .into_dynamic()
            .to_rgb8();
        // Mean luma is 150: 150 + 1.1 * (100 - 150) = 95, 150 + 1.1 * 50 = 205.
        assert_eq!(out.get_pixel(0, 0).0, [95, 95, 95]);
        assert_eq!(out.get_pixel(1, 0).0, [205, 205, 205]);
    }

    #[test]
    fn median_removes_isolated_speck() {
        let mut img = RgbImage::from_pixel(5, 5, Rgb([240, 240, 240]));
        img.put_pixel(2, 2, Rgb([0, 0, 0]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .median_denoise(1)
            .into_dynamic()
            .to_rgb8();
        assert_eq!(out.get_pixel(2, 2).0, [240, 240, 240]);
    }

    #[test]
    fn unsharp_leaves_flat_regions_alone() {
        let out = solid(20, 20, [120, 130, 140])
            .unsharp_mask(2.0, 150, 3)
            .into_dynamic()
            .to_rgb8();
        assert!(out.pixels().all(|p| p.0 == [120, 130, 140]));
    }

    #[test]
    fn unsharp_increases_edge_contrast() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([200, 200, 200]));
        for y in 0..20 {
            for x in 10..20 {
                img.put_pixel(x, y, Rgb([50, 50, 50]));
            }
        }
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .unsharp_mask(2.0, 150, 3)
            .into_dynamic()
            .to_rgb8();
        assert!(out.get_pixel(9, 10).0[0] > 200);
        assert!(out.get_pixel(10, 10).0[0] < 50);
    }

    #[test]
    fn pad_centres_with_floor_offsets() {
        let padded = solid(3, 2, [0, 0, 0])
            .pad_to_canvas(CanvasSize::new(6, 5))
            .expect("image fits")
            .into_dynamic()
            .to_rgb8();
        assert_eq!(padded.dimensions(), (6, 5));
        // left = 3 / 2 = 1, top = 3 / 2 = 1
        assert_eq!(padded.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(padded.get_pixel(1, 1).0, [0, 0, 0]);
        assert_eq!(padded.get_pixel(3, 2).0, [0, 0, 0]);
        assert_eq!(padded.get_pixel(4, 1).0, [255, 255, 255]);
        assert_eq!(padded.get_pixel(1, 3).0, [255, 255, 255]);
    }

    #[test]
    fn pad_rejects_oversized_image() {
        let result = solid(10, 10, [0, 0, 0]).pad_to_canvas(CanvasSize::new(9, 20));
        assert!(matches!(result, Err(PagebindError::ImageError(_))));
    }

    #[test]
    fn scale_truncates_dimensions() {
        let scaled = solid(1015, 1401, [255, 255, 255]).scale(0.5).expect("scale");
        assert_eq!((scaled.width(), scaled.height()), (507, 700));
        assert_eq!(scaled_dimensions(1, 1, 0.1), (1, 1));
    }

    #[test]
    fn oversized_scale_fails_before_resizing() {
        // 1000 * 50 fits in a JPEG frame, 1400 * 50 does not.
        let result = solid(1000, 1400, [255, 255, 255]).scale(50.0);
        assert!(matches!(result, Err(PagebindError::Encode(_))));
        assert!(jpeg_dimensions(65_535, 65_535).is_ok());
        assert!(jpeg_dimensions(65_536, 1).is_err());
    }

    #[test]
    fn progressive_jpeg_decodes_to_same_dimensions() {
        let bytes = solid(123, 77, [30, 60, 90])
            .to_progressive_jpeg_bytes(85, 300)
            .expect("encode");
        let decoded = ImageProcessor::from_bytes(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (123, 77));
    }
}
