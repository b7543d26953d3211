// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canvas size survey: the first pass over a batch. Every image is decoded
// and cropped so the batch canvas can be taken as the pointwise maximum of
// the post-crop sizes.

use std::path::{Path, PathBuf};

use pagebind_core::error::Result;
use pagebind_core::{CanvasSize, ProcessingConfig};
use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::progress::{BatchProgress, Pass};
use crate::scan::normalize::ImageNormalizer;

/// Result of surveying a batch.
#[derive(Debug)]
pub struct SurveyReport {
    /// Pointwise maximum of every successful post-crop size. `None` when no
    /// image could be decoded.
    pub canvas: Option<CanvasSize>,
    /// Post-crop size (or the failure) for each input, in input order.
    pub sizes: Vec<Result<CanvasSize>>,
}

/// Runs pass 1 over a list of files on a worker pool.
pub struct SizeSurveyor<'a> {
    config: &'a ProcessingConfig,
    pool: &'a ThreadPool,
}

impl<'a> SizeSurveyor<'a> {
    pub fn new(config: &'a ProcessingConfig, pool: &'a ThreadPool) -> Self {
        Self { config, pool }
    }

    /// Decode and crop every file, then reduce to the batch canvas.
    ///
    /// The reduction only happens after every worker has returned.
    #[instrument(skip_all, fields(files = paths.len()))]
    pub fn survey(&self, paths: &[PathBuf], progress: &dyn BatchProgress) -> SurveyReport {
        progress.on_pass_start(Pass::Survey, paths.len());

        let mut indexed: Vec<(usize, Result<CanvasSize>)> = self.pool.install(|| {
            paths
                .par_iter()
                .enumerate()
                .map(|(index, path)| {
                    let size = self.survey_file(path);
                    progress.on_file_done(Pass::Survey, path, size.is_ok());
                    (index, size)
                })
                .collect()
        });
        indexed.sort_by_key(|(index, _)| *index);
        progress.on_pass_complete(Pass::Survey);

        let sizes: Vec<Result<CanvasSize>> = indexed.into_iter().map(|(_, size)| size).collect();
        let canvas = reduce_canvas(sizes.iter().filter_map(|size| size.as_ref().ok().copied()));

        match canvas {
            Some(canvas) => info!(%canvas, "Canvas size determined"),
            None => warn!("No decodable images; canvas undetermined"),
        }

        SurveyReport { canvas, sizes }
    }

    /// Post-crop size of a single file.
    pub fn survey_file(&self, path: &Path) -> Result<CanvasSize> {
        let processor = ImageProcessor::open(path)?;
        let cropped = ImageNormalizer::new(self.config).crop(processor);
        let size = cropped.size();
        debug!(path = %path.display(), %size, "Surveyed");
        Ok(size)
    }
}

/// Pointwise maximum of a set of sizes.
pub fn reduce_canvas(sizes: impl IntoIterator<Item = CanvasSize>) -> Option<CanvasSize> {
    sizes.into_iter().reduce(CanvasSize::union)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use image::{Rgb, RgbImage};
    use rayon::ThreadPoolBuilder;

    #[test]
    fn canvas_is_pointwise_max() {
        let canvas = reduce_canvas([
            CanvasSize::new(970, 1358),
            CanvasSize::new(952, 1340),
            CanvasSize::new(990, 1368),
        ]);
        assert_eq!(canvas, Some(CanvasSize::new(990, 1368)));
        assert_eq!(reduce_canvas(Vec::new()), None);
    }

    #[test]
    fn survey_skips_undecodable_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let good = dir.path().join("a.png");
        RgbImage::from_pixel(200, 100, Rgb([255, 255, 255]))
            .save(&good)
            .expect("write png");
        let bad = dir.path().join("b.png");
        std::fs::write(&bad, b"not an image").expect("write junk");

        let config = ProcessingConfig::default();
        let pool = ThreadPoolBuilder::new().num_threads(2).build().expect("pool");
        let report = SizeSurveyor::new(&config, &pool).survey(&[good, bad], &SilentProgress);

        assert_eq!(report.canvas, Some(CanvasSize::new(194, 98)));
        assert!(report.sizes[0].is_ok());
        assert!(report.sizes[1].is_err());
    }
}
