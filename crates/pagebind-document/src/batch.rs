// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch processing: lists a directory's images, surveys the canvas size,
// then normalises every image onto it. Both passes fan out over a rayon
// pool; results are restored to sorted filename order before they leave.

use std::path::{Path, PathBuf};

use pagebind_core::error::{PagebindError, Result};
use pagebind_core::{BatchOutcome, CanvasSize, PageBuffer, PageFailure, ProcessingConfig};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, instrument, warn};

use crate::progress::{BatchProgress, Pass, SilentProgress};
use crate::scan::normalize::ImageNormalizer;
use crate::scan::survey::SizeSurveyor;

/// Converts one directory's images into ordered page buffers.
///
/// Owns the worker pool, so building one processor per run and reusing it
/// across directories avoids respawning threads.
pub struct BatchProcessor {
    config: ProcessingConfig,
    pool: ThreadPool,
}

impl BatchProcessor {
    /// Validate `config` and start a worker pool sized to `config.workers`
    /// (default: one per logical core).
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config.validate()?;
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|index| format!("pagebind-worker-{index}"));
        if let Some(workers) = config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build().map_err(|err| {
            PagebindError::InvalidConfig(format!("failed to start worker pool: {err}"))
        })?;
        info!(workers = pool.current_num_threads(), "Worker pool ready");
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Matching image files directly inside `dir`, sorted by file name.
    ///
    /// This order is the page order of the resulting document.
    pub fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && self.config.accepts(&path) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Process every matching image in `dir`.
    pub fn process_directory(&self, dir: &Path) -> Result<BatchOutcome> {
        self.process_directory_with_progress(dir, &SilentProgress)
    }

    /// Process every matching image in `dir`, reporting to `progress`.
    ///
    /// Only a failure to list `dir` is an error. Files that cannot be
    /// decoded or normalised are skipped and reported in
    /// [`BatchOutcome::failures`].
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn process_directory_with_progress(
        &self,
        dir: &Path,
        progress: &dyn BatchProgress,
    ) -> Result<BatchOutcome> {
        let files = self.list_images(dir)?;
        info!(files = files.len(), "Listed images");
        Ok(self.process_files(&files, progress))
    }

    /// Run both passes over an already sorted file list.
    pub fn process_files(&self, files: &[PathBuf], progress: &dyn BatchProgress) -> BatchOutcome {
        if files.is_empty() {
            return BatchOutcome::default();
        }

        // Pass 1: the canvas must be final before any page is normalised.
        let survey = SizeSurveyor::new(&self.config, &self.pool).survey(files, progress);
        let Some(canvas) = survey.canvas else {
            let failures = files
                .iter()
                .zip(survey.sizes)
                .enumerate()
                .filter_map(|(index, (path, size))| {
                    size.err().map(|err| failure(index, path, &err))
                })
                .collect();
            return BatchOutcome {
                failures,
                ..Default::default()
            };
        };

        // Files that failed pass 1 are not retried in pass 2.
        let mut failures = Vec::new();
        let mut pending = Vec::new();
        for (index, (path, size)) in files.iter().zip(survey.sizes).enumerate() {
            match size {
                Ok(_) => pending.push((index, path)),
                Err(err) => failures.push(failure(index, path, &err)),
            }
        }

        // Pass 2.
        let normalized = self.normalize_all(&pending, canvas, progress);

        let mut pages = Vec::with_capacity(normalized.len());
        for (index, path, result) in normalized {
            match result {
                Ok(page) => pages.push(PageBuffer {
                    index,
                    source: path.to_path_buf(),
                    bytes: page.bytes,
                    width: page.width,
                    height: page.height,
                    anomalous: page.anomalous,
                }),
                Err(err) => failures.push(failure(index, path, &err)),
            }
        }
        failures.sort_by_key(|failure| failure.index);

        let anomaly = pages.iter().any(|page| page.anomalous);
        info!(
            pages = pages.len(),
            failed = failures.len(),
            anomaly,
            "Batch processed"
        );

        BatchOutcome {
            canvas: Some(canvas),
            pages,
            failures,
            anomaly,
        }
    }

    /// Pass 2 fan-out. Results come back sorted by input index.
    fn normalize_all<'p>(
        &self,
        pending: &[(usize, &'p PathBuf)],
        canvas: CanvasSize,
        progress: &dyn BatchProgress,
    ) -> Vec<(usize, &'p PathBuf, Result<crate::scan::NormalizedPage>)> {
        progress.on_pass_start(Pass::Normalize, pending.len());
        let normalizer = ImageNormalizer::new(&self.config);

        let mut results: Vec<_> = self.pool.install(|| {
            pending
                .par_iter()
                .map(|&(index, path)| {
                    let result = normalizer.normalize_file(path, canvas);
                    progress.on_file_done(Pass::Normalize, path, result.is_ok());
                    (index, path, result)
                })
                .collect()
        });
        results.sort_by_key(|(index, _, _)| *index);

        progress.on_pass_complete(Pass::Normalize);
        results
    }
}

fn failure(index: usize, path: &Path, err: &PagebindError) -> PageFailure {
    warn!(path = %path.display(), error = %err, "Skipping image");
    PageFailure {
        index,
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
