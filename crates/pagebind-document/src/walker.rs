// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory walker: the root input directory and its immediate
// subdirectories each become one PDF named after the directory.

use std::path::{Path, PathBuf};

use pagebind_core::error::{PagebindError, Result};
use pagebind_core::{CanvasSize, PageFailure};
use tracing::{error, info, instrument, warn};

use crate::batch::BatchProcessor;
use crate::pdf::assembler::DocumentAssembler;
use crate::progress::BatchProgress;

/// What happened to one directory.
#[derive(Debug)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    /// Where the PDF was (or would have been) written.
    pub output: PathBuf,
    /// Matching image files found.
    pub files: usize,
    /// Pages in the written PDF; 0 when nothing was written.
    pub page_count: usize,
    pub canvas: Option<CanvasSize>,
    /// Images that were skipped.
    pub failures: Vec<PageFailure>,
    /// At least one image was much smaller than the canvas.
    pub anomaly: bool,
    /// Listing or composition failure for the whole directory.
    pub error: Option<PagebindError>,
}

impl DirectoryReport {
    fn new(directory: &Path, output: PathBuf) -> Self {
        Self {
            directory: directory.to_path_buf(),
            output,
            files: 0,
            page_count: 0,
            canvas: None,
            failures: Vec::new(),
            anomaly: false,
            error: None,
        }
    }
}

/// Drives batch processing and assembly for every directory of a run.
pub struct DirectoryWalker<'a> {
    processor: &'a BatchProcessor,
    output_dir: PathBuf,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(processor: &'a BatchProcessor, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            processor,
            output_dir: output_dir.into(),
        }
    }

    /// Process `root` and each immediate subdirectory, one at a time.
    ///
    /// `on_report` is called as each directory finishes. Only failing to
    /// list `root` or to create the output directory aborts the run;
    /// everything else is recorded in the directory's report.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn run(
        &self,
        root: &Path,
        progress: &dyn BatchProgress,
        mut on_report: impl FnMut(&DirectoryReport),
    ) -> Result<Vec<DirectoryReport>> {
        let directories = directories_to_process(root, &self.output_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;
        info!(directories = directories.len(), "Starting run");

        let mut reports = Vec::with_capacity(directories.len());
        for directory in &directories {
            let report = self.process_one(directory, progress);
            on_report(&report);
            reports.push(report);
        }
        Ok(reports)
    }

    /// Process a single directory into `<output_dir>/<basename>.pdf`.
    pub fn process_one(&self, directory: &Path, progress: &dyn BatchProgress) -> DirectoryReport {
        let name = document_name(directory);
        let output = self.output_dir.join(format!("{name}.pdf"));
        let mut report = DirectoryReport::new(directory, output);

        let outcome = match self
            .processor
            .process_directory_with_progress(directory, progress)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(directory = %directory.display(), error = %err, "Cannot list directory");
                report.error = Some(err);
                return report;
            }
        };

        report.files = outcome.file_count();
        report.canvas = outcome.canvas;
        report.anomaly = outcome.anomaly;
        report.failures = outcome.failures;

        if outcome.pages.is_empty() {
            info!(directory = %directory.display(), "No pages; no document written");
            return report;
        }

        let mut assembler = DocumentAssembler::new(self.processor.config().dpi);
        assembler.set_title(name);
        match assembler.assemble(&outcome.pages, &report.output) {
            Ok(count) => report.page_count = count,
            Err(err) => {
                error!(error = %err, "Document not written");
                report.error = Some(err);
            }
        }

        if report.anomaly {
            warn!(
                directory = %directory.display(),
                "Some pages are much smaller than the rest; check for stray or mis-scanned files"
            );
        }
        report
    }
}

/// `root` followed by its immediate subdirectories in name order.
///
/// `exclude` (normally the output directory) is left out when it sits
/// inside `root`.
pub fn directories_to_process(root: &Path, exclude: &Path) -> Result<Vec<PathBuf>> {
    let excluded = exclude.canonicalize().ok();
    let mut children = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if excluded.is_some() && path.canonicalize().ok() == excluded {
            continue;
        }
        children.push(path);
    }
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut directories = Vec::with_capacity(children.len() + 1);
    directories.push(root.to_path_buf());
    directories.extend(children);
    Ok(directories)
}

/// Base name of `directory`, resolving `.` and `..` through the filesystem.
pub fn document_name(directory: &Path) -> String {
    directory
        .file_name()
        .map(|name| name.to_owned())
        .or_else(|| {
            directory
                .canonicalize()
                .ok()
                .and_then(|path| path.file_name().map(|name| name.to_owned()))
        })
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}
