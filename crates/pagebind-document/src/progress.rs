// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress reporting hooks for batch processing.

use std::path::Path;

/// The two passes over a directory's images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Decode and crop every image to find the canvas size.
    Survey,
    /// Normalise and encode every image onto the canvas.
    Normalize,
}

impl Pass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Survey => "surveying",
            Self::Normalize => "normalising",
        }
    }
}

/// Receives progress events from the worker pool.
///
/// `on_file_done` is called from worker threads in completion order, which
/// is not the page order.
pub trait BatchProgress: Send + Sync {
    /// A pass is starting over `total` files.
    fn on_pass_start(&self, pass: Pass, total: usize);
    /// One file finished (successfully or not).
    fn on_file_done(&self, pass: Pass, path: &Path, ok: bool);
    /// Every file of the pass has been collected.
    fn on_pass_complete(&self, pass: Pass);
}

/// No-op progress sink.
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn on_pass_start(&self, _pass: Pass, _total: usize) {}
    fn on_file_done(&self, _pass: Pass, _path: &Path, _ok: bool) {}
    fn on_pass_complete(&self, _pass: Pass) {}
}
