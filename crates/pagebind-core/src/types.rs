// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for pagebind.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Common page canvas for one directory: the pointwise maximum of every
/// post-crop image size in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Grow to cover `other` on both axes.
    pub fn union(self, other: CanvasSize) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Whether an image of this size fits inside `canvas`.
    pub fn fits_within(&self, canvas: &CanvasSize) -> bool {
        self.width <= canvas.width && self.height <= canvas.height
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One finished page: a progressive JPEG ready for composition.
#[derive(Debug, Clone)]
pub struct PageBuffer {
    /// Position in the sorted file list.
    pub index: usize,
    /// The file this page was produced from.
    pub source: PathBuf,
    /// Encoded JPEG bytes.
    pub bytes: Vec<u8>,
    /// Pixel width after the final resize.
    pub width: u32,
    /// Pixel height after the final resize.
    pub height: u32,
    /// Whether the post-crop image was much smaller than the canvas.
    pub anomalous: bool,
}

/// A file that could not be turned into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// Position in the sorted file list.
    pub index: usize,
    pub path: PathBuf,
    pub reason: String,
}

/// Everything produced by processing one directory's images.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// `None` when no image in the batch could be decoded.
    pub canvas: Option<CanvasSize>,
    /// Successful pages, in sorted filename order.
    pub pages: Vec<PageBuffer>,
    /// Files that were skipped, in sorted filename order.
    pub failures: Vec<PageFailure>,
    /// Set when any page tripped the size anomaly check.
    pub anomaly: bool,
}

impl BatchOutcome {
    /// Total number of input files considered.
    pub fn file_count(&self) -> usize {
        self.pages.len() + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_union_is_pointwise_max() {
        let a = CanvasSize::new(970, 1358);
        let b = CanvasSize::new(990, 1340);
        assert_eq!(a.union(b), CanvasSize::new(990, 1358));
        assert!(a.fits_within(&a.union(b)));
        assert!(!CanvasSize::new(1000, 10).fits_within(&a));
    }
}
