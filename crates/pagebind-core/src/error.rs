// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pagebind.

use thiserror::Error;

/// Top-level error type for all pagebind operations.
#[derive(Debug, Error)]
pub enum PagebindError {
    // -- Image errors --
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("JPEG encoding failed: {0}")]
    Encode(String),

    // -- Document errors --
    #[error("failed to write {path}: {reason}")]
    Composition { path: String, reason: String },

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagebindError>;
