// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: composing page images into documents and reading them back.

pub mod assembler;
pub mod reader;

pub use assembler::DocumentAssembler;
pub use reader::PdfReader;
