// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanned-page pipeline: the canvas size survey (pass 1) and per-image
// normalisation onto that canvas (pass 2).

pub mod normalize;
pub mod survey;

pub use normalize::{ImageNormalizer, NormalizedPage};
pub use survey::{SizeSurveyor, SurveyReport};
