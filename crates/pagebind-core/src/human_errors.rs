// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people digitising paper documents.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the command line presents the failure.

use crate::error::PagebindError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Only one page or one folder is affected; the rest of the run continues.
    Skipped,
    /// The user must change something (a flag, a config file, permissions).
    ActionRequired,
    /// Cannot be fixed by retrying: damaged or unsupported input.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `PagebindError` into a `HumanError`.
pub fn humanize_error(err: &PagebindError) -> HumanError {
    match err {
        PagebindError::Decode { path, .. } => HumanError {
            message: format!("{path} could not be read as an image."),
            suggestion: "The file may be damaged or only partly copied. Open it in an image viewer, or re-save it as JPEG or PNG.".into(),
            severity: Severity::Skipped,
        },

        PagebindError::ImageError(detail) => HumanError {
            message: "A page could not be prepared.".into(),
            suggestion: format!("The page was left out of the PDF. ({detail})"),
            severity: Severity::Skipped,
        },

        PagebindError::Encode(detail) => HumanError {
            message: "A page could not be saved as JPEG.".into(),
            suggestion: format!("Very large scans may exceed JPEG limits. Try a smaller resize ratio. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PagebindError::Composition { path, .. } => HumanError {
            message: format!("The PDF {path} could not be written."),
            suggestion: "Check that the output folder is writable and that the disk is not full.".into(),
            severity: Severity::ActionRequired,
        },

        PagebindError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try converting the folder again.".into(),
            severity: Severity::Permanent,
        },

        PagebindError::InvalidConfig(detail) => HumanError {
            message: "One of the settings is out of range.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PagebindError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The folder or file couldn't be found.".into(),
                suggestion: "Check the input path is spelled correctly.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission was denied.".into(),
                suggestion: "Check you can read the input folder and write to the output folder.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                severity: Severity::Permanent,
            },
        },

        PagebindError::Serialization(_) => HumanError {
            message: "The configuration file isn't valid JSON.".into(),
            suggestion: "Check the file for typos such as missing quotes or commas.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failure_is_skipped() {
        let err = PagebindError::Decode {
            path: "scans/page_07.jpg".into(),
            reason: "unexpected EOF".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Skipped);
        assert!(human.message.contains("page_07.jpg"));
    }

    #[test]
    fn missing_input_is_action_required() {
        let err = PagebindError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn composition_failure_names_output() {
        let err = PagebindError::Composition {
            path: "out/scans.pdf".into(),
            reason: "disk full".into(),
        };
        let human = humanize_error(&err);
        assert!(human.message.contains("out/scans.pdf"));
        assert_eq!(human.severity, Severity::ActionRequired);
    }
}
