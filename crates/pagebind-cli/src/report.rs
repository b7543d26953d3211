// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Console summaries of processed directories.

use std::fmt;

use pagebind_core::human_errors::{Severity, humanize_error};
use pagebind_document::DirectoryReport;

/// Lines describing one finished directory.
pub fn report_lines(report: &DirectoryReport) -> Vec<String> {
    let mut lines = Vec::new();
    let directory = report.directory.display();

    if let Some(err) = &report.error {
        let human = humanize_error(err);
        lines.push(format!(
            "{directory}: {}: {}",
            severity_label(human.severity),
            human.message
        ));
        lines.push(format!("  {}", human.suggestion));
    } else if report.page_count == 0 {
        lines.push(format!("{directory}: no pages, nothing written"));
    } else {
        let canvas = report
            .canvas
            .map(|canvas| format!(" (canvas {canvas})"))
            .unwrap_or_default();
        lines.push(format!(
            "{directory}: {} of {} pages -> {}{canvas}",
            report.page_count,
            report.files,
            report.output.display()
        ));
    }

    for failure in &report.failures {
        lines.push(format!("  skipped {}: {}", failure.path.display(), failure.reason));
    }

    if report.anomaly {
        lines.push(format!(
            "  Warning: some pages in {directory} are much smaller than the rest. \
             Check for stray or mis-scanned files."
        ));
    }
    lines
}

/// Leading word for an error line.
pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Skipped => "Skipped",
        Severity::ActionRequired => "Action needed",
        Severity::Permanent => "Failed",
    }
}

pub fn print_report(report: &DirectoryReport) {
    for line in report_lines(report) {
        println!("{line}");
    }
}

/// Totals across every directory of a run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub pages: usize,
    pub skipped: usize,
    pub failed_directories: usize,
    pub anomalies: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[DirectoryReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            if report.page_count > 0 {
                summary.documents += 1;
            }
            summary.pages += report.page_count;
            summary.skipped += report.failures.len();
            summary.failed_directories += usize::from(report.error.is_some());
            summary.anomalies += usize::from(report.anomaly);
            summary
        })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wrote {} PDF(s), {} page(s)", self.documents, self.pages)?;
        if self.skipped > 0 {
            write!(f, "; skipped {} image(s)", self.skipped)?;
        }
        if self.failed_directories > 0 {
            write!(f, "; {} folder(s) failed", self.failed_directories)?;
        }
        if self.anomalies > 0 {
            write!(f, "; {} folder(s) need checking", self.anomalies)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pagebind_core::{CanvasSize, PageFailure, PagebindError};

    use super::*;

    fn report(page_count: usize) -> DirectoryReport {
        DirectoryReport {
            directory: PathBuf::from("scans/letters"),
            output: PathBuf::from("scans/out/letters.pdf"),
            files: page_count,
            page_count,
            canvas: Some(CanvasSize::new(990, 1368)),
            failures: Vec::new(),
            anomaly: false,
            error: None,
        }
    }

    #[test]
    fn written_directory_names_output_and_canvas() {
        let lines = report_lines(&report(3));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("3 of 3 pages"));
        assert!(lines[0].contains("letters.pdf"));
        assert!(lines[0].contains("990x1368"));
    }

    #[test]
    fn failures_and_anomaly_get_their_own_lines() {
        let mut r = report(1);
        r.files = 2;
        r.anomaly = true;
        r.failures.push(PageFailure {
            index: 1,
            path: PathBuf::from("scans/letters/b.png"),
            reason: "truncated".into(),
        });
        let lines = report_lines(&r);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("b.png") && lines[1].contains("truncated"));
        assert!(lines[2].contains("Warning"));
    }

    #[test]
    fn empty_directory_says_nothing_written() {
        let lines = report_lines(&report(0));
        assert!(lines[0].contains("nothing written"));
    }

    #[test]
    fn directory_error_is_labelled_by_severity() {
        let mut r = report(0);
        r.error = Some(PagebindError::Composition {
            path: "scans/out/letters.pdf".into(),
            reason: "disk full".into(),
        });
        let lines = report_lines(&r);
        assert!(lines[0].starts_with("scans/letters: Action needed: "));
        assert!(lines[0].contains("letters.pdf"));

        r.error = Some(PagebindError::PdfError("broken".into()));
        assert!(report_lines(&r)[0].contains(": Failed: "));
    }

    #[test]
    fn summary_totals_reports() {
        let mut failed = report(0);
        failed.error = Some(PagebindError::PdfError("broken".into()));
        let mut odd = report(2);
        odd.anomaly = true;

        let summary = RunSummary::from_reports(&[report(3), odd, failed]);
        assert_eq!(
            summary,
            RunSummary {
                documents: 2,
                pages: 5,
                skipped: 0,
                failed_directories: 1,
                anomalies: 1,
            }
        );
        assert_eq!(
            summary.to_string(),
            "Wrote 2 PDF(s), 5 page(s); 1 folder(s) failed; 1 folder(s) need checking"
        );
    }
}
