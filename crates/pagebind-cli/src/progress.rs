// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal progress bars for the two processing passes.

use std::path::Path;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use pagebind_document::{BatchProgress, Pass};

const TEMPLATE: &str = "{spinner:.green} {prefix:>12} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// One `indicatif` bar per pass, replaced when the next pass starts.
pub struct BarProgress {
    hidden: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new(hidden: bool) -> Self {
        Self {
            hidden,
            bar: Mutex::new(None),
        }
    }

    /// Run `f` with the current bar cleared from the terminal, so printed
    /// lines do not interleave with it.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.current() {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    fn current(&self) -> Option<ProgressBar> {
        self.bar
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn make_bar(&self, pass: Pass, total: usize) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_prefix(pass.label());
        bar
    }
}

impl BatchProgress for BarProgress {
    fn on_pass_start(&self, pass: Pass, total: usize) {
        let bar = self.make_bar(pass, total);
        let mut slot = self
            .bar
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = slot.replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn on_file_done(&self, _pass: Pass, path: &Path, ok: bool) {
        let Some(bar) = self.current() else {
            return;
        };
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if ok {
            bar.set_message(name);
        } else {
            bar.set_message(format!("{name} (skipped)"));
        }
        bar.inc(1);
    }

    fn on_pass_complete(&self, _pass: Pass) {
        let finished = self
            .bar
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(bar) = finished {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_files_within_a_pass() {
        let progress = BarProgress::new(true);
        progress.on_pass_start(Pass::Survey, 3);
        progress.on_file_done(Pass::Survey, Path::new("a.png"), true);
        progress.on_file_done(Pass::Survey, Path::new("b.png"), false);
        assert_eq!(progress.current().map(|bar| bar.position()), Some(2));

        progress.on_pass_complete(Pass::Survey);
        assert!(progress.current().is_none());
    }

    #[test]
    fn events_outside_a_pass_are_ignored() {
        let progress = BarProgress::new(true);
        progress.on_file_done(Pass::Normalize, Path::new("a.png"), true);
        assert_eq!(progress.suspend(|| 7), 7);
    }
}
