// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagebind: turn folders of scanned pages into clean PDFs.
//
// Entry point. Parses arguments, initialises logging, builds the processing
// configuration, and walks the input directory.

mod progress;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use pagebind_core::ProcessingConfig;
use pagebind_core::error::{PagebindError, Result};
use pagebind_core::human_errors::humanize_error;
use pagebind_document::{BatchProcessor, DirectoryWalker};

use progress::BarProgress;

/// Convert a directory of scanned page images (and each of its immediate
/// subdirectories) into one normalised PDF per directory.
#[derive(Debug, Parser)]
#[command(name = "pagebind", version, about)]
struct Cli {
    /// Directory holding the page images.
    input_path: PathBuf,

    /// Where PDFs are written [default: <INPUT_PATH>/out]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JPEG quality of each page, 1-100 [default: 85]
    #[arg(short, long)]
    quality: Option<u8>,

    /// Scale applied to every page after padding [default: 0.5]
    #[arg(short, long)]
    resize_ratio: Option<f64>,

    /// Worker threads per directory [default: one per logical core]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Resolution recorded in pages and used for PDF page size [default: 300]
    #[arg(long)]
    dpi: Option<u16>,

    /// JSON file with processing settings; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only warnings and errors; no progress bars.
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied.
    fn processing_config(&self) -> Result<ProcessingConfig> {
        let mut config = match &self.config {
            Some(path) => ProcessingConfig::load(path)?,
            None => ProcessingConfig::default(),
        };
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(ratio) = self.resize_ratio {
            config.resize_ratio = ratio;
        }
        if let Some(jobs) = self.jobs {
            config.workers = Some(jobs);
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        config.validate()?;
        Ok(config)
    }

    fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input_path.join("out"))
    }

    fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("pagebind starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, "run aborted");
            eprintln!("{}: {}", report::severity_label(human.severity), human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.input_path.is_dir() {
        return Err(PagebindError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", cli.input_path.display()),
        )));
    }

    let config = cli.processing_config()?;
    let processor = BatchProcessor::new(config)?;
    let progress = BarProgress::new(cli.quiet);

    let reports = DirectoryWalker::new(&processor, cli.output_dir()).run(
        &cli.input_path,
        &progress,
        |finished| progress.suspend(|| report::print_report(finished)),
    )?;

    let summary = report::RunSummary::from_reports(&reports);
    println!("{summary}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_processing_defaults() {
        let cli = Cli::try_parse_from(["pagebind", "scans"]).expect("parse");
        assert_eq!(cli.output_dir(), PathBuf::from("scans").join("out"));
        assert_eq!(cli.log_filter(), "info");
        let config = cli.processing_config().expect("config");
        assert_eq!(config, ProcessingConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "pagebind", "scans", "-o", "pdfs", "-q", "70", "-r", "0.25", "-j", "3", "--dpi", "150",
        ])
        .expect("parse");
        assert_eq!(cli.output_dir(), PathBuf::from("pdfs"));
        let config = cli.processing_config().expect("config");
        assert_eq!(config.quality, 70);
        assert_eq!(config.resize_ratio, 0.25);
        assert_eq!(config.workers, Some(3));
        assert_eq!(config.dpi, 150);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "quality": 60, "dpi": 200 }"#).expect("write");

        let cli = Cli::try_parse_from([
            "pagebind",
            "scans",
            "-c",
            path.to_str().expect("utf-8 path"),
            "-q",
            "90",
        ])
        .expect("parse");
        let config = cli.processing_config().expect("config");
        assert_eq!(config.quality, 90);
        assert_eq!(config.dpi, 200);
        assert_eq!(config.resize_ratio, 0.5);
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        let cli = Cli::try_parse_from(["pagebind", "scans", "-q", "0"]).expect("parse");
        assert!(matches!(
            cli.processing_config(),
            Err(PagebindError::InvalidConfig(_))
        ));
    }

    #[test]
    fn verbosity_selects_filter() {
        let cli = Cli::try_parse_from(["pagebind", "scans", "-vv"]).expect("parse");
        assert_eq!(cli.log_filter(), "trace");
        let cli = Cli::try_parse_from(["pagebind", "scans", "--quiet"]).expect("parse");
        assert_eq!(cli.log_filter(), "warn");
        assert!(Cli::try_parse_from(["pagebind", "scans", "--quiet", "-v"]).is_err());
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope");
        let cli = Cli::try_parse_from(["pagebind", missing.to_str().expect("utf-8 path")])
            .expect("parse");
        assert!(matches!(run(&cli), Err(PagebindError::Io(_))));
    }
}
