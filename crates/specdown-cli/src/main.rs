//! Specdown CLI - render API description documents as Markdown
//!
//! This is the main entry point for the specdown binary: load each input
//! document, run the schema engine over its named schemas, and emit one
//! Markdown report to stdout or a file.

mod cli;
mod document;
mod error;
mod logging;
mod render;

use cli::Cli;
use document::{DocumentReport, DriverOptions};
use error::{Error, Result};
use specdown_core::{DedupReporter, FormatOptions, SampleOptions};
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    logging::init(cli.verbosity_level(), cli.quiet);

    match run(cli) {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(inputs = cli.inputs.len()))]
fn run(cli: Cli) -> Result<()> {
    let options = DriverOptions {
        format: FormatOptions {
            trim: !cli.no_trim,
            join: cli.join,
            truncate: cli.truncate,
            ..FormatOptions::default()
        },
        sample: SampleOptions {
            enabled: !cli.no_samples,
            max_depth: cli.max_sample_depth,
        },
    };

    // one reporter per batch so repeated warnings collapse across documents
    let mut reporter = DedupReporter::new();
    let mut reports: Vec<DocumentReport> = Vec::new();
    let mut failures = 0usize;

    for path in &cli.inputs {
        tracing::info!(path = %path.display(), "processing document");
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let outcome = document::load_document(path)
            .and_then(|doc| document::process_document(&doc, &fallback, &options, &mut reporter));
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                tracing::error!(path = %path.display(), error = %e, "document failed");
            }
        }
    }

    if reports.is_empty() {
        return Err(Error::AllInputsFailed { count: failures });
    }
    if failures > 0 {
        tracing::warn!(failures, succeeded = reports.len(), "batch partially failed");
    }
    if reporter.suppressed() > 0 {
        tracing::info!(suppressed = reporter.suppressed(), "duplicate warnings suppressed");
    }

    let markdown = render::render_report(&reports)?;
    match &cli.output {
        Some(path) => std::fs::write(path, markdown)?,
        None => print!("{}", markdown),
    }
    Ok(())
}
