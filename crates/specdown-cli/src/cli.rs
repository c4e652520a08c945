//! Command-line argument parsing and definitions
//!
//! Single-purpose binary: one or more API description documents in, one
//! Markdown report out. Defined with clap's derive API.

use clap::Parser;
use std::path::PathBuf;

/// Render API description documents (OpenAPI / AsyncAPI / plain schema
/// collections) as Markdown reference documentation.
#[derive(Parser, Debug)]
#[command(
    name = "specdown",
    version,
    author,
    about,
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Input documents (JSON or YAML); processed in order, failures are
    /// reported per document without aborting the batch
    #[arg(value_name = "DOCUMENT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Join description newlines into a single line
    #[arg(long)]
    pub join: bool,

    /// Keep only the first line of each description
    #[arg(long)]
    pub truncate: bool,

    /// Keep surrounding whitespace on descriptions
    #[arg(long)]
    pub no_trim: bool,

    /// Skip sample synthesis and echo schema structures instead
    #[arg(long)]
    pub no_samples: bool,

    /// Depth below which sampled containers collapse (0 disables trimming)
    #[arg(long, default_value_t = 10, value_name = "DEPTH")]
    pub max_sample_depth: usize,

    /// Enable verbose output (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Effective verbosity level, with quiet taking precedence
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
