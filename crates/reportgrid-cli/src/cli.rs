use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Pull bordered tables out of PDF reports into xlsx workbooks, then
/// filter or merge those workbooks.
#[derive(Debug, Parser)]
#[command(name = "reportgrid", about, version)]
pub struct Cli {
    /// Log progress at info level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the counted pages whose text contains a keyword
    Scan {
        /// Paths to the PDF files
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Keyword to look for (case-insensitive)
        #[arg(long, short)]
        keyword: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Preview the bordered tables on selected pages
    Tables {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page numbers counted after the preamble (e.g. '1,3-5')
        #[arg(long)]
        pages: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        tolerances: Tolerances,
    },

    /// Scan, extract and write every matching table to one workbook
    Extract {
        /// Paths to the PDF files
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Keyword to look for (case-insensitive)
        #[arg(long, short)]
        keyword: String,

        /// Workbook to write
        #[arg(long, short, default_value = "extracted_tables.xlsx")]
        output: PathBuf,

        #[command(flatten)]
        tolerances: Tolerances,
    },

    /// Keep only the sheets containing any keyword, writing *_filtered.xlsx
    Filter {
        /// Paths to the workbooks
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Comma-separated keywords (case-sensitive, not trimmed)
        #[arg(long, short)]
        keywords: String,
    },

    /// Combine workbooks into one sheet, dropping duplicate rows
    Merge {
        /// Paths to the workbooks
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Workbook to write
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Show suggested keywords for known reports
    Samples {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Lattice detection tolerances.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct Tolerances {
    /// Snap tolerance for aligning nearby edges (default: 3.0)
    #[arg(long, default_value_t = 3.0)]
    pub snap_tolerance: f64,

    /// Join tolerance for merging collinear edges (default: 3.0)
    #[arg(long, default_value_t = 3.0)]
    pub join_tolerance: f64,

    /// Text tolerance for assigning text to cells (default: 3.0)
    #[arg(long, default_value_t = 3.0)]
    pub text_tolerance: f64,
}

/// Output format for listing commands.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_defaults() {
        let cli = Cli::parse_from(["reportgrid", "extract", "a.pdf", "--keyword", "員工"]);
        match cli.command {
            Commands::Extract {
                files,
                keyword,
                output,
                tolerances,
            } => {
                assert_eq!(files, vec![PathBuf::from("a.pdf")]);
                assert_eq!(keyword, "員工");
                assert_eq!(output, PathBuf::from("extracted_tables.xlsx"));
                assert_eq!(tolerances.snap_tolerance, 3.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["reportgrid", "samples", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn scan_requires_files() {
        assert!(Cli::try_parse_from(["reportgrid", "scan", "--keyword", "x"]).is_err());
    }
}
