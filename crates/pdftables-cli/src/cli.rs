use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Detect tables and template fields in positioned PDF page layouts.
#[derive(Debug, Parser)]
#[command(name = "pdftables", about, version)]
pub struct Cli {
    /// Log detection decisions to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect and extract tables automatically
    Tables {
        /// Path to the page layout JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// Extract tables and fields described by an XML template
    Template {
        /// Path to the page layout JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to the XML template
        #[arg(long, value_name = "XML")]
        template: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Table detection options for the `tables` subcommand.
#[derive(Debug, Clone, Args)]
pub struct DetectionArgs {
    /// Table detection strategy
    #[arg(long, value_enum)]
    pub strategy: Option<TableStrategy>,

    /// Whitespace gap, in median character widths, that separates columns (default: 2.0)
    #[arg(long)]
    pub gap_multiplier: Option<f64>,

    /// Distance under which parallel rulings merge (default: 1.0)
    #[arg(long)]
    pub merge_tolerance: Option<f64>,

    /// Slack for rulings meeting or spanning a table (default: 2.0)
    #[arg(long)]
    pub span_tolerance: Option<f64>,

    /// Collapse adjacent empty rows and/or columns
    #[arg(long, value_enum)]
    pub merge_empty: Option<MergeEmptyArg>,

    /// JSON file with full extraction settings; flags override its values
    #[arg(long, value_name = "JSON")]
    pub settings: Option<PathBuf>,
}

/// Table detection strategy for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TableStrategy {
    /// Drawn rulings, falling back to whitespace alignment
    Auto,
    /// Drawn lines and rectangles only
    Ruled,
    /// Whitespace alignment only
    Whitespace,
}

impl TableStrategy {
    pub fn to_strategy(self) -> pdftables_core::Strategy {
        match self {
            TableStrategy::Auto => pdftables_core::Strategy::Auto,
            TableStrategy::Ruled => pdftables_core::Strategy::Ruled,
            TableStrategy::Whitespace => pdftables_core::Strategy::Whitespace,
        }
    }
}

/// Empty row/column merging for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MergeEmptyArg {
    None,
    Rows,
    Columns,
    Both,
}

impl MergeEmptyArg {
    pub fn to_merge_empty(self) -> pdftables_core::MergeEmpty {
        match self {
            MergeEmptyArg::None => pdftables_core::MergeEmpty::None,
            MergeEmptyArg::Rows => pdftables_core::MergeEmpty::Rows,
            MergeEmptyArg::Columns => pdftables_core::MergeEmpty::Columns,
            MergeEmptyArg::Both => pdftables_core::MergeEmpty::Both,
        }
    }
}

/// Output format for both subcommands.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Bordered text grids
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}
