use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "quilt-shops")]
#[command(about = "Builds a geocoded quilt shop directory from published shop lists")]
#[command(version)]
pub struct Cli {
    /// TOML settings file (defaults to ./quilt-shops.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape the California HTML list into its database
    California,
    /// Download and parse the Virginia PDF list into its database
    Virginia,
    /// Look up coordinates for stored shops
    Geocode {
        #[arg(value_enum)]
        source: SourceKind,

        /// Also retry shops whose earlier lookup failed
        #[arg(long)]
        retry_failed: bool,

        /// Geocode at most this many shops
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Combine the geocoded shops of every region into one database
    Merge {
        /// Output database (overrides merge.output_path)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    California,
    Virginia,
}
