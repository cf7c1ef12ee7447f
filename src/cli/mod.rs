pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "leadharvest")]
#[command(about = "Collect business leads from map search results", long_about = None)]
pub struct Cli {
    /// Path to a config file (default: ~/.config/leadharvest/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape leads for a keyword and location
    Scrape(ScrapeArgs),
    /// Count the unique addresses already stored in an output file
    Inspect {
        /// Path to a lead CSV file
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Business keyword, e.g. "Med Spa"
    #[arg(short, long)]
    pub keyword: String,

    /// City and state
    #[arg(short, long)]
    pub location: String,

    #[arg(short, long)]
    pub country: String,

    /// Number of new leads to collect
    #[arg(short = 'n', long)]
    pub leads: usize,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub show_browser: bool,

    /// Output folder (default from config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output file name; ".csv" is appended when missing (default from config)
    #[arg(short, long)]
    pub file_name: Option<String>,
}
