use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wordfreq_core::config::{DEFAULT_FETCH_TIMEOUT, DEFAULT_INTERVAL, DEFAULT_SOURCE_URL};

#[derive(Parser, Debug)]
#[command(name = "wordfreq")]
#[command(about = "Scrapes random encyclopedia articles and counts five-letter words", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "WORDFREQ_DB", default_value = "wordfreq.db")]
    pub db: PathBuf,

    /// Log level (trace, debug, info, warn, error); defaults by build mode
    #[arg(long, global = true, env = "WORDFREQ_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rotating log files; defaults to ./logs
    #[arg(long, global = true, env = "WORDFREQ_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Reference fetched on every iteration
    #[arg(long, env = "WORDFREQ_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Per-request timeout in seconds, redirects included
    #[arg(long, env = "WORDFREQ_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape on a fixed interval until stopped
    Run {
        #[command(flatten)]
        scrape: ScrapeArgs,

        /// Seconds between iterations
        #[arg(long, env = "WORDFREQ_INTERVAL_SECS", default_value_t = DEFAULT_INTERVAL.as_secs())]
        interval_secs: u64,

        /// Stop after this many iterations
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        iterations: Option<u64>,
    },
    /// Scrape a single document
    Once {
        #[command(flatten)]
        scrape: ScrapeArgs,
    },
    /// Print accumulated word counts, excluding words flagged invalid
    Dictionary {
        /// Emit JSON instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },
    /// Print stored counts for specific words
    Lookup {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Flag a word so it is left out of the dictionary
    Invalidate { word: String },
    /// Print document and word totals
    Stats,
}
