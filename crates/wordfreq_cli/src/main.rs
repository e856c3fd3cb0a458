//! `wordfreq` command-line entry point.
//!
//! Wires configuration, logging, the HTTP fetcher and the SQLite store
//! around the core pipeline. Iteration reports go to stdout, diagnostics to
//! the log files.

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ScrapeArgs};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use wordfreq_core::db::open_db;
use wordfreq_core::model::word::normalize_word;
use wordfreq_core::{
    default_log_level, init_logging, run_cadence, HttpDocumentFetcher, PipelineRunner,
    ScraperConfig, StatsService,
};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_cli_logging(&cli)?;

    match &cli.command {
        Commands::Run {
            scrape,
            interval_secs,
            iterations,
        } => {
            let config = scraper_config(scrape, Duration::from_secs(*interval_secs))?;
            run_scraper(&cli.db, &config, *iterations)
        }
        Commands::Once { scrape } => {
            let config = scraper_config(scrape, ScraperConfig::default().interval)?;
            run_scraper(&cli.db, &config, Some(1))
        }
        Commands::Dictionary { json } => {
            let conn = open_db(&cli.db)?;
            let words = StatsService::for_connection(&conn)?.dictionary()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&words)?);
            } else {
                for entry in words {
                    println!("{}\t{}", entry.word, entry.count);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lookup { words } => {
            let conn = open_db(&cli.db)?;
            let service = StatsService::for_connection(&conn)?;
            let requested: Vec<&str> = words.iter().map(String::as_str).collect();
            for entry in service.lookup_words(&requested)? {
                println!("{}\t{}", entry.word, entry.count);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Invalidate { word } => {
            let conn = open_db(&cli.db)?;
            println!("{}", flag_invalid_word(&conn, word)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stats => {
            let conn = open_db(&cli.db)?;
            let service = StatsService::for_connection(&conn)?;
            let totals = service.document_totals()?;
            let distinct = service.dictionary()?.len();
            println!("documents\t{}", totals.documents);
            println!("words\t{}", totals.words);
            println!("distinct_words\t{distinct}");
            println!("invalid_words\t{}", service.invalid_words()?.len());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn flag_invalid_word(conn: &Connection, raw: &str) -> Result<String> {
    let word = normalize_word(raw)?;
    if StatsService::for_connection(conn)?.mark_invalid_word(&word)? {
        Ok(format!("flagged `{word}` as invalid"))
    } else {
        Ok(format!("`{word}` was already flagged"))
    }
}

fn scraper_config(scrape: &ScrapeArgs, interval: Duration) -> Result<ScraperConfig> {
    let config = ScraperConfig {
        source_url: scrape.source_url.clone(),
        interval,
        fetch_timeout: Duration::from_secs(scrape.timeout_secs),
        ..ScraperConfig::default()
    };
    config.validate().context("invalid scraper configuration")?;
    Ok(config)
}

fn run_scraper(db: &Path, config: &ScraperConfig, iterations: Option<u64>) -> Result<ExitCode> {
    let fetcher = HttpDocumentFetcher::new(config)?;
    let runner = PipelineRunner::new(fetcher, config.source_url.as_str());

    let summary = run_cadence(
        &runner,
        config.interval,
        iterations,
        || open_db(db),
        |report| println!("{report}"),
    );
    info!(
        "event=cadence_end module=cli status=ok iterations={} recorded={} skipped={} failed={}",
        summary.iterations, summary.recorded, summary.skipped, summary.failed
    );

    if summary.failed > 0 && summary.failed == summary.iterations {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn init_cli_logging(cli: &Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = absolute(cli.log_dir.clone().unwrap_or_else(|| PathBuf::from("logs")))?;
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| anyhow!("log dir `{}` is not valid UTF-8", log_dir.display()))?;
    init_logging(level, log_dir).map_err(|err| anyhow!(err))
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("cannot resolve current directory")?;
    Ok(cwd.join(path))
}
