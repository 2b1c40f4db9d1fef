use movie_scraper::cli::{Cli, Commands, CrawlArgs};
use movie_scraper::extract::{parse_film_page, ExtractError};
use movie_scraper::logging::init_logging;
use movie_scraper::retriever::{Retriever, ScrapeError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Crawl error: {0}")]
    Crawl(#[from] ScrapeError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

async fn run_crawl_command(args: CrawlArgs) -> Result<(), MainError> {
    let config = args.scraper_config().map_err(MainError::Config)?;
    let _log_guards = init_logging(&args.log_dir).map_err(|e| MainError::Logging(e.to_string()))?;

    let start_url = args.start_url();
    println!(
        "Crawling {} (up to {} films, {}s timeout, {} attempts per request)",
        start_url, config.max_films, args.timeout, config.retry.max_attempts
    );

    let mut retriever = Retriever::new(config)?;

    let summary = match retriever.run(&start_url).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Crawl aborted, no output written");
            return Err(e.into());
        }
    };

    let count = retriever.save(&args.output, args.format)?;
    info!(%summary, output = %args.output.display(), "Crawl finished");

    println!("Saved {} films to {}", count, args.output.display());
    println!("{}", summary);

    Ok(())
}

/// Replay extraction on a page mirrored by an earlier crawl
fn run_extract_command(file: PathBuf, url: String) -> Result<(), MainError> {
    let bytes = std::fs::read(&file)?;
    let html = String::from_utf8_lossy(&bytes);
    let page = parse_film_page(&url, &html)?;

    if !page.site_links.is_empty() {
        eprintln!(
            "{} official site link(s) left unresolved (offline replay)",
            page.site_links.len()
        );
    }

    println!("{}", serde_json::to_string_pretty(&page.record)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), MainError> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Crawl(args) => run_crawl_command(args).await?,
        Commands::Extract { file, url } => run_extract_command(file, url)?,
    }

    Ok(())
}
