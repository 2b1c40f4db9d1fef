use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::backoff::RetryPolicy;
use crate::config::{Config, ScraperConfig};
use crate::export::OutputFormat;
use crate::url_utils::normalize_url_for_cli;

/// CLI entry point so users can control the scraper from the command line.
/// Exit codes: 0=success, 2=invalid arguments, 1=crawl or I/O failure
#[derive(Parser, Debug)]
#[command(name = "movie_scraper")]
#[command(about = "Crawl a film catalog, mirror every page and export film records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk the catalog listing from the start URL and export every film found.
    Crawl(CrawlArgs),

    /// Re-run extraction on a dumped film page without touching the network.
    Extract {
        #[arg(short, long, help = "Dumped film detail page (e.g. html/00002-filmpage.html)")]
        file: PathBuf,

        #[arg(
            short,
            long,
            default_value = "https://www.imdb.com/",
            help = "URL the page was fetched from, recorded as imdb_url"
        )]
        url: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct CrawlArgs {
    #[arg(
        short,
        long,
        default_value = Config::START_URL,
        help = "First listing page, with the catalog filters in its query string"
    )]
    pub start_url: String,

    #[arg(
        short,
        long,
        default_value_t = Config::MAX_FILMS,
        help = "Stop once this many films have been extracted"
    )]
    pub max_films: usize,

    #[arg(short, long, default_value = Config::OUTPUT_FILE, help = "Output document")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json, help = "Output layout")]
    pub format: OutputFormat,

    #[arg(
        short,
        long,
        default_value = Config::DUMP_DIR,
        help = "Directory receiving a copy of every fetched page (cleared at startup)"
    )]
    pub dump_dir: PathBuf,

    #[arg(long, default_value = Config::LOG_DIR, help = "Directory for log files")]
    pub log_dir: PathBuf,

    #[arg(short, long, default_value = Config::USER_AGENT, help = "User agent string for requests")]
    pub user_agent: String,

    #[arg(long, default_value = Config::INITIAL_REFERER, help = "Referer presented on the first request")]
    pub referer: String,

    #[arg(
        short,
        long,
        default_value_t = Config::HTTP_TIMEOUT_SECS,
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        long,
        default_value_t = Config::MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Attempts per request before giving up"
    )]
    pub max_attempts: u32,

    #[arg(
        long,
        default_value_t = Config::ERROR_WAIT_SECS,
        help = "Seconds to wait after a failed attempt"
    )]
    pub error_wait: u64,

    #[arg(
        long,
        default_value_t = Config::WAIT_MIN_SECS,
        help = "Lower bound of the random delay after every request, in seconds"
    )]
    pub wait_min: u64,

    #[arg(
        long,
        default_value_t = Config::WAIT_MAX_SECS,
        help = "Upper bound of the random delay after every request, in seconds"
    )]
    pub wait_max: u64,
}

impl CrawlArgs {
    /// Normalized start URL
    pub fn start_url(&self) -> String {
        normalize_url_for_cli(&self.start_url)
    }

    /// Build the runtime configuration; rejects an inverted delay range.
    pub fn scraper_config(&self) -> Result<ScraperConfig, String> {
        if self.wait_min > self.wait_max {
            return Err(format!(
                "--wait-min ({}) must not exceed --wait-max ({})",
                self.wait_min, self.wait_max
            ));
        }

        Ok(ScraperConfig {
            user_agent: self.user_agent.clone(),
            initial_referer: self.referer.clone(),
            timeout: Duration::from_secs(self.timeout),
            max_redirects: Config::MAX_REDIRECTS,
            retry: RetryPolicy::new(self.max_attempts, Duration::from_secs(self.error_wait))
                .with_jitter(
                    Duration::from_secs(self.wait_min),
                    Duration::from_secs(self.wait_max),
                ),
            max_films: self.max_films,
            dump_dir: self.dump_dir.clone(),
        })
    }
}

impl Cli {
    /// Parse CLI arguments so the rest of the program can rely on structured options.
    /// On error, clap prints help and exits with code 2 (usage error).
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawl_args(cli: Cli) -> CrawlArgs {
        match cli.command {
            Commands::Crawl(args) => args,
            _ => panic!("Expected Crawl command"),
        }
    }

    #[test]
    fn test_crawl_command_defaults() {
        let cli = Cli::try_parse_from(["movie_scraper", "crawl"]).unwrap();
        let args = crawl_args(cli);
        assert_eq!(args.start_url, Config::START_URL);
        assert_eq!(args.max_films, 1000);
        assert_eq!(args.output, PathBuf::from("output.json"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.dump_dir, PathBuf::from("html"));
        assert_eq!(args.timeout, 30);
        assert_eq!(args.max_attempts, 3);

        let config = args.scraper_config().unwrap();
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.initial_referer, "https://www.google.com");
    }

    #[test]
    fn test_crawl_command_with_options() {
        let cli = Cli::try_parse_from([
            "movie_scraper",
            "crawl",
            "--start-url",
            "www.imdb.com/search/title/?genres=drama",
            "--max-films",
            "25",
            "--output",
            "/tmp/films.jsonl",
            "--format",
            "jsonl",
            "--max-attempts",
            "5",
            "--wait-min",
            "0",
            "--wait-max",
            "0",
        ])
        .unwrap();
        let args = crawl_args(cli);
        assert_eq!(args.start_url(), "https://www.imdb.com/search/title/?genres=drama");
        assert_eq!(args.max_films, 25);
        assert_eq!(args.format, OutputFormat::Jsonl);

        let config = args.scraper_config().unwrap();
        assert_eq!(config.max_films, 25);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.jitter_max, Duration::ZERO);
    }

    #[test]
    fn test_inverted_wait_range_is_rejected() {
        let cli = Cli::try_parse_from(["movie_scraper", "crawl", "--wait-min", "4", "--wait-max", "2"]).unwrap();
        assert!(crawl_args(cli).scraper_config().is_err());
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let cli = Cli::try_parse_from(["movie_scraper", "crawl", "--max-attempts", "0"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_extract_command() {
        let cli = Cli::try_parse_from([
            "movie_scraper",
            "extract",
            "--file",
            "html/00002-filmpage.html",
            "--url",
            "https://www.imdb.com/title/tt0000001/",
        ])
        .unwrap();
        match cli.command {
            Commands::Extract { file, url } => {
                assert_eq!(file, PathBuf::from("html/00002-filmpage.html"));
                assert_eq!(url, "https://www.imdb.com/title/tt0000001/");
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_extract_requires_file() {
        let err = Cli::try_parse_from(["movie_scraper", "extract"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_invalid_command() {
        assert!(Cli::try_parse_from(["movie_scraper", "invalid-command"]).is_err());
    }

    #[test]
    fn test_help_does_not_panic() {
        let err = Cli::try_parse_from(["movie_scraper", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_panic() {
        let err = Cli::try_parse_from(["movie_scraper", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
