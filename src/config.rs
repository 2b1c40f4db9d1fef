// Global configuration constants - single source of truth

use std::path::PathBuf;
use std::time::Duration;

use crate::backoff::RetryPolicy;

pub struct Config;

impl Config {
    // Catalog
    pub const START_URL: &'static str = "https://www.imdb.com/search/title/?title_type=feature&release_date=2000-02-25,2020-05-28&user_rating=4.0,10.0&genres=comedy&countries=us";
    pub const INITIAL_REFERER: &'static str = "https://www.google.com";
    pub const USER_AGENT: &'static str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.121 Safari/537.36";
    pub const MAX_FILMS: usize = 1000;

    // HTTP/Network config
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const ERROR_WAIT_SECS: u64 = 5;
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
    pub const MAX_REDIRECTS: usize = 10;

    // Random delay after every request
    pub const WAIT_MIN_SECS: u64 = 1;
    pub const WAIT_MAX_SECS: u64 = 3;

    // Filesystem
    pub const DUMP_DIR: &'static str = "html";
    pub const OUTPUT_FILE: &'static str = "output.json";
    pub const LOG_DIR: &'static str = "logs";
}

/// Runtime settings for one scraping run.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub initial_referer: String,
    pub timeout: Duration,
    pub max_redirects: usize,
    pub retry: RetryPolicy,
    pub max_films: usize,
    pub dump_dir: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: Config::USER_AGENT.to_string(),
            initial_referer: Config::INITIAL_REFERER.to_string(),
            timeout: Duration::from_secs(Config::HTTP_TIMEOUT_SECS),
            max_redirects: Config::MAX_REDIRECTS,
            retry: RetryPolicy::default(),
            max_films: Config::MAX_FILMS,
            dump_dir: PathBuf::from(Config::DUMP_DIR),
        }
    }
}
