pub mod backoff;
pub mod cli;
pub mod config;
pub mod dump;
pub mod export;
pub mod extract;
pub mod logging;
pub mod models;
pub mod network;
pub mod parser;
pub mod retriever;
pub mod session;
pub mod url_utils;

// Re-export main types for library usage
pub use backoff::RetryPolicy;
pub use config::{Config, ScraperConfig};
pub use dump::{PageDumper, RequestLabel};
pub use export::{save_records, OutputFormat};
pub use extract::{parse_film_page, ExtractError, FIELD_RULES};
pub use models::{FieldGroup, FieldValue, FilmRecord};
pub use network::{FetchError, FetchResult, HttpClient};
pub use parser::parse_listing;
pub use retriever::{CrawlSummary, Retriever, ScrapeError};
pub use session::{CrawlStats, Session};
